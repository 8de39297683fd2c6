use std::fmt;

use serde::{Deserialize, Serialize};

/// Course-team role of the subject in one course.
///
/// `NoRole` stands for a role field that was empty (or unrecognised) when the
/// rows were loaded. It is distinct from "unchecked".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleValue {
    Staff,
    Instructor,
    #[serde(rename = "null")]
    NoRole,
}

impl RoleValue {
    pub const STAFF: &'static str = "staff";
    pub const INSTRUCTOR: &'static str = "instructor";
    pub const NO_ROLE: &'static str = "null";

    /// Normalize a raw role field. Absent and unknown values become `NoRole`.
    pub fn from_raw(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("staff") => RoleValue::Staff,
            Some("instructor") => RoleValue::Instructor,
            None | Some("") | Some("null") => RoleValue::NoRole,
            Some(other) => {
                log::warn!("Unrecognised course role '{other}' treated as no role");
                RoleValue::NoRole
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RoleValue::Staff => Self::STAFF,
            RoleValue::Instructor => Self::INSTRUCTOR,
            RoleValue::NoRole => Self::NO_ROLE,
        }
    }

    /// Staff or Instructor.
    pub fn is_assigned(&self) -> bool {
        matches!(self, RoleValue::Staff | RoleValue::Instructor)
    }

    /// What the role control shows: a row with no role reads as Staff.
    pub fn display(&self) -> RoleValue {
        match self {
            RoleValue::NoRole => RoleValue::Staff,
            other => *other,
        }
    }
}

impl fmt::Display for RoleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Course row as it arrives from the course API. Every field may be missing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawCourseRow {
    #[serde(default)]
    pub course_id: Option<String>,
    #[serde(default)]
    pub course_name: Option<String>,
    #[serde(default)]
    pub number: Option<String>,
    #[serde(default)]
    pub run: Option<String>,
    #[serde(default)]
    pub org: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub course_url: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

/// One course-assignment record after normalization. Immutable for the
/// lifetime of a load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseRow {
    pub course_id: String,
    pub course_name: String,
    pub number: String,
    pub run: String,
    pub org: String,
    pub status: String,
    pub course_url: String,
}

/// Checked flag and role of one row, either as loaded or as edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RowState {
    pub checked: bool,
    pub role: RoleValue,
}

impl RowState {
    /// Load-time state: checked exactly when a role is assigned.
    pub fn from_role(role: RoleValue) -> Self {
        RowState { checked: role.is_assigned(), role }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_normalization() {
        assert_eq!(RoleValue::from_raw(Some("staff")), RoleValue::Staff);
        assert_eq!(RoleValue::from_raw(Some("instructor")), RoleValue::Instructor);
        assert_eq!(RoleValue::from_raw(None), RoleValue::NoRole);
        assert_eq!(RoleValue::from_raw(Some("")), RoleValue::NoRole);
        assert_eq!(RoleValue::from_raw(Some("null")), RoleValue::NoRole);
        assert_eq!(RoleValue::from_raw(Some("beta_tester")), RoleValue::NoRole);
    }

    #[test]
    fn no_role_displays_as_staff() {
        assert_eq!(RoleValue::NoRole.display(), RoleValue::Staff);
        assert_eq!(RoleValue::Instructor.display(), RoleValue::Instructor);
    }

    #[test]
    fn load_state_checked_only_with_assigned_role() {
        assert!(RowState::from_role(RoleValue::Staff).checked);
        assert!(RowState::from_role(RoleValue::Instructor).checked);
        assert!(!RowState::from_role(RoleValue::NoRole).checked);
    }

    #[test]
    fn role_serializes_with_api_names() {
        assert_eq!(serde_json::to_string(&RoleValue::NoRole).unwrap(), "\"null\"");
        assert_eq!(serde_json::to_string(&RoleValue::Instructor).unwrap(), "\"instructor\"");
        let back: RoleValue = serde_json::from_str("\"staff\"").unwrap();
        assert_eq!(back, RoleValue::Staff);
    }
}
