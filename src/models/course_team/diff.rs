use serde::{Deserialize, Serialize};

use super::store::{Baseline, EditState};
use super::types::{CourseRow, RoleValue};

/// A row whose checked flag changed. `role` is the role being granted for
/// newly checked rows, and the role held before for unchecked rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangedCourse {
    #[serde(flatten)]
    pub course: CourseRow,
    pub role: RoleValue,
}

/// A row that stayed checked but whose role changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleChangedCourse {
    #[serde(flatten)]
    pub course: CourseRow,
    pub from: RoleValue,
    pub to: RoleValue,
}

/// Minimal diff between the baseline and the edit state. The three lists
/// are disjoint and keep input row order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeSet {
    pub newly_checked_with_role: Vec<ChangedCourse>,
    pub unchecked_with_role: Vec<ChangedCourse>,
    pub role_changed_rows: Vec<RoleChangedCourse>,
}

impl ChangeSet {
    /// The unsaved-changes predicate.
    pub fn has_changes(&self) -> bool {
        !self.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.newly_checked_with_role.is_empty()
            && self.unchecked_with_role.is_empty()
            && self.role_changed_rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.newly_checked_with_role.len()
            + self.unchecked_with_role.len()
            + self.role_changed_rows.len()
    }
}

/// Classify every row by comparing baseline and edit state.
///
/// Checked with `NoRole` is not a submittable change, even though the row
/// displays as Staff.
pub fn diff(baseline: &Baseline, edits: &EditState, rows: &[CourseRow]) -> ChangeSet {
    let mut changes = ChangeSet::default();

    for row in rows {
        let (Some(before), Some(after)) = (baseline.get(&row.course_id), edits.get(&row.course_id)) else {
            continue;
        };
        match (before.checked, after.checked) {
            (false, true) if after.role.is_assigned() => {
                changes.newly_checked_with_role.push(ChangedCourse {
                    course: row.clone(),
                    role: after.role,
                });
            }
            (true, false) if before.role.is_assigned() => {
                changes.unchecked_with_role.push(ChangedCourse {
                    course: row.clone(),
                    role: before.role,
                });
            }
            (true, true) if before.role != after.role => {
                changes.role_changed_rows.push(RoleChangedCourse {
                    course: row.clone(),
                    from: before.role,
                    to: after.role,
                });
            }
            _ => {}
        }
    }

    changes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::course_team::store::initialize;
    use crate::models::course_team::types::RawCourseRow;

    fn raw(id: &str, role: Option<&str>) -> RawCourseRow {
        RawCourseRow {
            course_id: Some(id.into()),
            role: role.map(String::from),
            ..Default::default()
        }
    }

    #[test]
    fn untouched_table_has_no_changes() {
        let (rows, baseline, edits) = initialize(&[raw("c1", Some("staff")), raw("c2", None)]).unwrap();
        let changes = diff(&baseline, &edits, &rows);
        assert!(changes.is_empty());
        assert!(!changes.has_changes());
    }

    #[test]
    fn checking_without_role_is_not_a_change() {
        let (rows, baseline, mut edits) = initialize(&[raw("c2", None)]).unwrap();
        edits.toggle_checked("c2").unwrap();
        assert!(diff(&baseline, &edits, &rows).is_empty());
    }

    #[test]
    fn newly_checked_with_role() {
        let (rows, baseline, mut edits) = initialize(&[raw("c2", None)]).unwrap();
        edits.toggle_checked("c2").unwrap();
        edits.set_role("c2", RoleValue::Instructor).unwrap();
        let changes = diff(&baseline, &edits, &rows);
        assert_eq!(changes.newly_checked_with_role.len(), 1);
        assert_eq!(changes.newly_checked_with_role[0].role, RoleValue::Instructor);
        assert_eq!(changes.len(), 1);
    }

    #[test]
    fn role_picked_before_checking_counts_once_checked() {
        let (rows, baseline, mut edits) = initialize(&[raw("c2", None)]).unwrap();
        edits.set_role("c2", RoleValue::Staff).unwrap();
        assert!(diff(&baseline, &edits, &rows).is_empty());
        edits.toggle_checked("c2").unwrap();
        assert_eq!(diff(&baseline, &edits, &rows).newly_checked_with_role.len(), 1);
    }

    #[test]
    fn unchecked_remembers_prior_role() {
        let (rows, baseline, mut edits) = initialize(&[raw("c3", Some("staff"))]).unwrap();
        edits.set_role("c3", RoleValue::Instructor).unwrap();
        edits.toggle_checked("c3").unwrap();
        let changes = diff(&baseline, &edits, &rows);
        assert_eq!(changes.unchecked_with_role.len(), 1);
        assert_eq!(changes.unchecked_with_role[0].role, RoleValue::Staff);
        assert!(changes.role_changed_rows.is_empty());
    }

    #[test]
    fn role_change_records_from_and_to() {
        let (rows, baseline, mut edits) = initialize(&[raw("c4", Some("staff"))]).unwrap();
        edits.set_role("c4", RoleValue::Instructor).unwrap();
        let changes = diff(&baseline, &edits, &rows);
        assert_eq!(changes.role_changed_rows.len(), 1);
        let change = &changes.role_changed_rows[0];
        assert_eq!((change.from, change.to), (RoleValue::Staff, RoleValue::Instructor));

        edits.set_role("c4", RoleValue::Staff).unwrap();
        assert!(diff(&baseline, &edits, &rows).is_empty());
    }

    #[test]
    fn payload_uses_camel_case_categories() {
        let (rows, baseline, mut edits) = initialize(&[raw("c1", Some("staff"))]).unwrap();
        edits.toggle_checked("c1").unwrap();
        let json = serde_json::to_value(diff(&baseline, &edits, &rows)).unwrap();
        assert_eq!(json["uncheckedWithRole"][0]["course_id"], "c1");
        assert_eq!(json["uncheckedWithRole"][0]["role"], "staff");
        assert!(json["newlyCheckedWithRole"].as_array().unwrap().is_empty());
        assert!(json["roleChangedRows"].as_array().unwrap().is_empty());
    }
}
