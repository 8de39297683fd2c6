//! Seam to the course-role backend.
//!
//! The table core only needs two calls: fetch every course row for a
//! subject, and submit a role change set. Anything that answers those two
//! (an HTTP client, the JSON fixture below, a test double) can back a table.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::course_team::diff::ChangeSet;
use crate::models::course_team::types::{RawCourseRow, RoleValue};

pub type ServiceFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

#[derive(Debug, Clone, PartialEq)]
pub enum ServiceError {
    /// Transport failure or backend unreachable.
    Unavailable(String),
    /// Backend answered with an `error` field. Carries the full response.
    Rejected(Value),
    UnknownSubject(String),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceError::Unavailable(e) => write!(f, "Course role service unavailable: {e}"),
            ServiceError::Rejected(body) => write!(f, "Course role update rejected: {body}"),
            ServiceError::UnknownSubject(u) => write!(f, "No course data for user {u}"),
        }
    }
}

impl std::error::Error for ServiceError {}

/// Submission payload: only the diff, never the full row set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleChangeRequest {
    pub subject_email: String,
    pub changes: ChangeSet,
}

/// Per-category outcome reported by the backend on success.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleUpdateResult {
    #[serde(default)]
    pub newly_checked_with_role_errors: Vec<Value>,
    #[serde(default)]
    pub unchecked_with_role_errors: Vec<Value>,
    #[serde(default)]
    pub role_changed_rows_errors: Vec<Value>,
}

impl RoleUpdateResult {
    pub fn error_count(&self) -> usize {
        self.newly_checked_with_role_errors.len()
            + self.unchecked_with_role_errors.len()
            + self.role_changed_rows_errors.len()
    }
}

/// Classify a backend answer: a non-null `error` field means failure, any
/// other shape is success.
pub fn classify_response(response: Result<Value, ServiceError>) -> Result<RoleUpdateResult, ServiceError> {
    let body = response?;
    if body.get("error").is_some_and(|e| !e.is_null()) {
        return Err(ServiceError::Rejected(body));
    }
    Ok(serde_json::from_value(body).unwrap_or_else(|e| {
        log::warn!("Unrecognised role update result shape ({e}); treating as success with no errors");
        RoleUpdateResult::default()
    }))
}

pub trait CourseRoleService: Send + Sync {
    /// Full, unfiltered course list for a subject.
    fn fetch_rows<'a>(&'a self, username: &'a str)
        -> ServiceFuture<'a, Result<Vec<RawCourseRow>, ServiceError>>;

    /// Apply a change set. The raw JSON answer is classified by the caller.
    fn submit_role_changes<'a>(&'a self, request: &'a RoleChangeRequest)
        -> ServiceFuture<'a, Result<Value, ServiceError>>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureSubject {
    pub email: String,
    #[serde(default)]
    pub courses: Vec<RawCourseRow>,
}

/// In-memory backend seeded from a JSON document keyed by username.
/// Submitted changes are applied to the seed so a reload shows them.
pub struct FixtureCourseRoleService {
    subjects: Mutex<HashMap<String, FixtureSubject>>,
}

impl FixtureCourseRoleService {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let subjects: HashMap<String, FixtureSubject> = serde_json::from_str(json)?;
        Ok(Self { subjects: Mutex::new(subjects) })
    }

    /// A missing file yields an empty fixture.
    pub fn from_file(path: &Path) -> std::io::Result<Self> {
        if !path.exists() {
            log::warn!("Course fixture {} not found; starting with no subjects", path.display());
            return Ok(Self { subjects: Mutex::new(HashMap::new()) });
        }
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json).map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }

    fn apply(&self, request: &RoleChangeRequest) -> Result<Value, ServiceError> {
        let mut subjects = self.subjects.lock().unwrap_or_else(|e| e.into_inner());
        let Some(subject) = subjects.values_mut().find(|s| s.email == request.subject_email) else {
            return Ok(serde_json::json!({
                "error": format!("unknown user email {}", request.subject_email),
            }));
        };

        let mut set_role = |course_id: &str, role: Option<RoleValue>| {
            if let Some(row) = subject.courses.iter_mut().find(|r| r.course_id.as_deref() == Some(course_id)) {
                row.role = role.map(|r| r.as_str().to_string());
            }
        };
        for change in &request.changes.newly_checked_with_role {
            set_role(&change.course.course_id, Some(change.role));
        }
        for change in &request.changes.unchecked_with_role {
            set_role(&change.course.course_id, None);
        }
        for change in &request.changes.role_changed_rows {
            set_role(&change.course.course_id, Some(change.to));
        }

        log::info!(
            "Fixture applied {} course role changes for {}",
            request.changes.len(),
            request.subject_email
        );
        serde_json::to_value(RoleUpdateResult::default())
            .map_err(|e| ServiceError::Unavailable(e.to_string()))
    }
}

impl CourseRoleService for FixtureCourseRoleService {
    fn fetch_rows<'a>(&'a self, username: &'a str)
        -> ServiceFuture<'a, Result<Vec<RawCourseRow>, ServiceError>>
    {
        Box::pin(async move {
            let subjects = self.subjects.lock().unwrap_or_else(|e| e.into_inner());
            subjects
                .get(username)
                .map(|s| s.courses.clone())
                .ok_or_else(|| ServiceError::UnknownSubject(username.to_string()))
        })
    }

    fn submit_role_changes<'a>(&'a self, request: &'a RoleChangeRequest)
        -> ServiceFuture<'a, Result<Value, ServiceError>>
    {
        Box::pin(async move { self.apply(request) })
    }
}
