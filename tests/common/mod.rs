//! Shared test infrastructure for course-team tests.
//!
//! - `raw_row()` / `numbered_rows()` build course rows the way the course API
//!   returns them.
//! - `ScriptedService` is a `CourseRoleService` whose submit answers are
//!   queued up front and whose submissions are recorded.
#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use serde_json::Value;

use course_team::models::course_team::{RawCourseRow, Subject};
use course_team::services::course_roles::{
    CourseRoleService, RoleChangeRequest, ServiceError, ServiceFuture,
};

// ============================================================================
// TEST CONSTANTS
// ============================================================================

pub const SUBJECT_USERNAME: &str = "learner1";
pub const SUBJECT_EMAIL: &str = "learner1@example.com";

pub fn subject() -> Subject {
    Subject { username: SUBJECT_USERNAME.into(), email: SUBJECT_EMAIL.into() }
}

// ============================================================================
// ROW BUILDERS
// ============================================================================

pub fn raw_row(id: &str, name: &str, role: Option<&str>) -> RawCourseRow {
    RawCourseRow {
        course_id: Some(id.to_string()),
        course_name: Some(name.to_string()),
        number: Some(format!("NUM-{id}")),
        run: Some("2T2024".to_string()),
        org: Some("MITx".to_string()),
        status: Some("active".to_string()),
        course_url: Some(format!("https://courses.example.com/{id}")),
        role: role.map(String::from),
    }
}

/// `count` rows named "Course 00".."Course NN", none with a role.
pub fn numbered_rows(count: usize) -> Vec<RawCourseRow> {
    (0..count)
        .map(|i| raw_row(&format!("c{i:02}"), &format!("Course {i:02}"), None))
        .collect()
}

// ============================================================================
// SCRIPTED SERVICE
// ============================================================================

#[derive(Default)]
pub struct ScriptedService {
    rows: Mutex<HashMap<String, Vec<RawCourseRow>>>,
    answers: Mutex<VecDeque<Result<Value, ServiceError>>>,
    submitted: Mutex<Vec<RoleChangeRequest>>,
}

impl ScriptedService {
    pub fn with_rows(username: &str, rows: Vec<RawCourseRow>) -> Self {
        let service = ScriptedService::default();
        service.set_rows(username, rows);
        service
    }

    pub fn set_rows(&self, username: &str, rows: Vec<RawCourseRow>) {
        self.rows.lock().unwrap().insert(username.to_string(), rows);
    }

    /// Queue the answer for the next submit. Without one, submits succeed
    /// with an empty object.
    pub fn answer(&self, answer: Result<Value, ServiceError>) {
        self.answers.lock().unwrap().push_back(answer);
    }

    pub fn submitted(&self) -> Vec<RoleChangeRequest> {
        self.submitted.lock().unwrap().clone()
    }
}

impl CourseRoleService for ScriptedService {
    fn fetch_rows<'a>(&'a self, username: &'a str)
        -> ServiceFuture<'a, Result<Vec<RawCourseRow>, ServiceError>>
    {
        Box::pin(async move {
            self.rows
                .lock()
                .unwrap()
                .get(username)
                .cloned()
                .ok_or_else(|| ServiceError::UnknownSubject(username.to_string()))
        })
    }

    fn submit_role_changes<'a>(&'a self, request: &'a RoleChangeRequest)
        -> ServiceFuture<'a, Result<Value, ServiceError>>
    {
        Box::pin(async move {
            self.submitted.lock().unwrap().push(request.clone());
            self.answers
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(serde_json::json!({})))
        })
    }
}
