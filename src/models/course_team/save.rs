use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::services::course_roles::{
    CourseRoleService, RoleChangeRequest, RoleUpdateResult, ServiceError, classify_response,
};
use super::CourseTeamError;
use super::diff::ChangeSet;

/// How long the confirmation dialog stays up after a successful save.
pub const DEFAULT_CLOSE_DELAY: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SaveState {
    Idle,
    /// Confirmation dialog open, nothing submitted yet.
    Reviewing,
    /// One submission in flight.
    Pending,
    Complete,
}

/// Hooks for the save lifecycle. All methods default to no-ops.
pub trait SaveObserver {
    fn submit_requested(&mut self, _request: &RoleChangeRequest) {}
    fn succeeded(&mut self, _result: &RoleUpdateResult) {}
    fn failed(&mut self, _error: &ServiceError) {}
}

/// Observer that only logs.
pub struct LogSaveObserver;

impl SaveObserver for LogSaveObserver {
    fn submit_requested(&mut self, request: &RoleChangeRequest) {
        log::info!(
            "Submitting {} course role changes for {}",
            request.changes.len(),
            request.subject_email
        );
    }

    fn succeeded(&mut self, result: &RoleUpdateResult) {
        log::info!("Course role changes saved ({} per-course errors)", result.error_count());
    }

    fn failed(&mut self, error: &ServiceError) {
        log::error!("Course role save failed: {error}");
    }
}

/// Gates submission of a change set.
///
/// `Idle -> Reviewing -> Pending -> Complete` on success,
/// `Pending -> Idle` on failure. Submission is only reachable from
/// `Reviewing`, so a second confirmation while `Pending` is refused.
#[derive(Debug, Clone)]
pub struct SaveController {
    state: SaveState,
    dialog_open: bool,
    last_result: Option<RoleUpdateResult>,
    last_error: Option<String>,
    completed_at: Option<DateTime<Utc>>,
}

impl Default for SaveController {
    fn default() -> Self {
        SaveController {
            state: SaveState::Idle,
            dialog_open: false,
            last_result: None,
            last_error: None,
            completed_at: None,
        }
    }
}

impl SaveController {
    pub fn state(&self) -> SaveState {
        self.state
    }

    pub fn dialog_open(&self) -> bool {
        self.dialog_open
    }

    pub fn last_result(&self) -> Option<&RoleUpdateResult> {
        self.last_result.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Edits are refused while a submission is in flight or the dialog is
    /// up, so the submitted payload is the one the operator reviewed.
    pub fn ensure_editable(&self) -> Result<(), CourseTeamError> {
        if self.state == SaveState::Pending {
            return Err(CourseTeamError::SaveInFlight);
        }
        if self.dialog_open {
            return Err(CourseTeamError::ReviewOpen);
        }
        Ok(())
    }

    /// Save button enablement.
    pub fn save_enabled(&self, changes: &ChangeSet) -> bool {
        changes.has_changes() && matches!(self.state, SaveState::Idle | SaveState::Complete)
    }

    /// Open the confirmation dialog.
    pub fn open_review(&mut self, changes: &ChangeSet) -> Result<(), CourseTeamError> {
        match self.state {
            SaveState::Pending => Err(CourseTeamError::SaveInFlight),
            SaveState::Reviewing => Ok(()),
            SaveState::Idle | SaveState::Complete => {
                if changes.is_empty() {
                    return Err(CourseTeamError::NothingToSave);
                }
                self.state = SaveState::Reviewing;
                self.dialog_open = true;
                Ok(())
            }
        }
    }

    /// Close the dialog and return to editing. Edits are untouched.
    pub fn cancel_review(&mut self) -> Result<(), CourseTeamError> {
        match self.state {
            SaveState::Pending => Err(CourseTeamError::SaveInFlight),
            SaveState::Reviewing => {
                self.state = SaveState::Idle;
                self.dialog_open = false;
                Ok(())
            }
            SaveState::Idle | SaveState::Complete => {
                self.dialog_open = false;
                Ok(())
            }
        }
    }

    /// Operator confirmed: move to `Pending` and hand back the payload.
    pub fn begin(
        &mut self,
        subject_email: &str,
        changes: &ChangeSet,
        observer: &mut dyn SaveObserver,
    ) -> Result<RoleChangeRequest, CourseTeamError> {
        match self.state {
            SaveState::Pending => return Err(CourseTeamError::SaveInFlight),
            SaveState::Idle | SaveState::Complete => return Err(CourseTeamError::ReviewNotOpen),
            SaveState::Reviewing => {}
        }
        if changes.is_empty() {
            return Err(CourseTeamError::NothingToSave);
        }
        let request = RoleChangeRequest {
            subject_email: subject_email.to_string(),
            changes: changes.clone(),
        };
        self.state = SaveState::Pending;
        self.last_error = None;
        observer.submit_requested(&request);
        Ok(request)
    }

    /// Record the backend's answer for the in-flight submission.
    ///
    /// On failure the dialog closes and the controller is `Idle` again so
    /// the operator can retry. On success the dialog stays up until
    /// `close_dialog`.
    pub fn finish(
        &mut self,
        response: Result<serde_json::Value, ServiceError>,
        observer: &mut dyn SaveObserver,
    ) -> Result<RoleUpdateResult, ServiceError> {
        if self.state != SaveState::Pending {
            log::warn!("Save response arrived while {:?}; state left as is", self.state);
            return classify_response(response);
        }
        match classify_response(response) {
            Ok(result) => {
                self.state = SaveState::Complete;
                self.last_result = Some(result.clone());
                self.completed_at = Some(Utc::now());
                observer.succeeded(&result);
                Ok(result)
            }
            Err(error) => {
                self.state = SaveState::Idle;
                self.dialog_open = false;
                self.last_error = Some(error.to_string());
                observer.failed(&error);
                Err(error)
            }
        }
    }

    /// End of the post-success display delay.
    pub fn close_dialog(&mut self) {
        if self.state == SaveState::Complete {
            self.dialog_open = false;
        }
    }

    /// Begin, await the service once, finish.
    pub async fn submit(
        &mut self,
        service: &dyn CourseRoleService,
        subject_email: &str,
        changes: &ChangeSet,
        observer: &mut dyn SaveObserver,
    ) -> Result<Result<RoleUpdateResult, ServiceError>, CourseTeamError> {
        let request = self.begin(subject_email, changes, observer)?;
        let response = service.submit_role_changes(&request).await;
        Ok(self.finish(response, observer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::course_team::diff::ChangedCourse;
    use crate::models::course_team::types::{CourseRow, RoleValue};

    fn one_change() -> ChangeSet {
        ChangeSet {
            newly_checked_with_role: vec![ChangedCourse {
                course: CourseRow {
                    course_id: "c2".into(),
                    course_name: "Course".into(),
                    number: String::new(),
                    run: String::new(),
                    org: String::new(),
                    status: String::new(),
                    course_url: String::new(),
                },
                role: RoleValue::Instructor,
            }],
            ..Default::default()
        }
    }

    #[derive(Default)]
    struct Recorder {
        requested: usize,
        succeeded: usize,
        failed: usize,
    }

    impl SaveObserver for Recorder {
        fn submit_requested(&mut self, _request: &RoleChangeRequest) { self.requested += 1; }
        fn succeeded(&mut self, _result: &RoleUpdateResult) { self.succeeded += 1; }
        fn failed(&mut self, _error: &ServiceError) { self.failed += 1; }
    }

    #[test]
    fn review_requires_changes() {
        let mut save = SaveController::default();
        assert_eq!(save.open_review(&ChangeSet::default()), Err(CourseTeamError::NothingToSave));
        assert_eq!(save.state(), SaveState::Idle);
        assert!(!save.save_enabled(&ChangeSet::default()));
        assert!(save.save_enabled(&one_change()));
    }

    #[test]
    fn confirm_without_review_is_refused() {
        let mut save = SaveController::default();
        let err = save.begin("a@example.com", &one_change(), &mut Recorder::default()).unwrap_err();
        assert_eq!(err, CourseTeamError::ReviewNotOpen);
    }

    #[test]
    fn cancel_returns_to_idle() {
        let mut save = SaveController::default();
        save.open_review(&one_change()).unwrap();
        assert!(save.dialog_open());
        save.cancel_review().unwrap();
        assert_eq!(save.state(), SaveState::Idle);
        assert!(!save.dialog_open());
    }

    #[test]
    fn success_path_completes_then_closes_dialog() {
        let mut save = SaveController::default();
        let mut rec = Recorder::default();
        let changes = one_change();
        save.open_review(&changes).unwrap();
        let request = save.begin("a@example.com", &changes, &mut rec).unwrap();
        assert_eq!(request.changes, changes);
        assert_eq!(save.state(), SaveState::Pending);
        assert!(!save.save_enabled(&changes));

        let second = save.begin("a@example.com", &changes, &mut rec);
        assert_eq!(second, Err(CourseTeamError::SaveInFlight));
        assert_eq!(save.open_review(&changes), Err(CourseTeamError::SaveInFlight));

        let result = save.finish(Ok(serde_json::json!({})), &mut rec);
        assert!(result.is_ok());
        assert_eq!(save.state(), SaveState::Complete);
        assert!(save.dialog_open());
        assert!(save.completed_at().is_some());
        save.close_dialog();
        assert!(!save.dialog_open());
        assert_eq!((rec.requested, rec.succeeded, rec.failed), (1, 1, 0));
    }

    #[test]
    fn failure_returns_to_idle_with_error() {
        let mut save = SaveController::default();
        let mut rec = Recorder::default();
        let changes = one_change();
        save.open_review(&changes).unwrap();
        save.begin("a@example.com", &changes, &mut rec).unwrap();
        let result = save.finish(Ok(serde_json::json!({"error": true})), &mut rec);
        assert!(matches!(result, Err(ServiceError::Rejected(_))));
        assert_eq!(save.state(), SaveState::Idle);
        assert!(!save.dialog_open());
        assert!(save.last_error().is_some());
        assert!(save.save_enabled(&changes));
        assert_eq!(rec.failed, 1);
    }

    #[test]
    fn edits_frozen_from_review_until_dialog_closes() {
        let mut save = SaveController::default();
        let changes = one_change();
        assert_eq!(save.ensure_editable(), Ok(()));

        save.open_review(&changes).unwrap();
        assert_eq!(save.ensure_editable(), Err(CourseTeamError::ReviewOpen));
        save.begin("a@example.com", &changes, &mut LogSaveObserver).unwrap();
        assert_eq!(save.ensure_editable(), Err(CourseTeamError::SaveInFlight));
        save.finish(Ok(serde_json::json!({})), &mut LogSaveObserver).unwrap();
        assert_eq!(save.ensure_editable(), Err(CourseTeamError::ReviewOpen));
        save.close_dialog();
        assert_eq!(save.ensure_editable(), Ok(()));
    }

    #[test]
    fn late_response_leaves_state_alone() {
        let mut save = SaveController::default();
        let outcome = save.finish(Ok(serde_json::json!({"error": true})), &mut LogSaveObserver);
        assert!(outcome.is_err());
        assert_eq!(save.state(), SaveState::Idle);
        assert!(save.last_error().is_none());
    }

    #[test]
    fn review_reopens_after_complete() {
        let mut save = SaveController::default();
        let changes = one_change();
        save.open_review(&changes).unwrap();
        save.begin("a@example.com", &changes, &mut LogSaveObserver).unwrap();
        save.finish(Ok(serde_json::json!({})), &mut LogSaveObserver).unwrap();
        save.close_dialog();
        save.open_review(&changes).unwrap();
        assert_eq!(save.state(), SaveState::Reviewing);
    }
}
