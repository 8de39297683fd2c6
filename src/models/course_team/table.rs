use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::table_filter::SortSpec;
use crate::services::course_roles::{
    CourseRoleService, RoleChangeRequest, RoleUpdateResult, ServiceError,
};
use super::CourseTeamError;
use super::diff::{ChangeSet, diff};
use super::guard::{NavigationDecision, NavigationGuard, UnsavedFlagStore, persist_unsaved_flag};
use super::save::{SaveController, SaveObserver, SaveState};
use super::store::{Baseline, EditState, initialize};
use super::types::{CourseRow, RawCourseRow, RoleValue};
use super::view::{CoursePage, HeaderCheckbox, ViewQuery, current_page, org_choices};

/// Whose course roles are being edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Subject {
    pub username: String,
    pub email: String,
}

/// One bulk-edit table: rows, baseline, edits, view parameters, the derived
/// diff and the save controller.
///
/// The diff and the navigation guard are recomputed after every edit; the
/// page index is re-settled after every view change.
#[derive(Debug, Clone)]
pub struct CourseTable {
    subject: Subject,
    rows: Vec<CourseRow>,
    baseline: Baseline,
    edits: EditState,
    query: ViewQuery,
    changes: ChangeSet,
    save: SaveController,
    guard: NavigationGuard,
}

/// Everything the host page needs to render the table.
#[derive(Debug, Clone, Serialize)]
pub struct TableSnapshot {
    pub subject: Subject,
    pub page: CoursePage,
    pub search: String,
    pub status: String,
    pub org: String,
    pub sort: SortSpec,
    pub org_choices: Vec<String>,
    pub changes: ChangeSet,
    pub save_enabled: bool,
    pub unsaved_changes: bool,
    pub save_state: SaveState,
    pub dialog_open: bool,
    pub last_error: Option<String>,
    pub last_result: Option<RoleUpdateResult>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl CourseTable {
    pub fn new(subject: Subject, raw_rows: &[RawCourseRow]) -> Result<Self, CourseTeamError> {
        let (rows, baseline, edits) = initialize(raw_rows)?;
        log::info!("Loaded {} course rows for {}", rows.len(), subject.username);
        let mut table = CourseTable {
            subject,
            rows,
            baseline,
            edits,
            query: ViewQuery::default(),
            changes: ChangeSet::default(),
            save: SaveController::default(),
            guard: NavigationGuard::default(),
        };
        table.recompute();
        Ok(table)
    }

    /// Fetch rows for `subject` and build a fresh table.
    pub async fn load(
        service: &dyn CourseRoleService,
        subject: Subject,
    ) -> Result<Self, LoadError> {
        let raw_rows = service.fetch_rows(&subject.username).await.map_err(LoadError::Service)?;
        CourseTable::new(subject, &raw_rows).map_err(LoadError::Rows)
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.query.page_size = page_size.max(1);
        self
    }

    pub fn subject(&self) -> &Subject {
        &self.subject
    }

    pub fn rows(&self) -> &[CourseRow] {
        &self.rows
    }

    pub fn baseline(&self) -> &Baseline {
        &self.baseline
    }

    pub fn edits(&self) -> &EditState {
        &self.edits
    }

    pub fn query(&self) -> &ViewQuery {
        &self.query
    }

    pub fn changes(&self) -> &ChangeSet {
        &self.changes
    }

    pub fn save_controller(&self) -> &SaveController {
        &self.save
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.changes.has_changes()
    }

    pub fn save_enabled(&self) -> bool {
        self.save.save_enabled(&self.changes)
    }

    pub fn navigation(&self) -> NavigationDecision {
        self.guard.check()
    }

    fn recompute(&mut self) {
        self.changes = diff(&self.baseline, &self.edits, &self.rows);
        self.guard.update(self.changes.has_changes());
    }

    /// Current page, with the page index settled into the stored query.
    pub fn page(&mut self) -> CoursePage {
        let page = current_page(&self.rows, &self.edits, &self.query);
        self.query.page_index = page.page_index;
        page
    }

    // -- view parameters --------------------------------------------------

    pub fn set_search(&mut self, search: &str) {
        self.query.search = search.to_string();
        self.page();
    }

    pub fn set_status_filter(&mut self, status: &str) {
        self.query.status = status.to_string();
        self.page();
    }

    pub fn set_org_filter(&mut self, org: &str) {
        self.query.org = org.to_string();
        self.page();
    }

    pub fn set_sort(&mut self, sort: SortSpec) {
        self.query.sort = sort;
        self.page();
    }

    pub fn set_page(&mut self, page_index: usize) {
        self.query.page_index = page_index;
        self.page();
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        self.query.page_size = page_size.max(1);
        self.page();
    }

    // -- edits ------------------------------------------------------------

    pub fn toggle_checked(&mut self, course_id: &str) -> Result<bool, CourseTeamError> {
        self.save.ensure_editable()?;
        let checked = self.edits.toggle_checked(course_id)?;
        self.recompute();
        Ok(checked)
    }

    pub fn set_role(&mut self, course_id: &str, role: RoleValue) -> Result<bool, CourseTeamError> {
        self.save.ensure_editable()?;
        let changed = self.edits.set_role(course_id, role)?;
        self.recompute();
        Ok(changed)
    }

    pub fn set_checked_for_ids(&mut self, ids: &HashSet<String>, checked: bool) -> Result<(), CourseTeamError> {
        self.save.ensure_editable()?;
        self.edits.set_checked_for_ids(ids, checked)?;
        self.recompute();
        Ok(())
    }

    /// Header checkbox: check every row on the current page, or uncheck them
    /// all when they are already all checked. Returns the new header state.
    pub fn toggle_page_selection(&mut self) -> Result<HeaderCheckbox, CourseTeamError> {
        self.save.ensure_editable()?;
        let page = self.page();
        if page.is_empty() {
            return Ok(HeaderCheckbox::None);
        }
        let check = page.header != HeaderCheckbox::All;
        self.set_checked_for_ids(&page.course_ids(), check)?;
        Ok(self.page().header)
    }

    /// Bulk role action over the checked rows of the current page.
    pub fn apply_role_to_checked_on_page(&mut self, role: RoleValue) -> Result<usize, CourseTeamError> {
        self.save.ensure_editable()?;
        let ids = self.page().course_ids();
        let touched = self.edits.apply_role_to_checked(&ids, role);
        self.recompute();
        Ok(touched)
    }

    /// Write the unsaved flag for this subject through the host's store.
    pub fn persist_unsaved_flag(&self, store: &mut dyn UnsavedFlagStore) {
        persist_unsaved_flag(store, &self.subject.username, self.has_unsaved_changes());
    }

    // -- save -------------------------------------------------------------

    pub fn open_review(&mut self) -> Result<&ChangeSet, CourseTeamError> {
        self.save.open_review(&self.changes)?;
        Ok(&self.changes)
    }

    pub fn cancel_review(&mut self) -> Result<(), CourseTeamError> {
        self.save.cancel_review()
    }

    /// Confirm the review: take a copy of the diff and go `Pending`.
    pub fn begin_save(&mut self, observer: &mut dyn SaveObserver) -> Result<RoleChangeRequest, CourseTeamError> {
        self.save.begin(&self.subject.email, &self.changes, observer)
    }

    /// Apply the backend answer. Edits are never touched here.
    pub fn finish_save(
        &mut self,
        response: Result<serde_json::Value, ServiceError>,
        observer: &mut dyn SaveObserver,
    ) -> Result<RoleUpdateResult, ServiceError> {
        self.save.finish(response, observer)
    }

    pub fn close_dialog(&mut self) {
        self.save.close_dialog();
    }

    /// Confirm and submit in one step, for single-owner callers.
    pub async fn save(
        &mut self,
        service: &dyn CourseRoleService,
        observer: &mut dyn SaveObserver,
    ) -> Result<Result<RoleUpdateResult, ServiceError>, CourseTeamError> {
        self.save.submit(service, &self.subject.email, &self.changes, observer).await
    }

    pub fn snapshot(&mut self) -> TableSnapshot {
        let page = self.page();
        TableSnapshot {
            subject: self.subject.clone(),
            page,
            search: self.query.search.clone(),
            status: self.query.status.clone(),
            org: self.query.org.clone(),
            sort: self.query.sort,
            org_choices: org_choices(&self.rows),
            changes: self.changes.clone(),
            save_enabled: self.save_enabled(),
            unsaved_changes: self.has_unsaved_changes(),
            save_state: self.save.state(),
            dialog_open: self.save.dialog_open(),
            last_error: self.save.last_error().map(String::from),
            last_result: self.save.last_result().cloned(),
            completed_at: self.save.completed_at(),
        }
    }
}

#[derive(Debug)]
pub enum LoadError {
    Service(ServiceError),
    Rows(CourseTeamError),
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::Service(e) => write!(f, "{e}"),
            LoadError::Rows(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for LoadError {}
