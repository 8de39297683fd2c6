pub mod edits;
pub mod save;
pub mod table;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use actix_session::Session;
use actix_web::web;

use crate::config::{Config, MAX_PAGE_SIZE};
use crate::errors::AppError;
use crate::models::course_team::CourseTable;
use crate::services::course_roles::CourseRoleService;
use crate::session::SessionFlagStore;

pub type SharedTable = Arc<tokio::sync::Mutex<CourseTable>>;

/// Loaded tables, one per subject username. Each table has its own lock so a
/// save in flight on one subject never blocks another.
#[derive(Clone, Default)]
pub struct TableRegistry {
    tables: Arc<Mutex<HashMap<String, SharedTable>>>,
}

impl TableRegistry {
    pub fn get(&self, username: &str) -> Result<SharedTable, AppError> {
        let map = self.tables.lock().unwrap_or_else(|e| e.into_inner());
        map.get(username)
            .cloned()
            .ok_or_else(|| AppError::NotLoaded(username.to_string()))
    }

    /// Replace whatever table was loaded for the same subject.
    pub fn insert(&self, table: CourseTable) -> SharedTable {
        let username = table.subject().username.clone();
        let shared = Arc::new(tokio::sync::Mutex::new(table));
        let mut map = self.tables.lock().unwrap_or_else(|e| e.into_inner());
        map.insert(username, shared.clone());
        shared
    }

    pub fn len(&self) -> usize {
        self.tables.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Shared state for the course-team endpoints.
pub struct CourseTeamState {
    pub service: Arc<dyn CourseRoleService>,
    pub tables: TableRegistry,
    pub page_size: usize,
    pub close_delay: Duration,
}

impl CourseTeamState {
    pub fn new(service: Arc<dyn CourseRoleService>, config: &Config) -> Self {
        CourseTeamState {
            service,
            tables: TableRegistry::default(),
            page_size: config.page_size,
            close_delay: config.save_dialog_close,
        }
    }

    pub fn clamp_page_size(&self, requested: usize) -> usize {
        requested.clamp(1, MAX_PAGE_SIZE)
    }
}

/// Persist the subject's unsaved flag into the operator session.
pub(crate) fn remember_unsaved(session: &Session, table: &CourseTable) {
    table.persist_unsaved_flag(&mut SessionFlagStore::new(session));
}

/// Configure course-team routes under the caller's scope.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/course-team/{username}")
            .wrap(actix_web::middleware::from_fn(super::require_json_body))
            .route("", web::get().to(table::view))
            .route("/load", web::post().to(table::load))
            .route("/changes", web::get().to(table::changes))
            .route("/navigation", web::get().to(table::navigation))
            .route("/unsaved", web::get().to(table::unsaved_flag))
            .route("/toggle", web::post().to(edits::toggle))
            .route("/role", web::post().to(edits::set_role))
            .route("/select-page", web::post().to(edits::select_page))
            .route("/bulk-role", web::post().to(edits::bulk_role))
            .route("/review", web::post().to(save::open_review))
            .route("/review/cancel", web::post().to(save::cancel_review))
            .route("/save", web::post().to(save::confirm))
    );
}
