use actix_session::Session;
use actix_web::{web, HttpResponse};

use crate::errors::AppError;
use crate::responses::{BulkRoleRequest, BulkRoleResponse, SetRoleRequest, ToggleRequest};
use super::{CourseTeamState, remember_unsaved};

/// POST /course-team/{username}/toggle: flip one row's checkbox.
pub async fn toggle(
    state: web::Data<CourseTeamState>,
    session: Session,
    path: web::Path<String>,
    body: web::Json<ToggleRequest>,
) -> Result<HttpResponse, AppError> {
    let shared = state.tables.get(&path)?;
    let mut table = shared.lock().await;
    table.toggle_checked(&body.course_id)?;
    remember_unsaved(&session, &table);
    Ok(HttpResponse::Ok().json(table.snapshot()))
}

/// POST /course-team/{username}/role: set one row's role. Allowed on
/// unchecked rows too; it only counts as a change once the row is checked.
pub async fn set_role(
    state: web::Data<CourseTeamState>,
    session: Session,
    path: web::Path<String>,
    body: web::Json<SetRoleRequest>,
) -> Result<HttpResponse, AppError> {
    let shared = state.tables.get(&path)?;
    let mut table = shared.lock().await;
    table.set_role(&body.course_id, body.role)?;
    remember_unsaved(&session, &table);
    Ok(HttpResponse::Ok().json(table.snapshot()))
}

/// POST /course-team/{username}/select-page: header checkbox over the
/// rows currently on screen.
pub async fn select_page(
    state: web::Data<CourseTeamState>,
    session: Session,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let shared = state.tables.get(&path)?;
    let mut table = shared.lock().await;
    let header = table.toggle_page_selection()?;
    log::debug!("{} page selection now {header:?}", path.as_str());
    remember_unsaved(&session, &table);
    Ok(HttpResponse::Ok().json(table.snapshot()))
}

/// POST /course-team/{username}/bulk-role: give every checked row on the
/// current page the same role.
pub async fn bulk_role(
    state: web::Data<CourseTeamState>,
    session: Session,
    path: web::Path<String>,
    body: web::Json<BulkRoleRequest>,
) -> Result<HttpResponse, AppError> {
    let shared = state.tables.get(&path)?;
    let mut table = shared.lock().await;
    let updated = table.apply_role_to_checked_on_page(body.role)?;
    remember_unsaved(&session, &table);
    Ok(HttpResponse::Ok().json(BulkRoleResponse { updated, table: table.snapshot() }))
}
