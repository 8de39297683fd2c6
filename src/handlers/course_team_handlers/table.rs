use actix_session::Session;
use actix_web::{web, HttpResponse};

use crate::errors::AppError;
use crate::models::course_team::guard::read_unsaved_flag;
use crate::models::course_team::{CourseTable, Subject};
use crate::models::table_filter::SortSpec;
use crate::responses::{
    ChangesResponse, LoadRequest, NavigationResponse, UnsavedFlagResponse, ViewParams,
};
use crate::session::SessionFlagStore;
use super::{CourseTeamState, remember_unsaved};

/// POST /course-team/{username}/load: fetch the subject's courses and
/// start a fresh table, discarding any previous edits for that subject.
pub async fn load(
    state: web::Data<CourseTeamState>,
    session: Session,
    path: web::Path<String>,
    body: web::Json<LoadRequest>,
) -> Result<HttpResponse, AppError> {
    let username = path.into_inner();
    let subject = Subject { username, email: body.into_inner().email };

    let table = CourseTable::load(state.service.as_ref(), subject)
        .await?
        .with_page_size(state.page_size);
    let shared = state.tables.insert(table);

    let mut table = shared.lock().await;
    remember_unsaved(&session, &table);
    Ok(HttpResponse::Ok().json(table.snapshot()))
}

/// GET /course-team/{username}?search=&status=&org=&sort=&dir=&page=&page_size=
pub async fn view(
    state: web::Data<CourseTeamState>,
    session: Session,
    path: web::Path<String>,
    query: web::Query<ViewParams>,
) -> Result<HttpResponse, AppError> {
    let shared = state.tables.get(&path)?;
    let mut table = shared.lock().await;
    let params = query.into_inner();

    if let Some(search) = &params.search {
        table.set_search(search);
    }
    if let Some(status) = &params.status {
        table.set_status_filter(status);
    }
    if let Some(org) = &params.org {
        table.set_org_filter(org);
    }
    if params.sort.is_some() || params.dir.is_some() {
        let current = table.query().sort;
        let column = params.sort.as_deref().unwrap_or(current.column.key());
        let dir = params.dir.as_deref().unwrap_or(current.dir_str());
        table.set_sort(SortSpec::from_params(Some(column), Some(dir)));
    }
    if let Some(page_size) = params.page_size {
        table.set_page_size(state.clamp_page_size(page_size));
    }
    if let Some(page) = params.page {
        table.set_page(page);
    }

    remember_unsaved(&session, &table);
    Ok(HttpResponse::Ok().json(table.snapshot()))
}

/// GET /course-team/{username}/changes: the three diff categories.
pub async fn changes(
    state: web::Data<CourseTeamState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let shared = state.tables.get(&path)?;
    let table = shared.lock().await;
    Ok(HttpResponse::Ok().json(ChangesResponse {
        changes: table.changes().clone(),
        save_enabled: table.save_enabled(),
        unsaved_changes: table.has_unsaved_changes(),
    }))
}

/// GET /course-team/{username}/navigation: whether leaving needs a prompt.
pub async fn navigation(
    state: web::Data<CourseTeamState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let username = path.into_inner();
    let shared = state.tables.get(&username)?;
    let table = shared.lock().await;
    Ok(HttpResponse::Ok().json(NavigationResponse {
        username,
        unsaved_changes: table.has_unsaved_changes(),
        navigation: table.navigation(),
    }))
}

/// GET /course-team/{username}/unsaved: the flag as last persisted in this
/// session. Works without a loaded table.
pub async fn unsaved_flag(
    session: Session,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let username = path.into_inner();
    let unsaved_changes = read_unsaved_flag(&SessionFlagStore::new(&session), &username);
    Ok(HttpResponse::Ok().json(UnsavedFlagResponse { username, unsaved_changes }))
}
