use actix_session::Session;
use actix_web::{web, HttpResponse};

use crate::errors::AppError;
use crate::models::course_team::CourseTable;
use crate::models::course_team::guard::persist_unsaved_flag;
use crate::models::course_team::save::{LogSaveObserver, SaveState};
use crate::responses::SaveResponse;
use crate::session::SessionFlagStore;
use super::{CourseTeamState, SharedTable, remember_unsaved};

/// POST /course-team/{username}/review: open the confirmation dialog.
pub async fn open_review(
    state: web::Data<CourseTeamState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let shared = state.tables.get(&path)?;
    let mut table = shared.lock().await;
    table.open_review()?;
    Ok(HttpResponse::Ok().json(table.snapshot()))
}

/// POST /course-team/{username}/review/cancel: back to editing, edits kept.
pub async fn cancel_review(
    state: web::Data<CourseTeamState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let shared = state.tables.get(&path)?;
    let mut table = shared.lock().await;
    table.cancel_review()?;
    Ok(HttpResponse::Ok().json(table.snapshot()))
}

/// POST /course-team/{username}/save: confirm the review and submit.
///
/// The table lock is released while the backend call is in flight; the
/// controller's `Pending` state refuses a second confirmation meanwhile.
pub async fn confirm(
    state: web::Data<CourseTeamState>,
    session: Session,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let username = path.into_inner();
    let shared = state.tables.get(&username)?;

    let request = {
        let mut table = shared.lock().await;
        table.begin_save(&mut LogSaveObserver)?
    };

    let response = state.service.submit_role_changes(&request).await;

    let mut table = shared.lock().await;
    let outcome = table.finish_save(response, &mut LogSaveObserver);
    match &outcome {
        // The scheduled reload re-baselines on the saved rows.
        Ok(_) => persist_unsaved_flag(&mut SessionFlagStore::new(&session), &username, false),
        Err(_) => remember_unsaved(&session, &table),
    }
    let result = outcome?;

    schedule_close_and_reload(state.clone(), shared.clone());
    Ok(HttpResponse::Ok().json(SaveResponse { result, table: table.snapshot() }))
}

/// After the display delay: re-fetch the subject's courses so the saved
/// state becomes the new baseline, which also closes the dialog. The table
/// stays locked across the re-fetch. Skipped if the dialog already closed.
fn schedule_close_and_reload(state: web::Data<CourseTeamState>, shared: SharedTable) {
    actix_web::rt::spawn(async move {
        tokio::time::sleep(state.close_delay).await;

        let mut table = shared.lock().await;
        if table.save_controller().state() != SaveState::Complete || !table.save_controller().dialog_open() {
            return;
        }

        match CourseTable::load(state.service.as_ref(), table.subject().clone()).await {
            Ok(fresh) => {
                log::info!("Reloaded course table for {}", fresh.subject().username);
                let page_size = table.query().page_size;
                *table = fresh.with_page_size(page_size);
            }
            Err(e) => {
                log::error!("Reload after save failed: {e}");
                table.close_dialog();
            }
        }
    });
}
