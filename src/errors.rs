use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use std::fmt;

use crate::models::course_team::{CourseTeamError, LoadError};
use crate::responses::ApiErrorResponse;
use crate::services::course_roles::ServiceError;

#[derive(Debug)]
pub enum AppError {
    CourseTeam(CourseTeamError),
    Service(ServiceError),
    /// No table has been loaded for this username.
    NotLoaded(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::CourseTeam(e) => write!(f, "{e}"),
            AppError::Service(e) => write!(f, "{e}"),
            AppError::NotLoaded(u) => write!(f, "No course table loaded for {u}"),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::CourseTeam(CourseTeamError::UnknownCourse(_)) => StatusCode::NOT_FOUND,
            AppError::CourseTeam(CourseTeamError::SaveInFlight | CourseTeamError::ReviewOpen) => StatusCode::CONFLICT,
            AppError::CourseTeam(_) => StatusCode::BAD_REQUEST,
            AppError::Service(ServiceError::UnknownSubject(_)) => StatusCode::NOT_FOUND,
            AppError::Service(_) => StatusCode::BAD_GATEWAY,
            AppError::NotLoaded(_) => StatusCode::NOT_FOUND,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("{self}");
        } else {
            log::warn!("{self}");
        }
        let details = match self {
            AppError::Service(ServiceError::Rejected(body)) => Some(body.to_string()),
            _ => None,
        };
        HttpResponse::build(status).json(ApiErrorResponse {
            error: self.to_string(),
            details,
        })
    }
}

impl From<CourseTeamError> for AppError {
    fn from(e: CourseTeamError) -> Self {
        AppError::CourseTeam(e)
    }
}

impl From<ServiceError> for AppError {
    fn from(e: ServiceError) -> Self {
        AppError::Service(e)
    }
}

impl From<LoadError> for AppError {
    fn from(e: LoadError) -> Self {
        match e {
            LoadError::Service(e) => AppError::Service(e),
            LoadError::Rows(e) => AppError::CourseTeam(e),
        }
    }
}
