use serde::{Deserialize, Serialize};

use crate::models::course_team::guard::NavigationDecision;
use crate::models::course_team::{ChangeSet, RoleValue, TableSnapshot};
use crate::services::course_roles::RoleUpdateResult;

/// API error response.
#[derive(Serialize, Deserialize, Debug)]
pub struct ApiErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Body of `POST /{username}/load`.
#[derive(Deserialize, Debug)]
pub struct LoadRequest {
    pub email: String,
}

/// Query string of `GET /{username}`. Only given parameters change the view.
#[derive(Deserialize, Debug, Default)]
pub struct ViewParams {
    pub search: Option<String>,
    pub status: Option<String>,
    pub org: Option<String>,
    pub sort: Option<String>,
    pub dir: Option<String>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

#[derive(Deserialize, Debug)]
pub struct ToggleRequest {
    pub course_id: String,
}

#[derive(Deserialize, Debug)]
pub struct SetRoleRequest {
    pub course_id: String,
    pub role: RoleValue,
}

#[derive(Deserialize, Debug)]
pub struct BulkRoleRequest {
    pub role: RoleValue,
}

#[derive(Serialize, Debug)]
pub struct BulkRoleResponse {
    pub updated: usize,
    pub table: TableSnapshot,
}

#[derive(Serialize, Debug)]
pub struct ChangesResponse {
    pub changes: ChangeSet,
    pub save_enabled: bool,
    pub unsaved_changes: bool,
}

#[derive(Serialize, Debug)]
pub struct SaveResponse {
    pub result: RoleUpdateResult,
    pub table: TableSnapshot,
}

#[derive(Serialize, Debug)]
pub struct NavigationResponse {
    pub username: String,
    pub unsaved_changes: bool,
    pub navigation: NavigationDecision,
}

#[derive(Serialize, Debug)]
pub struct UnsavedFlagResponse {
    pub username: String,
    pub unsaved_changes: bool,
}
