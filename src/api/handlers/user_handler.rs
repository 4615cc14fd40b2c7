//! Directory handlers - team relationships and user lookups.

use axum::{
    extract::{Extension, Path, State},
    response::Json,
    routing::{get, put},
    Router,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::{UserResponse, UserSummary};
use crate::errors::AppResult;
use crate::types::MessageResponse;

/// The caller's manager, if one is assigned
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ManagerResponse {
    pub manager: Option<UserSummary>,
}

/// Routes open to anyone
pub fn public_user_routes() -> Router<AppState> {
    Router::new()
        .route("/managers", get(list_managers))
        .route("/:id", get(get_user))
}

/// Routes that need a session
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/:id/assign-manager", put(assign_manager))
        .route("/:id/change-manager/:new_manager_id", put(change_manager))
        .route("/team", get(list_team))
        .route("/manager", get(get_manager))
        .route("/all", get(list_all))
}

/// Put a developer on the caller's team (managers only)
#[utoipa::path(
    put,
    path = "/api/users/{id}/assign-manager",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Developer ID")),
    responses(
        (status = 200, description = "Developer assigned", body = MessageResponse),
        (status = 400, description = "Target is not a developer"),
        (status = 403, description = "Managers only"),
        (status = 404, description = "User not found")
    )
)]
pub async fn assign_manager(
    State(state): State<AppState>,
    Extension(CurrentUser(actor)): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<MessageResponse>> {
    let developer = state.directory_service.assign_manager(&actor, id).await?;
    Ok(Json(MessageResponse::new(format!(
        "{} is now managed by {}",
        developer.username, actor.username
    ))))
}

/// Move a developer to another manager (managers only)
#[utoipa::path(
    put,
    path = "/api/users/{id}/change-manager/{new_manager_id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Developer ID"),
        ("new_manager_id" = Uuid, Path, description = "Destination manager ID")
    ),
    responses(
        (status = 200, description = "Developer reassigned", body = MessageResponse),
        (status = 400, description = "Target is not a developer or destination is not a manager"),
        (status = 403, description = "Managers only"),
        (status = 404, description = "User not found")
    )
)]
pub async fn change_manager(
    State(state): State<AppState>,
    Extension(CurrentUser(actor)): Extension<CurrentUser>,
    Path((id, new_manager_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<MessageResponse>> {
    let developer = state
        .directory_service
        .reassign_manager(&actor, id, new_manager_id)
        .await?;
    Ok(Json(MessageResponse::new(format!(
        "{} has been moved to a new manager",
        developer.username
    ))))
}

/// The caller's direct reports with their ratings (managers only)
#[utoipa::path(
    get,
    path = "/api/users/team",
    tag = "Users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Team members", body = Vec<UserSummary>),
        (status = 403, description = "Managers only")
    )
)]
pub async fn list_team(
    State(state): State<AppState>,
    Extension(CurrentUser(actor)): Extension<CurrentUser>,
) -> AppResult<Json<Vec<UserSummary>>> {
    Ok(Json(state.directory_service.list_team(&actor).await?))
}

/// The caller's manager
#[utoipa::path(
    get,
    path = "/api/users/manager",
    tag = "Users",
    security(("bearer_auth" = [])),
    responses(
        (
            status = 200,
            description = "Manager, or null when none is assigned",
            body = ManagerResponse
        )
    )
)]
pub async fn get_manager(
    State(state): State<AppState>,
    Extension(CurrentUser(actor)): Extension<CurrentUser>,
) -> AppResult<Json<ManagerResponse>> {
    let manager = state.directory_service.get_manager(&actor).await?;
    Ok(Json(ManagerResponse { manager }))
}

/// Every user with their manager (managers only)
#[utoipa::path(
    get,
    path = "/api/users/all",
    tag = "Users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All users", body = Vec<UserResponse>),
        (status = 403, description = "Managers only")
    )
)]
pub async fn list_all(
    State(state): State<AppState>,
    Extension(CurrentUser(actor)): Extension<CurrentUser>,
) -> AppResult<Json<Vec<UserResponse>>> {
    Ok(Json(state.directory_service.list_all(&actor).await?))
}

/// All managers, for picking one at registration
#[utoipa::path(
    get,
    path = "/api/users/managers",
    tag = "Users",
    responses(
        (status = 200, description = "All managers", body = Vec<UserSummary>)
    )
)]
pub async fn list_managers(State(state): State<AppState>) -> AppResult<Json<Vec<UserSummary>>> {
    Ok(Json(state.directory_service.list_managers().await?))
}

/// Public user profile
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    tag = "Users",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User profile", body = UserResponse),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<UserResponse>> {
    Ok(Json(state.directory_service.get_by_id(id).await?))
}
