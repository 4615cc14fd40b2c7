//! Feedback handlers.

use axum::{
    extract::{Extension, Path, State},
    response::Json,
    routing::{get, post, put},
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::{FeedbackResponse, Sentiment};
use crate::errors::AppResult;
use crate::services::{FeedbackDraft, FeedbackPatch};
use crate::types::Created;

/// New feedback about another user
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateFeedbackRequest {
    /// Receiver of the feedback
    pub target_user_id: Uuid,
    #[validate(length(min = 1, message = "Strengths are required"))]
    #[schema(example = "Clear code reviews")]
    pub strengths: String,
    #[validate(length(min = 1, message = "Areas to improve are required"))]
    #[schema(example = "Estimate more conservatively")]
    pub areas_to_improve: String,
    pub overall_sentiment: Sentiment,
    /// 1 to 5
    #[schema(example = 4, minimum = 1, maximum = 5)]
    pub rating: i32,
}

/// Partial edit; omitted fields keep their value
///
/// Carries no field rules: content is checked only after the caller is
/// confirmed as the giver.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateFeedbackRequest {
    pub feedback_id: Uuid,
    pub strengths: Option<String>,
    pub areas_to_improve: Option<String>,
    pub overall_sentiment: Option<Sentiment>,
    #[schema(example = 5, minimum = 1, maximum = 5)]
    pub rating: Option<i32>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AcknowledgeRequest {
    pub feedback_id: Uuid,
}

/// Acknowledge outcome
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AcknowledgeResponse {
    #[schema(example = "Feedback acknowledged")]
    pub message: String,
    /// True when an earlier call had already acknowledged the record
    pub already_acknowledged: bool,
    pub acknowledged_at: Option<DateTime<Utc>>,
}

/// Feedback routes (all need a session)
pub fn feedback_routes() -> Router<AppState> {
    Router::new()
        .route("/create", post(create_feedback))
        .route("/update", put(update_feedback))
        .route("/acknowledge", post(acknowledge_feedback))
        .route("/received", get(list_received))
        .route("/given", get(list_given))
        .route("/history/:user_id", get(team_history))
}

/// Give feedback to another user
#[utoipa::path(
    post,
    path = "/api/feedback/create",
    tag = "Feedback",
    security(("bearer_auth" = [])),
    request_body = CreateFeedbackRequest,
    responses(
        (status = 201, description = "Feedback recorded", body = FeedbackResponse),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Receiver not found")
    )
)]
pub async fn create_feedback(
    State(state): State<AppState>,
    Extension(CurrentUser(giver)): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<CreateFeedbackRequest>,
) -> AppResult<Created<FeedbackResponse>> {
    let view = state
        .feedback_service
        .create(
            &giver,
            FeedbackDraft {
                receiver_id: payload.target_user_id,
                strengths: payload.strengths,
                areas_to_improve: payload.areas_to_improve,
                overall_sentiment: payload.overall_sentiment,
                rating: payload.rating,
            },
        )
        .await?;

    Ok(Created(FeedbackResponse::from(view)))
}

/// Edit feedback you gave, until it is acknowledged
#[utoipa::path(
    put,
    path = "/api/feedback/update",
    tag = "Feedback",
    security(("bearer_auth" = [])),
    request_body = UpdateFeedbackRequest,
    responses(
        (status = 200, description = "Feedback updated", body = FeedbackResponse),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Only the giver may edit"),
        (status = 404, description = "Feedback not found"),
        (status = 409, description = "Feedback already acknowledged")
    )
)]
pub async fn update_feedback(
    State(state): State<AppState>,
    Extension(CurrentUser(actor)): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<UpdateFeedbackRequest>,
) -> AppResult<Json<FeedbackResponse>> {
    let patch = FeedbackPatch {
        strengths: payload.strengths,
        areas_to_improve: payload.areas_to_improve,
        overall_sentiment: payload.overall_sentiment,
        rating: payload.rating,
    };
    let feedback = state
        .feedback_service
        .update(&actor, payload.feedback_id, patch)
        .await?;

    Ok(Json(FeedbackResponse::from(feedback)))
}

/// Confirm you have read feedback you received
#[utoipa::path(
    post,
    path = "/api/feedback/acknowledge",
    tag = "Feedback",
    security(("bearer_auth" = [])),
    request_body = AcknowledgeRequest,
    responses(
        (status = 200, description = "Acknowledged (or already was)", body = AcknowledgeResponse),
        (status = 403, description = "Only the receiver may acknowledge"),
        (status = 404, description = "Feedback not found")
    )
)]
pub async fn acknowledge_feedback(
    State(state): State<AppState>,
    Extension(CurrentUser(actor)): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<AcknowledgeRequest>,
) -> AppResult<Json<AcknowledgeResponse>> {
    let outcome = state
        .feedback_service
        .acknowledge(&actor, payload.feedback_id)
        .await?;

    let message = if outcome.already {
        "Already acknowledged"
    } else {
        "Feedback acknowledged"
    };
    Ok(Json(AcknowledgeResponse {
        message: message.to_string(),
        already_acknowledged: outcome.already,
        acknowledged_at: outcome.feedback.acknowledged_at,
    }))
}

/// Feedback you received, with giver names
#[utoipa::path(
    get,
    path = "/api/feedback/received",
    tag = "Feedback",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Received feedback", body = Vec<FeedbackResponse>)
    )
)]
pub async fn list_received(
    State(state): State<AppState>,
    Extension(CurrentUser(actor)): Extension<CurrentUser>,
) -> AppResult<Json<Vec<FeedbackResponse>>> {
    let views = state.feedback_service.list_received(&actor).await?;
    Ok(Json(views.into_iter().map(FeedbackResponse::from).collect()))
}

/// Feedback you gave
#[utoipa::path(
    get,
    path = "/api/feedback/given",
    tag = "Feedback",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Given feedback", body = Vec<FeedbackResponse>)
    )
)]
pub async fn list_given(
    State(state): State<AppState>,
    Extension(CurrentUser(actor)): Extension<CurrentUser>,
) -> AppResult<Json<Vec<FeedbackResponse>>> {
    let records = state.feedback_service.list_given(&actor).await?;
    Ok(Json(records.into_iter().map(FeedbackResponse::from).collect()))
}

/// Feedback received by one of your direct reports (managers only)
#[utoipa::path(
    get,
    path = "/api/feedback/history/{user_id}",
    tag = "Feedback",
    security(("bearer_auth" = [])),
    params(("user_id" = Uuid, Path, description = "Team member ID")),
    responses(
        (
            status = 200,
            description = "Team member's received feedback",
            body = Vec<FeedbackResponse>
        ),
        (status = 403, description = "Not your direct report, or not a manager"),
        (status = 404, description = "User not found")
    )
)]
pub async fn team_history(
    State(state): State<AppState>,
    Extension(CurrentUser(actor)): Extension<CurrentUser>,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<Vec<FeedbackResponse>>> {
    let views = state
        .feedback_service
        .list_history_for(&actor, user_id)
        .await?;
    Ok(Json(views.into_iter().map(FeedbackResponse::from).collect()))
}
