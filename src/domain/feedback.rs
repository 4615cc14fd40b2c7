//! Feedback record entity, its lifecycle and client-facing views.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::rating::Rating;
use super::user::User;
use crate::config::UNKNOWN_GIVER_NAME;
use crate::errors::AppError;

/// Overall tone of a feedback record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Neutral => "neutral",
            Sentiment::Negative => "negative",
        }
    }
}

impl FromStr for Sentiment {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "positive" => Ok(Sentiment::Positive),
            "neutral" => Ok(Sentiment::Neutral),
            "negative" => Ok(Sentiment::Negative),
            other => Err(AppError::validation(format!("Invalid sentiment '{}'", other))),
        }
    }
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Feedback record
///
/// Active until the receiver acknowledges it; acknowledged is terminal.
/// `acknowledged_at` is set exactly when `is_acknowledged` is true.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    pub id: Uuid,
    pub giver_id: Uuid,
    pub receiver_id: Uuid,
    pub strengths: String,
    pub areas_to_improve: String,
    pub overall_sentiment: Sentiment,
    pub rating: i32,
    pub is_acknowledged: bool,
    pub acknowledged_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Feedback {
    pub fn is_given_by(&self, user_id: Uuid) -> bool {
        self.giver_id == user_id
    }

    pub fn is_received_by(&self, user_id: Uuid) -> bool {
        self.receiver_id == user_id
    }
}

/// Validated input for a new feedback record
#[derive(Debug, Clone)]
pub struct NewFeedback {
    pub giver_id: Uuid,
    pub receiver_id: Uuid,
    pub strengths: String,
    pub areas_to_improve: String,
    pub overall_sentiment: Sentiment,
    pub rating: Rating,
}

/// Partial edit of a feedback record; `None` leaves the field untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedbackChanges {
    pub strengths: Option<String>,
    pub areas_to_improve: Option<String>,
    pub overall_sentiment: Option<Sentiment>,
    pub rating: Option<Rating>,
}

impl FeedbackChanges {
    pub fn is_empty(&self) -> bool {
        self.strengths.is_none()
            && self.areas_to_improve.is_none()
            && self.overall_sentiment.is_none()
            && self.rating.is_none()
    }
}

/// Outcome of an acknowledge call
#[derive(Debug, Clone)]
pub struct Acknowledgement {
    /// True when the record had already been acknowledged before this call
    pub already: bool,
    pub feedback: Feedback,
}

/// Giver summary attached to received feedback
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GiverInfo {
    pub id: Option<Uuid>,
    #[schema(example = "Jane Roe")]
    pub full_name: String,
}

impl GiverInfo {
    /// Summary for a giver that may no longer resolve to a user
    pub fn from_user(giver: Option<&User>) -> Self {
        match giver {
            Some(user) => Self {
                id: Some(user.id),
                full_name: user.full_name.clone(),
            },
            None => Self {
                id: None,
                full_name: UNKNOWN_GIVER_NAME.to_string(),
            },
        }
    }
}

/// Feedback with its giver summary, when one was resolved
#[derive(Debug, Clone)]
pub struct FeedbackView {
    pub feedback: Feedback,
    pub giver: Option<GiverInfo>,
}

/// Feedback record as returned to clients
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FeedbackResponse {
    pub id: Uuid,
    pub giver_id: Uuid,
    pub receiver_id: Uuid,
    #[schema(example = "Clear direction")]
    pub strengths: String,
    #[schema(example = "More frequent check-ins")]
    pub areas_to_improve: String,
    pub overall_sentiment: Sentiment,
    #[schema(example = 5, minimum = 1, maximum = 5)]
    pub rating: i32,
    pub is_acknowledged: bool,
    pub acknowledged_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub giver: Option<GiverInfo>,
}

impl From<Feedback> for FeedbackResponse {
    fn from(feedback: Feedback) -> Self {
        FeedbackResponse::from(FeedbackView {
            feedback,
            giver: None,
        })
    }
}

impl From<FeedbackView> for FeedbackResponse {
    fn from(view: FeedbackView) -> Self {
        let FeedbackView { feedback, giver } = view;
        Self {
            id: feedback.id,
            giver_id: feedback.giver_id,
            receiver_id: feedback.receiver_id,
            strengths: feedback.strengths,
            areas_to_improve: feedback.areas_to_improve,
            overall_sentiment: feedback.overall_sentiment,
            rating: feedback.rating,
            is_acknowledged: feedback.is_acknowledged,
            acknowledged_at: feedback.acknowledged_at,
            created_at: feedback.created_at,
            updated_at: feedback.updated_at,
            giver,
        }
    }
}
