//! Feedback repository implementation.
//!
//! State transitions are single conditional UPDATEs filtered on
//! `is_acknowledged = false`, so concurrent callers cannot both win.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use super::entities::feedback::{self, ActiveModel, Entity as FeedbackEntity};
use crate::domain::{Feedback, FeedbackChanges, NewFeedback};
use crate::errors::AppResult;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Feedback repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait FeedbackRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Feedback>>;

    async fn create(&self, feedback: NewFeedback) -> AppResult<Feedback>;

    /// Apply `changes` only while the record is unacknowledged.
    ///
    /// Returns `None` when no unacknowledged record with this id exists.
    async fn update_unacknowledged(
        &self,
        id: Uuid,
        changes: FeedbackChanges,
    ) -> AppResult<Option<Feedback>>;

    /// Flip an unacknowledged record to acknowledged.
    ///
    /// Returns true only for the call that performed the transition.
    async fn mark_acknowledged(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<bool>;

    /// Records received by `receiver_id`, newest first
    async fn list_by_receiver(&self, receiver_id: Uuid) -> AppResult<Vec<Feedback>>;

    /// Records written by `giver_id`, newest first
    async fn list_by_giver(&self, giver_id: Uuid) -> AppResult<Vec<Feedback>>;

    /// `(receiver_id, rating)` pairs for every record received by any of `receiver_ids`
    async fn ratings_for(&self, receiver_ids: Vec<Uuid>) -> AppResult<Vec<(Uuid, i32)>>;
}

/// Concrete implementation of FeedbackRepository
pub struct FeedbackStore {
    db: DatabaseConnection,
}

impl FeedbackStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl FeedbackRepository for FeedbackStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Feedback>> {
        FeedbackEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(Feedback::try_from)
            .transpose()
    }

    async fn create(&self, feedback: NewFeedback) -> AppResult<Feedback> {
        let now = Utc::now();
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            giver_id: Set(feedback.giver_id),
            receiver_id: Set(feedback.receiver_id),
            strengths: Set(feedback.strengths),
            areas_to_improve: Set(feedback.areas_to_improve),
            overall_sentiment: Set(feedback.overall_sentiment.to_string()),
            rating: Set(feedback.rating.value()),
            is_acknowledged: Set(false),
            acknowledged_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model.insert(&self.db).await?;
        Feedback::try_from(model)
    }

    async fn update_unacknowledged(
        &self,
        id: Uuid,
        changes: FeedbackChanges,
    ) -> AppResult<Option<Feedback>> {
        let mut update = FeedbackEntity::update_many()
            .col_expr(feedback::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(feedback::Column::Id.eq(id))
            .filter(feedback::Column::IsAcknowledged.eq(false));

        if let Some(strengths) = changes.strengths {
            update = update.col_expr(feedback::Column::Strengths, Expr::value(strengths));
        }
        if let Some(areas) = changes.areas_to_improve {
            update = update.col_expr(feedback::Column::AreasToImprove, Expr::value(areas));
        }
        if let Some(sentiment) = changes.overall_sentiment {
            update = update.col_expr(
                feedback::Column::OverallSentiment,
                Expr::value(sentiment.as_str()),
            );
        }
        if let Some(rating) = changes.rating {
            update = update.col_expr(feedback::Column::Rating, Expr::value(rating.value()));
        }

        let result = update.exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Ok(None);
        }

        self.find_by_id(id).await
    }

    async fn mark_acknowledged(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<bool> {
        let result = FeedbackEntity::update_many()
            .col_expr(feedback::Column::IsAcknowledged, Expr::value(true))
            .col_expr(feedback::Column::AcknowledgedAt, Expr::value(at))
            .col_expr(feedback::Column::UpdatedAt, Expr::value(at))
            .filter(feedback::Column::Id.eq(id))
            .filter(feedback::Column::IsAcknowledged.eq(false))
            .exec(&self.db)
            .await?;

        Ok(result.rows_affected == 1)
    }

    async fn list_by_receiver(&self, receiver_id: Uuid) -> AppResult<Vec<Feedback>> {
        let models = FeedbackEntity::find()
            .filter(feedback::Column::ReceiverId.eq(receiver_id))
            .order_by_desc(feedback::Column::CreatedAt)
            .all(&self.db)
            .await?;

        models.into_iter().map(Feedback::try_from).collect()
    }

    async fn list_by_giver(&self, giver_id: Uuid) -> AppResult<Vec<Feedback>> {
        let models = FeedbackEntity::find()
            .filter(feedback::Column::GiverId.eq(giver_id))
            .order_by_desc(feedback::Column::CreatedAt)
            .all(&self.db)
            .await?;

        models.into_iter().map(Feedback::try_from).collect()
    }

    async fn ratings_for(&self, receiver_ids: Vec<Uuid>) -> AppResult<Vec<(Uuid, i32)>> {
        if receiver_ids.is_empty() {
            return Ok(Vec::new());
        }

        let ratings = FeedbackEntity::find()
            .select_only()
            .column(feedback::Column::ReceiverId)
            .column(feedback::Column::Rating)
            .filter(feedback::Column::ReceiverId.is_in(receiver_ids))
            .into_tuple::<(Uuid, i32)>()
            .all(&self.db)
            .await?;

        Ok(ratings)
    }
}
