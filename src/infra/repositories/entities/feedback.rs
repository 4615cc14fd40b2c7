//! Feedback database entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::Feedback;
use crate::errors::AppError;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "feedback")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub giver_id: Uuid,
    pub receiver_id: Uuid,
    #[sea_orm(column_type = "Text")]
    pub strengths: String,
    #[sea_orm(column_type = "Text")]
    pub areas_to_improve: String,
    pub overall_sentiment: String,
    pub rating: i32,
    pub is_acknowledged: bool,
    pub acknowledged_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::GiverId",
        to = "super::user::Column::Id"
    )]
    Giver,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::ReceiverId",
        to = "super::user::Column::Id"
    )]
    Receiver,
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Feedback {
    type Error = AppError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let overall_sentiment = model.overall_sentiment.parse().map_err(|_| {
            AppError::internal(format!(
                "Unknown sentiment '{}' stored for feedback {}",
                model.overall_sentiment, model.id
            ))
        })?;

        Ok(Feedback {
            id: model.id,
            giver_id: model.giver_id,
            receiver_id: model.receiver_id,
            strengths: model.strengths,
            areas_to_improve: model.areas_to_improve,
            overall_sentiment,
            rating: model.rating,
            is_acknowledged: model.is_acknowledged,
            acknowledged_at: model.acknowledged_at,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
