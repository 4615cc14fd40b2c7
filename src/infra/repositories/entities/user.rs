//! User database entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::User;
use crate::errors::AppError;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub username: String,
    pub full_name: String,
    pub password_hash: String,
    pub role: String,
    /// Direct manager; NULL for managers and unassigned developers
    pub manager_id: Option<Uuid>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "Entity",
        from = "Column::ManagerId",
        to = "Column::Id",
        on_delete = "SetNull"
    )]
    Manager,
}

impl ActiveModelBehavior for ActiveModel {}

/// Convert database model to domain entity
impl TryFrom<Model> for User {
    type Error = AppError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let role = model.role.parse().map_err(|_| {
            AppError::internal(format!(
                "Unknown role '{}' stored for user {}",
                model.role, model.id
            ))
        })?;

        Ok(User {
            id: model.id,
            username: model.username,
            password_hash: model.password_hash,
            full_name: model.full_name,
            role,
            manager_id: model.manager_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
