//! Migration: feedback table.

use sea_orm_migration::prelude::*;

use super::m20240101_000001_create_users_table::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Feedback::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Feedback::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Feedback::GiverId).uuid().not_null())
                    .col(ColumnDef::new(Feedback::ReceiverId).uuid().not_null())
                    .col(ColumnDef::new(Feedback::Strengths).text().not_null())
                    .col(ColumnDef::new(Feedback::AreasToImprove).text().not_null())
                    .col(
                        ColumnDef::new(Feedback::OverallSentiment)
                            .string_len(16)
                            .not_null()
                            .check(
                                Expr::col(Feedback::OverallSentiment)
                                    .is_in(["positive", "neutral", "negative"]),
                            ),
                    )
                    .col(
                        ColumnDef::new(Feedback::Rating)
                            .integer()
                            .not_null()
                            .check(Expr::col(Feedback::Rating).between(1, 5)),
                    )
                    .col(
                        ColumnDef::new(Feedback::IsAcknowledged)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Feedback::AcknowledgedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Feedback::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Feedback::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_feedback_giver_id")
                            .from(Feedback::Table, Feedback::GiverId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_feedback_receiver_id")
                            .from(Feedback::Table, Feedback::ReceiverId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_feedback_receiver_id")
                    .table(Feedback::Table)
                    .col(Feedback::ReceiverId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_feedback_giver_id")
                    .table(Feedback::Table)
                    .col(Feedback::GiverId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Feedback::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Feedback {
    Table,
    Id,
    GiverId,
    ReceiverId,
    Strengths,
    AreasToImprove,
    OverallSentiment,
    Rating,
    IsAcknowledged,
    AcknowledgedAt,
    CreatedAt,
    UpdatedAt,
}
