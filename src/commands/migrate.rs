//! Migrate command - Database migration management.

use crate::cli::args::{MigrateAction, MigrateArgs};
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::infra::Database;

/// Execute the migrate command
pub async fn execute(args: MigrateArgs, config: Config) -> AppResult<()> {
    // Manual control: nothing runs until the action says so
    let db = Database::connect_without_migrations(&config)
        .await
        .map_err(|e| AppError::internal(format!("Database connection failed: {}", e)))?;

    match args.action {
        MigrateAction::Up => {
            db.run_migrations().await?;
            tracing::info!("Schema is up to date");
        }
        MigrateAction::Down => {
            db.rollback_migration().await?;
            tracing::info!("Rolled back the latest migration");
        }
        MigrateAction::Status => {
            let status = db.migration_status().await?;
            let pending = status.iter().filter(|(_, applied)| !applied).count();
            for (name, applied) in &status {
                println!("{:<45} {}", name, if *applied { "applied" } else { "pending" });
            }
            println!("{} of {} pending", pending, status.len());
        }
        MigrateAction::Fresh => {
            tracing::warn!("Dropping all tables and re-running every migration");
            db.fresh_migrations().await?;
            tracing::info!("Fresh schema created");
        }
    }

    Ok(())
}
