use sqlx::{PgPool, migrate::Migrator, postgres::PgPoolOptions};
use tracing::info;

use super::InfraError;

/// Schema embedded from `migrations/` at build time.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

pub async fn init_db(database_url: &str, max_connections: u32) -> Result<PgPool, InfraError> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    info!(max_connections, "Connected to database!");

    MIGRATOR.run(&pool).await.map_err(InfraError::Migration)?;
    info!("Database migrations applied");

    Ok(pool)
}
