use async_trait::async_trait;
use secrecy::SecretString;
use sqlx::Row;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    application::use_cases::user_info::MiniProgramUserRepo,
    domain::entities::mini_program_user::MiniProgramUser,
};

fn row_to_mini_program_user(row: sqlx::postgres::PgRow) -> MiniProgramUser {
    let session_key: String = row.get("session_key");
    MiniProgramUser {
        id: row.get("id"),
        user_id: row.get("user_id"),
        open_id: row.get("open_id"),
        session_key: SecretString::new(session_key.into()),
    }
}

#[async_trait]
impl MiniProgramUserRepo for PostgresPersistence {
    async fn get_by_user_id(&self, user_id: i64) -> AppResult<Option<MiniProgramUser>> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, open_id, session_key
            FROM mini_program_users
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row.map(row_to_mini_program_user))
    }
}
