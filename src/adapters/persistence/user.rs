use async_trait::async_trait;
use sqlx::Row;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    application::use_cases::user_info::UserRepo,
    domain::entities::user::{User, UserInfo},
};

fn row_to_user(row: sqlx::postgres::PgRow) -> User {
    User {
        id: row.get("id"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
        info: UserInfo {
            id: row.get("info_id"),
            user_id: row.get("id"),
            nickname: row.get("nickname"),
            avatar_url: row.get("avatar_url"),
        },
    }
}

#[async_trait]
impl UserRepo for PostgresPersistence {
    async fn get_with_info(&self, user_id: i64) -> AppResult<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT u.id, u.created_at, u.updated_at,
                   i.id AS info_id, i.nickname, i.avatar_url
            FROM users u
            JOIN user_infos i ON i.user_id = u.id
            WHERE u.id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row.map(row_to_user))
    }
}
