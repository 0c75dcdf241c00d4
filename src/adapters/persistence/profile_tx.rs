//! Transactional writes for profile reconciliation.
//!
//! Both updates run on one connection inside `BEGIN ... COMMIT`. Each `UPDATE`
//! takes the row lock, so concurrent reconciliations of the same user queue
//! behind each other in the order the reconciler writes (vendor row first).

use async_trait::async_trait;
use sqlx::{Postgres, Transaction};

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    application::use_cases::user_info::{ProfileStore, ProfileTx},
    domain::entities::profile_delta::{MiniProgramUserUpdate, UserInfoUpdate},
};

pub struct PostgresProfileTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl ProfileStore for PostgresPersistence {
    async fn begin(&self) -> AppResult<Box<dyn ProfileTx>> {
        let tx = self.pool.begin().await.map_err(|err| {
            tracing::error!(error = ?err, "Failed to begin transaction");
            AppError::TransactionFailed("begin failed".into())
        })?;
        Ok(Box::new(PostgresProfileTx { tx }))
    }
}

#[async_trait]
impl ProfileTx for PostgresProfileTx {
    async fn update_mini_program_user(
        &mut self,
        id: i64,
        update: &MiniProgramUserUpdate,
    ) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE mini_program_users
            SET nickname = $2, avatar_url = $3, gender = $4, province = $5,
                city = $6, country = $7, language = $8, updated_at = CURRENT_TIMESTAMP
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&update.nickname)
        .bind(&update.avatar_url)
        .bind(update.gender)
        .bind(&update.province)
        .bind(&update.city)
        .bind(&update.country)
        .bind(&update.language)
        .execute(&mut *self.tx)
        .await
        .map_err(AppError::from)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    async fn update_user_info(&mut self, id: i64, update: &UserInfoUpdate) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE user_infos
            SET nickname = $2, avatar_url = $3, updated_at = CURRENT_TIMESTAMP
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&update.nickname)
        .bind(&update.avatar_url)
        .execute(&mut *self.tx)
        .await
        .map_err(AppError::from)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        self.tx.commit().await.map_err(|err| {
            tracing::error!(error = ?err, "Failed to commit transaction");
            AppError::TransactionFailed("commit failed".into())
        })
    }

    async fn rollback(self: Box<Self>) -> AppResult<()> {
        self.tx.rollback().await.map_err(|err| {
            tracing::error!(error = ?err, "Failed to roll back transaction");
            AppError::TransactionFailed("rollback failed".into())
        })
    }
}
