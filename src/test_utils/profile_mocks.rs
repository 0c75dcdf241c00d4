//! In-memory implementations of the profile persistence ports.
//!
//! Updates are staged on the transaction and applied in one step on commit, which
//! mirrors what a database transaction makes observable.

use async_trait::async_trait;
use secrecy::SecretString;
use std::collections::HashMap;
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};

use crate::{
    app_error::{AppError, AppResult},
    application::use_cases::user_info::{MiniProgramUserRepo, ProfileStore, ProfileTx, UserRepo},
    domain::entities::{
        mini_program_user::MiniProgramUser,
        profile_delta::{MiniProgramUserUpdate, UserInfoUpdate},
        user::{User, UserInfo},
    },
    test_utils::{MiniProgramUserRow, UserRow},
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileTables {
    /// Keyed by user id.
    pub users: HashMap<i64, UserRow>,
    /// Keyed by row id.
    pub mini_program_users: HashMap<i64, MiniProgramUserRow>,
}

// ============================================================================
// InMemoryProfileDb
// ============================================================================

#[derive(Default)]
pub struct InMemoryProfileDb {
    tables: Arc<Mutex<ProfileTables>>,
    fail_user_info: Arc<AtomicBool>,
    rollbacks: Arc<AtomicUsize>,
}

impl InMemoryProfileDb {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_user(&self, user: UserRow) {
        self.tables.lock().unwrap().users.insert(user.id, user);
    }

    pub fn insert_mini_program_user(&self, row: MiniProgramUserRow) {
        self.tables
            .lock()
            .unwrap()
            .mini_program_users
            .insert(row.id, row);
    }

    /// Make every `user_infos` update fail, simulating an error after the vendor
    /// row was already written inside the transaction.
    pub fn fail_user_info_updates(&self, fail: bool) {
        self.fail_user_info.store(fail, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> ProfileTables {
        self.tables.lock().unwrap().clone()
    }

    pub fn rollbacks(&self) -> usize {
        self.rollbacks.load(Ordering::SeqCst)
    }

    pub fn mini_program_user_row(&self, user_id: i64) -> Option<MiniProgramUserRow> {
        self.tables
            .lock()
            .unwrap()
            .mini_program_users
            .values()
            .find(|row| row.user_id == user_id)
            .cloned()
    }

    pub fn user_info_row(&self, user_id: i64) -> Option<UserRow> {
        self.tables.lock().unwrap().users.get(&user_id).cloned()
    }
}

#[async_trait]
impl UserRepo for InMemoryProfileDb {
    async fn get_with_info(&self, user_id: i64) -> AppResult<Option<User>> {
        Ok(self.user_info_row(user_id).map(|row| User {
            id: row.id,
            created_at: None,
            updated_at: None,
            info: UserInfo {
                id: row.info_id,
                user_id: row.id,
                nickname: row.nickname,
                avatar_url: row.avatar_url,
            },
        }))
    }
}

#[async_trait]
impl MiniProgramUserRepo for InMemoryProfileDb {
    async fn get_by_user_id(&self, user_id: i64) -> AppResult<Option<MiniProgramUser>> {
        Ok(self.mini_program_user_row(user_id).map(|row| MiniProgramUser {
            id: row.id,
            user_id: row.user_id,
            open_id: row.open_id,
            session_key: SecretString::new(row.session_key.into()),
        }))
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileDb {
    async fn begin(&self) -> AppResult<Box<dyn ProfileTx>> {
        Ok(Box::new(InMemoryProfileTx {
            tables: self.tables.clone(),
            fail_user_info: self.fail_user_info.load(Ordering::SeqCst),
            rollbacks: self.rollbacks.clone(),
            staged: Vec::new(),
        }))
    }
}

// ============================================================================
// InMemoryProfileTx
// ============================================================================

enum StagedUpdate {
    MiniProgramUser(i64, MiniProgramUserUpdate),
    UserInfo(i64, UserInfoUpdate),
}

pub struct InMemoryProfileTx {
    tables: Arc<Mutex<ProfileTables>>,
    fail_user_info: bool,
    rollbacks: Arc<AtomicUsize>,
    staged: Vec<StagedUpdate>,
}

#[async_trait]
impl ProfileTx for InMemoryProfileTx {
    async fn update_mini_program_user(
        &mut self,
        id: i64,
        update: &MiniProgramUserUpdate,
    ) -> AppResult<()> {
        if !self
            .tables
            .lock()
            .unwrap()
            .mini_program_users
            .contains_key(&id)
        {
            return Err(AppError::NotFound);
        }
        self.staged
            .push(StagedUpdate::MiniProgramUser(id, update.clone()));
        Ok(())
    }

    async fn update_user_info(&mut self, id: i64, update: &UserInfoUpdate) -> AppResult<()> {
        if self.fail_user_info {
            return Err(AppError::TransactionFailed("injected user_infos failure".into()));
        }
        if !self
            .tables
            .lock()
            .unwrap()
            .users
            .values()
            .any(|u| u.info_id == id)
        {
            return Err(AppError::NotFound);
        }
        self.staged.push(StagedUpdate::UserInfo(id, update.clone()));
        Ok(())
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        let InMemoryProfileTx { tables, staged, .. } = *self;
        let mut tables = tables.lock().unwrap();
        for staged in staged {
            match staged {
                StagedUpdate::MiniProgramUser(id, update) => {
                    if let Some(row) = tables.mini_program_users.get_mut(&id) {
                        row.nickname = update.nickname;
                        row.avatar_url = update.avatar_url;
                        row.gender = update.gender;
                        row.province = update.province;
                        row.city = update.city;
                        row.country = update.country;
                        row.language = update.language;
                    }
                }
                StagedUpdate::UserInfo(id, update) => {
                    if let Some(user) = tables.users.values_mut().find(|u| u.info_id == id) {
                        user.nickname = update.nickname;
                        user.avatar_url = update.avatar_url;
                    }
                }
            }
        }
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> AppResult<()> {
        self.rollbacks.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{create_test_mini_program_user, create_test_user};

    #[tokio::test]
    async fn staged_updates_are_invisible_until_commit() {
        let db = InMemoryProfileDb::new();
        db.insert_user(create_test_user(7, |_| {}));
        let before = db.snapshot();

        let mut tx = db.begin().await.unwrap();
        tx.update_user_info(
            507,
            &UserInfoUpdate {
                nickname: "new".into(),
                avatar_url: "new.png".into(),
            },
        )
        .await
        .unwrap();
        assert_eq!(db.snapshot(), before);

        tx.commit().await.unwrap();
        assert_eq!(db.user_info_row(7).unwrap().nickname, "new");
    }

    #[tokio::test]
    async fn rollback_discards_staged_updates() {
        let db = InMemoryProfileDb::new();
        db.insert_mini_program_user(create_test_mini_program_user(7, |_| {}));
        let before = db.snapshot();

        let mut tx = db.begin().await.unwrap();
        tx.update_mini_program_user(
            1007,
            &MiniProgramUserUpdate {
                nickname: "new".into(),
                avatar_url: String::new(),
                gender: 1,
                province: String::new(),
                city: String::new(),
                country: String::new(),
                language: String::new(),
            },
        )
        .await
        .unwrap();
        tx.rollback().await.unwrap();

        assert_eq!(db.snapshot(), before);
        assert_eq!(db.rollbacks(), 1);
    }

    #[tokio::test]
    async fn updating_unknown_row_is_not_found() {
        let db = InMemoryProfileDb::new();
        let mut tx = db.begin().await.unwrap();
        let err = tx
            .update_user_info(
                1,
                &UserInfoUpdate {
                    nickname: String::new(),
                    avatar_url: String::new(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound));
    }
}
