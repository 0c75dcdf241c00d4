//! Test app state builder for HTTP-level testing.

use std::sync::Arc;

use axum::http::HeaderValue;
use secrecy::SecretString;
use time::Duration;

use crate::{
    adapters::http::app_state::AppState,
    application::use_cases::user_info::UserInfoUseCases,
    infra::config::AppConfig,
    test_utils::{
        InMemoryProfileDb, MiniProgramUserRow, TEST_JWT_EXPIRES_SECS, TEST_JWT_SECRET, UserRow,
        test_token_issuer,
    },
};

/// Builds an `AppState` whose persistence is an [`InMemoryProfileDb`].
///
/// ```ignore
/// let builder = TestAppStateBuilder::new()
///     .with_user(create_test_user(42, |_| {}))
///     .with_mini_program_user(create_test_mini_program_user(42, |_| {}));
/// let db = builder.db();
/// let app_state = builder.build();
/// ```
pub struct TestAppStateBuilder {
    db: Arc<InMemoryProfileDb>,
    app_id: Option<String>,
}

impl Default for TestAppStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestAppStateBuilder {
    pub fn new() -> Self {
        Self {
            db: Arc::new(InMemoryProfileDb::new()),
            app_id: None,
        }
    }

    pub fn with_user(self, user: UserRow) -> Self {
        self.db.insert_user(user);
        self
    }

    pub fn with_mini_program_user(self, row: MiniProgramUserRow) -> Self {
        self.db.insert_mini_program_user(row);
        self
    }

    pub fn with_app_id(mut self, app_id: &str) -> Self {
        self.app_id = Some(app_id.to_string());
        self
    }

    /// Handle on the backing database, for seeding and assertions.
    pub fn db(&self) -> Arc<InMemoryProfileDb> {
        self.db.clone()
    }

    pub fn build(self) -> AppState {
        let config = AppConfig {
            jwt_secret: SecretString::new(TEST_JWT_SECRET.into()),
            jwt_expires: Duration::seconds(TEST_JWT_EXPIRES_SECS),
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            cors_origin: HeaderValue::from_static("http://localhost:3000"),
            database_url: "postgres://unused".to_string(),
            db_max_connections: 1,
            mini_program_app_id: self.app_id.clone(),
        };

        let token_issuer = Arc::new(test_token_issuer());
        let user_info_use_cases = UserInfoUseCases::new(
            self.db.clone(),
            self.db.clone(),
            self.db.clone(),
            token_issuer.clone(),
            self.app_id,
        );

        AppState {
            config: Arc::new(config),
            token_issuer,
            user_info_use_cases: Arc::new(user_info_use_cases),
        }
    }
}
