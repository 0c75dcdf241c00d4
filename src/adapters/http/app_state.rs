use std::sync::Arc;

use crate::{
    application::{jwt::AuthTokenIssuer, use_cases::user_info::UserInfoUseCases},
    infra::config::AppConfig,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub token_issuer: Arc<AuthTokenIssuer>,
    pub user_info_use_cases: Arc<UserInfoUseCases>,
}
