use crate::{
    adapters::http::app_state::AppState,
    application::{
        jwt::AuthTokenIssuer,
        use_cases::user_info::{MiniProgramUserRepo, ProfileStore, UserInfoUseCases, UserRepo},
    },
    infra::{InfraError, config::AppConfig, postgres_persistence},
};
use secrecy::{ExposeSecret, SecretString};
use std::fs::File;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub async fn init_app_state() -> Result<AppState, InfraError> {
    let config = AppConfig::from_env()?;

    let postgres_arc =
        Arc::new(postgres_persistence(&config.database_url, config.db_max_connections).await?);

    let token_issuer = Arc::new(AuthTokenIssuer::new(
        SecretString::new(config.jwt_secret.expose_secret().into()),
        config.jwt_expires,
    ));

    let user_info_use_cases = UserInfoUseCases::new(
        postgres_arc.clone() as Arc<dyn UserRepo>,
        postgres_arc.clone() as Arc<dyn MiniProgramUserRepo>,
        postgres_arc.clone() as Arc<dyn ProfileStore>,
        token_issuer.clone(),
        config.mini_program_app_id.clone(),
    );

    Ok(AppState {
        config: Arc::new(config),
        token_issuer,
        user_info_use_cases: Arc::new(user_info_use_cases),
    })
}

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "miniprogram_auth=debug,tower_http=debug".into());

    // Console (pretty logs)
    let console_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .pretty();

    // File (structured JSON logs); skipped when the file cannot be created.
    let json_layer = File::create("app.log").ok().map(|file| {
        fmt::layer()
            .json()
            .with_writer(file)
            .with_current_span(true)
            .with_span_list(true)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(json_layer)
        .try_init()
        .ok();
}
