use std::net::SocketAddr;

use axum::http::HeaderValue;
use env_helpers::get_env_default;
use secrecy::SecretString;
use time::Duration;

use super::InfraError;
use crate::application::jwt::MAX_USER_TOKEN_VALIDITY_SECS;

pub struct AppConfig {
    /// HS256 key for user bearer tokens.
    pub jwt_secret: SecretString,
    /// Lifetime of every issued user token.
    pub jwt_expires: Duration,
    pub bind_addr: SocketAddr,
    pub cors_origin: HeaderValue,
    pub database_url: String,
    pub db_max_connections: u32,
    /// When set, encrypted payloads must carry a watermark for this app id.
    pub mini_program_app_id: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, InfraError> {
        let jwt_secret = required("JWT_SECRET")?;
        let jwt_expires = jwt_validity(get_env_default("JWT_EXPIRES_SECS", 86_400))?;

        let bind_addr: SocketAddr = get_env_default(
            "BIND_ADDR",
            SocketAddr::from(([127, 0, 0, 1], 3001)),
        );
        let cors_origin: HeaderValue =
            get_env_default("CORS_ORIGIN", String::from("http://localhost:3000"))
                .parse()
                .map_err(|_| InfraError::ConfigInvalid {
                    var: "CORS_ORIGIN",
                    reason: "must be a valid header value",
                })?;
        let database_url = required("DATABASE_URL")?;
        let db_max_connections: u32 = get_env_default("DB_MAX_CONNECTIONS", 5);
        let mini_program_app_id = std::env::var("MINI_PROGRAM_APP_ID")
            .ok()
            .filter(|s| !s.trim().is_empty());

        Ok(Self {
            jwt_secret: SecretString::new(jwt_secret.into()),
            jwt_expires,
            bind_addr,
            cors_origin,
            database_url,
            db_max_connections,
            mini_program_app_id,
        })
    }
}

fn required(var: &'static str) -> Result<String, InfraError> {
    std::env::var(var).map_err(|_| InfraError::ConfigMissing { var })
}

fn jwt_validity(secs: i64) -> Result<Duration, InfraError> {
    if secs <= 0 {
        return Err(InfraError::ConfigInvalid {
            var: "JWT_EXPIRES_SECS",
            reason: "must be a positive number of seconds",
        });
    }
    if secs > MAX_USER_TOKEN_VALIDITY_SECS {
        return Err(InfraError::ConfigInvalid {
            var: "JWT_EXPIRES_SECS",
            reason: "must not exceed one year",
        });
    }
    Ok(Duration::seconds(secs))
}
