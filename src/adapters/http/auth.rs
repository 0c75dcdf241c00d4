use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};

use crate::{
    adapters::http::app_state::AppState,
    app_error::{AppError, TokenError},
    domain::entities::subject::Subject,
};

/// A caller whose bearer token was verified and names a plain user.
///
/// This is the only source of the user id for profile updates; request bodies
/// never carry one.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub user_id: i64,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| AppError::Token(TokenError::Malformed))?;

        match state.token_issuer.verify_subject(bearer.token())? {
            Subject::User { id } => Ok(AuthUser { user_id: id }),
            other => {
                tracing::warn!(subject = ?other, "Non-user subject on user endpoint");
                Err(AppError::Forbidden)
            }
        }
    }
}
