use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use time::{Duration, OffsetDateTime};

use crate::app_error::{AppError, AppResult, TokenError};
use crate::domain::entities::subject::Subject;

/// Upper bound for the configured user token lifetime (one year).
pub const MAX_USER_TOKEN_VALIDITY_SECS: i64 = 365 * 24 * 60 * 60;

// ============================================================================
// Claims codec
// ============================================================================

/// Claims carried by every bearer token.
///
/// `sub` holds the JSON encoding of an arbitrary subject; the codec never looks
/// inside it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub nbf: i64,
    pub exp: i64,
}

impl Claims {
    /// Decode the subject payload into the caller's type.
    pub fn subject<T: DeserializeOwned>(&self) -> Result<T, TokenError> {
        serde_json::from_str(&self.sub).map_err(|_| TokenError::Malformed)
    }
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: Claims,
}

pub fn issue<S: Serialize>(
    subject: &S,
    validity_secs: i64,
    secret: &SecretString,
) -> AppResult<IssuedToken> {
    issue_at(
        subject,
        validity_secs,
        secret,
        OffsetDateTime::now_utc().unix_timestamp(),
    )
}

pub fn issue_at<S: Serialize>(
    subject: &S,
    validity_secs: i64,
    secret: &SecretString,
    now: i64,
) -> AppResult<IssuedToken> {
    if validity_secs <= 0 {
        return Err(AppError::InvalidInput(
            "token validity must be positive".into(),
        ));
    }
    let exp = now
        .checked_add(validity_secs)
        .ok_or_else(|| AppError::InvalidInput("token validity too large".into()))?;
    let sub = serde_json::to_string(subject)
        .map_err(|e| AppError::Internal(format!("subject encode failed: {e}")))?;
    let claims = Claims {
        sub,
        iat: now,
        nbf: now,
        exp,
    };
    let header = Header::new(Algorithm::HS256);
    let token = encode(
        &header,
        &claims,
        &EncodingKey::from_secret(secret.expose_secret().as_bytes()),
    )
    .map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(IssuedToken { token, claims })
}

pub fn verify(token: &str, secret: &SecretString) -> Result<Claims, TokenError> {
    verify_at(token, secret, OffsetDateTime::now_utc().unix_timestamp())
}

/// Check the tag first, then the validity window against `now`.
pub fn verify_at(token: &str, secret: &SecretString, now: i64) -> Result<Claims, TokenError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;
    validation.validate_nbf = false;
    validation.leeway = 0;
    validation.set_required_spec_claims(&["exp", "nbf", "sub"]);

    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.expose_secret().as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => TokenError::InvalidSignature,
        _ => TokenError::Malformed,
    })?;

    if claims.iat != claims.nbf || claims.nbf > claims.exp {
        return Err(TokenError::Malformed);
    }
    if now > claims.exp {
        return Err(TokenError::Expired);
    }
    if now < claims.nbf {
        return Err(TokenError::NotYetValid);
    }
    Ok(claims)
}

// ============================================================================
// User token issuer
// ============================================================================

/// Mints and checks user tokens with the process-wide secret and validity window.
pub struct AuthTokenIssuer {
    secret: SecretString,
    validity: Duration,
}

impl AuthTokenIssuer {
    pub fn new(secret: SecretString, validity: Duration) -> Self {
        Self { secret, validity }
    }

    pub fn issue_for_user(&self, user_id: i64) -> AppResult<(String, Claims)> {
        let issued = issue(
            &Subject::User { id: user_id },
            self.validity.whole_seconds(),
            &self.secret,
        )?;
        Ok((issued.token, issued.claims))
    }

    pub fn verify_subject(&self, token: &str) -> Result<Subject, TokenError> {
        verify(token, &self.secret)?.subject()
    }
}
