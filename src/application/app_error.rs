use thiserror::Error;

/// Failures while decoding or validating a bearer token.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    #[error("token signature does not match")]
    InvalidSignature,

    #[error("token expired")]
    Expired,

    #[error("token not valid yet")]
    NotYetValid,

    #[error("token is malformed")]
    Malformed,
}

/// Failures while establishing trust in a client-reported profile.
///
/// The variants are for logs only; callers outside the service see a single
/// rejection for everything except `NoActiveSession`.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrustError {
    #[error("no session key stored for this user")]
    NoActiveSession,

    #[error("profile signature mismatch")]
    SignatureMismatch,

    #[error("payload decryption failed")]
    DecryptionFailed,

    #[error("decrypted payload has unexpected shape")]
    MalformedPlaintext,

    #[error("decrypted payload was issued for another app or user")]
    ForeignPayload,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    #[error("Trust error: {0}")]
    Trust(#[from] TrustError),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Forbidden")]
    Forbidden,

    #[error("Not found")]
    NotFound,

    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Clone, Copy, Debug)]
pub enum ErrorCode {
    DatabaseError,
    InvalidCredentials,
    NoActiveSession,
    PayloadRejected,
    InvalidInput,
    Forbidden,
    NotFound,
    InternalError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::DatabaseError => "DATABASE_ERROR",
            ErrorCode::InvalidCredentials => "INVALID_CREDENTIALS",
            ErrorCode::NoActiveSession => "NO_ACTIVE_SESSION",
            ErrorCode::PayloadRejected => "PAYLOAD_REJECTED",
            ErrorCode::InvalidInput => "INVALID_INPUT",
            ErrorCode::Forbidden => "FORBIDDEN",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
