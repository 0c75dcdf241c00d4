pub mod app_error;
pub mod jwt;
pub mod session_crypto;
pub mod use_cases;
