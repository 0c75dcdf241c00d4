use secrecy::SecretString;

/// A user's binding to the mini-program platform.
///
/// `session_key` is the per-login secret handed out by the platform. It is both the
/// salt of client-side signatures and the AES key of encrypted payloads, so it is
/// kept wrapped and never logged.
#[derive(Debug)]
pub struct MiniProgramUser {
    pub id: i64,
    pub user_id: i64,
    pub open_id: String,
    pub session_key: SecretString,
}
