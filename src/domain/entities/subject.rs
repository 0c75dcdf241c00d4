use serde::{Deserialize, Serialize};

/// Who a bearer token speaks for. Serialized into the token's `sub` claim as
/// `{"kind":"user","id":42}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Subject {
    User { id: i64 },
    Admin { id: i64 },
}
