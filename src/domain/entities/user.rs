use serde::Serialize;

#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub created_at: Option<chrono::NaiveDateTime>,
    pub updated_at: Option<chrono::NaiveDateTime>,
    pub info: UserInfo,
}

/// Display fields shared by every login method of a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserInfo {
    pub id: i64,
    pub user_id: i64,
    pub nickname: String,
    pub avatar_url: String,
}

/// Profile summary handed back to the client after an update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthInfo {
    pub id: i64,
    pub nickname: String,
    pub avatar_url: String,
}

impl User {
    pub fn auth_info(&self) -> AuthInfo {
        AuthInfo {
            id: self.id,
            nickname: self.info.nickname.clone(),
            avatar_url: self.info.avatar_url.clone(),
        }
    }
}
