use serde::Deserialize;

/// Profile fields reported by the mini-program client.
///
/// Field names follow the platform's JSON (`nickName`, `avatarUrl`); lowercase
/// spellings are accepted as well. Missing fields default to empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProfileDelta {
    #[serde(rename = "nickName", alias = "nickname", default)]
    pub nickname: String,
    #[serde(rename = "avatarUrl", alias = "avatar_url", default)]
    pub avatar_url: String,
    #[serde(default)]
    pub gender: i16,
    #[serde(default)]
    pub province: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub language: String,
}

/// Column values written to `mini_program_users`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MiniProgramUserUpdate {
    pub nickname: String,
    pub avatar_url: String,
    pub gender: i16,
    pub province: String,
    pub city: String,
    pub country: String,
    pub language: String,
}

/// Column values written to `user_infos`. Only the display fields are mirrored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserInfoUpdate {
    pub nickname: String,
    pub avatar_url: String,
}

impl From<&ProfileDelta> for MiniProgramUserUpdate {
    fn from(delta: &ProfileDelta) -> Self {
        Self {
            nickname: delta.nickname.clone(),
            avatar_url: delta.avatar_url.clone(),
            gender: delta.gender,
            province: delta.province.clone(),
            city: delta.city.clone(),
            country: delta.country.clone(),
            language: delta.language.clone(),
        }
    }
}

impl From<&ProfileDelta> for UserInfoUpdate {
    fn from(delta: &ProfileDelta) -> Self {
        Self {
            nickname: delta.nickname.clone(),
            avatar_url: delta.avatar_url.clone(),
        }
    }
}
