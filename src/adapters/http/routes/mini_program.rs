use axum::{Json, Router, extract::State, response::IntoResponse, routing::put};
use serde::{Deserialize, Serialize};

use crate::{
    adapters::http::{app_state::AppState, auth::AuthUser},
    app_error::{AppError, AppResult},
    application::use_cases::user_info::{ProfileProof, ProfileUpdateOutcome},
    domain::entities::user::AuthInfo,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/user-info", put(update_user_info))
}

/// Body sent by the mini-program after `getUserProfile`. The SDK also sends a
/// parsed `userInfo` object; it is unsigned and ignored here.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserInfoPayload {
    raw_data: Option<String>,
    signature: Option<String>,
    encrypted_data: Option<String>,
    iv: Option<String>,
}

impl UserInfoPayload {
    fn into_proof(self) -> AppResult<ProfileProof> {
        let signed = match (self.raw_data, self.signature) {
            (Some(raw_data), Some(signature)) if !raw_data.is_empty() && !signature.is_empty() => {
                Some(ProfileProof::Signed {
                    raw_data,
                    signature,
                })
            }
            _ => None,
        };
        let encrypted = match (self.encrypted_data, self.iv) {
            (Some(encrypted_data), Some(iv)) if !encrypted_data.is_empty() && !iv.is_empty() => {
                Some(ProfileProof::Encrypted { encrypted_data, iv })
            }
            _ => None,
        };

        match (signed, encrypted) {
            (Some(proof), None) | (None, Some(proof)) => Ok(proof),
            (Some(_), Some(_)) => Err(AppError::InvalidInput(
                "send either rawData/signature or encryptedData/iv, not both".into(),
            )),
            (None, None) => Err(AppError::InvalidInput(
                "rawData/signature or encryptedData/iv required".into(),
            )),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UserInfoResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    auth_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    auth_issued_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    auth_expires_at: Option<i64>,
    auth_info: AuthInfo,
}

impl From<ProfileUpdateOutcome> for UserInfoResponse {
    fn from(outcome: ProfileUpdateOutcome) -> Self {
        match outcome.rotated {
            Some(rotated) => Self {
                auth_token: Some(rotated.token),
                auth_issued_at: Some(rotated.claims.iat),
                auth_expires_at: Some(rotated.claims.exp),
                auth_info: outcome.auth_info,
            },
            None => Self {
                auth_token: None,
                auth_issued_at: None,
                auth_expires_at: None,
                auth_info: outcome.auth_info,
            },
        }
    }
}

async fn update_user_info(
    State(app_state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<UserInfoPayload>,
) -> AppResult<impl IntoResponse> {
    let proof = payload.into_proof()?;
    let outcome = app_state
        .user_info_use_cases
        .update_profile(user.user_id, proof)
        .await?;
    Ok(Json(UserInfoResponse::from(outcome)))
}
