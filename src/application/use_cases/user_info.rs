use std::sync::Arc;

use async_trait::async_trait;
use tracing::instrument;

use crate::{
    app_error::{AppError, AppResult, TrustError},
    application::{
        jwt::{AuthTokenIssuer, Claims},
        session_crypto,
    },
    domain::entities::{
        mini_program_user::MiniProgramUser,
        profile_delta::{MiniProgramUserUpdate, ProfileDelta, UserInfoUpdate},
        user::{AuthInfo, User},
    },
};

// ============================================================================
// Persistence ports
// ============================================================================

#[async_trait]
pub trait UserRepo: Send + Sync {
    /// Load a user together with its `user_infos` row.
    async fn get_with_info(&self, user_id: i64) -> AppResult<Option<User>>;
}

#[async_trait]
pub trait MiniProgramUserRepo: Send + Sync {
    async fn get_by_user_id(&self, user_id: i64) -> AppResult<Option<MiniProgramUser>>;
}

#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn begin(&self) -> AppResult<Box<dyn ProfileTx>>;
}

/// One open transaction. Dropping it without `commit` discards every update.
#[async_trait]
pub trait ProfileTx: Send {
    async fn update_mini_program_user(
        &mut self,
        id: i64,
        update: &MiniProgramUserUpdate,
    ) -> AppResult<()>;

    async fn update_user_info(&mut self, id: i64, update: &UserInfoUpdate) -> AppResult<()>;

    async fn commit(self: Box<Self>) -> AppResult<()>;

    async fn rollback(self: Box<Self>) -> AppResult<()>;
}

// ============================================================================
// Reconciler
// ============================================================================

/// Writes a trusted profile to both user records in one transaction.
pub struct ProfileReconciler {
    store: Arc<dyn ProfileStore>,
}

impl ProfileReconciler {
    pub fn new(store: Arc<dyn ProfileStore>) -> Self {
        Self { store }
    }

    /// The vendor row is always written first so that concurrent updates of the
    /// same user queue up on the same row lock.
    #[instrument(skip(self, vendor, user, delta), fields(user_id = user.id))]
    pub async fn reconcile(
        &self,
        vendor: &MiniProgramUser,
        mut user: User,
        delta: &ProfileDelta,
    ) -> AppResult<User> {
        let mut tx = self.store.begin().await?;

        if let Err(err) = tx
            .update_mini_program_user(vendor.id, &MiniProgramUserUpdate::from(delta))
            .await
        {
            rollback(tx).await;
            return Err(err);
        }

        let info_update = UserInfoUpdate::from(delta);
        if let Err(err) = tx.update_user_info(user.info.id, &info_update).await {
            rollback(tx).await;
            return Err(err);
        }

        tx.commit().await?;

        user.info.nickname = info_update.nickname;
        user.info.avatar_url = info_update.avatar_url;
        Ok(user)
    }
}

async fn rollback(tx: Box<dyn ProfileTx>) {
    if let Err(err) = tx.rollback().await {
        tracing::warn!(error = %err, "Profile rollback failed");
    }
}

// ============================================================================
// Use cases
// ============================================================================

/// Proof attached to a profile update. Exactly one kind per request.
#[derive(Debug, Clone)]
pub enum ProfileProof {
    Signed { raw_data: String, signature: String },
    Encrypted { encrypted_data: String, iv: String },
}

/// A profile whose origin has been checked, tagged with how.
///
/// Only a decrypted profile proves possession of the session key, so only that
/// branch rotates the user's token.
#[derive(Debug, Clone)]
enum TrustedDelta {
    Signed(ProfileDelta),
    Decrypted(ProfileDelta),
}

impl TrustedDelta {
    fn delta(&self) -> &ProfileDelta {
        match self {
            TrustedDelta::Signed(delta) | TrustedDelta::Decrypted(delta) => delta,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RotatedToken {
    pub token: String,
    pub claims: Claims,
}

#[derive(Debug, Clone)]
pub struct ProfileUpdateOutcome {
    pub auth_info: AuthInfo,
    pub rotated: Option<RotatedToken>,
}

pub struct UserInfoUseCases {
    users: Arc<dyn UserRepo>,
    mini_program_users: Arc<dyn MiniProgramUserRepo>,
    reconciler: ProfileReconciler,
    token_issuer: Arc<AuthTokenIssuer>,
    app_id: Option<String>,
}

impl UserInfoUseCases {
    pub fn new(
        users: Arc<dyn UserRepo>,
        mini_program_users: Arc<dyn MiniProgramUserRepo>,
        store: Arc<dyn ProfileStore>,
        token_issuer: Arc<AuthTokenIssuer>,
        app_id: Option<String>,
    ) -> Self {
        Self {
            users,
            mini_program_users,
            reconciler: ProfileReconciler::new(store),
            token_issuer,
            app_id,
        }
    }

    /// Verify `proof` against the stored session key of `user_id` and apply the
    /// profile it carries.
    ///
    /// `user_id` must come from an already verified bearer token.
    #[instrument(skip(self, proof))]
    pub async fn update_profile(
        &self,
        user_id: i64,
        proof: ProfileProof,
    ) -> AppResult<ProfileUpdateOutcome> {
        let vendor = self
            .mini_program_users
            .get_by_user_id(user_id)
            .await?
            .ok_or(TrustError::NoActiveSession)?;

        let trusted = self.establish_trust(&vendor, proof).inspect_err(|err| {
            tracing::warn!(user_id, error = %err, "Rejected profile payload");
        })?;

        let user = self
            .users
            .get_with_info(user_id)
            .await?
            .ok_or(AppError::NotFound)?;

        let user = self
            .reconciler
            .reconcile(&vendor, user, trusted.delta())
            .await?;
        let auth_info = user.auth_info();

        match trusted {
            TrustedDelta::Signed(_) => Ok(ProfileUpdateOutcome {
                auth_info,
                rotated: None,
            }),
            TrustedDelta::Decrypted(_) => {
                let (token, claims) = self.token_issuer.issue_for_user(user.id)?;
                tracing::info!(user_id, exp = claims.exp, "Issued rotated auth token");
                Ok(ProfileUpdateOutcome {
                    auth_info,
                    rotated: Some(RotatedToken { token, claims }),
                })
            }
        }
    }

    fn establish_trust(
        &self,
        vendor: &MiniProgramUser,
        proof: ProfileProof,
    ) -> AppResult<TrustedDelta> {
        match proof {
            ProfileProof::Signed {
                raw_data,
                signature,
            } => {
                if !session_crypto::check_signature(&raw_data, &signature, &vendor.session_key) {
                    return Err(TrustError::SignatureMismatch.into());
                }
                let delta: ProfileDelta = serde_json::from_str(&raw_data).map_err(|_| {
                    AppError::InvalidInput("rawData is not a user info object".into())
                })?;
                Ok(TrustedDelta::Signed(delta))
            }
            ProfileProof::Encrypted {
                encrypted_data,
                iv,
            } => {
                let decrypted =
                    session_crypto::decrypt(&encrypted_data, &iv, &vendor.session_key)?;
                decrypted.ensure_bound_to(self.app_id.as_deref(), &vendor.open_id)?;
                Ok(TrustedDelta::Decrypted(decrypted.profile))
            }
        }
    }
}
