//! Checks on profile data the mini-program client sends back.
//!
//! The platform gives the client two ways to prove a profile is genuine, both keyed
//! by the `session_key` established at login:
//! - `rawData` plus `signature = sha1(rawData + session_key)` in lowercase hex
//! - `encryptedData` and `iv`, AES-128-CBC/PKCS#7 under the base64-decoded session key

use aes::Aes128;
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit, block_padding::Pkcs7};
use base64::{Engine as _, engine::general_purpose};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use sha1::{Digest, Sha1};
use subtle::ConstantTimeEq;

use crate::app_error::TrustError;
use crate::domain::entities::profile_delta::ProfileDelta;

type Aes128CbcDec = cbc::Decryptor<Aes128>;
type Aes128CbcEnc = cbc::Encryptor<Aes128>;

const BLOCK_LEN: usize = 16;

// ============================================================================
// Signature path
// ============================================================================

pub fn signature_of(raw: &str, session_key: &SecretString) -> String {
    let mut hasher = Sha1::new();
    hasher.update(raw.as_bytes());
    hasher.update(session_key.expose_secret().as_bytes());
    hex::encode(hasher.finalize())
}

/// Returns false on any mismatch; a false result is an expected outcome.
pub fn check_signature(raw: &str, client_signature: &str, session_key: &SecretString) -> bool {
    let expected = signature_of(raw, session_key);
    let provided = client_signature.trim().to_ascii_lowercase();
    expected.as_bytes().ct_eq(provided.as_bytes()).into()
}

// ============================================================================
// Decryption path
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Watermark {
    #[serde(default)]
    pub appid: String,
}

/// Decrypted user-info document as produced by the platform.
#[derive(Debug, Clone, Deserialize)]
pub struct DecryptedProfile {
    #[serde(flatten)]
    pub profile: ProfileDelta,
    #[serde(rename = "openId")]
    pub open_id: Option<String>,
    pub watermark: Option<Watermark>,
}

impl DecryptedProfile {
    /// Reject payloads sealed for another app or another platform user.
    ///
    /// Either check is skipped when the payload (or the configuration) does not
    /// carry the field.
    pub fn ensure_bound_to(&self, app_id: Option<&str>, open_id: &str) -> Result<(), TrustError> {
        if let Some(expected) = app_id
            && let Some(watermark) = &self.watermark
            && watermark.appid != expected
        {
            return Err(TrustError::ForeignPayload);
        }
        if let Some(claimed) = &self.open_id
            && claimed != open_id
        {
            return Err(TrustError::ForeignPayload);
        }
        Ok(())
    }
}

fn decode_b64(value: &str) -> Result<Vec<u8>, TrustError> {
    general_purpose::STANDARD
        .decode(value.trim().as_bytes())
        .map_err(|_| TrustError::DecryptionFailed)
}

pub fn decrypt_bytes(
    encrypted_b64: &str,
    iv_b64: &str,
    session_key: &SecretString,
) -> Result<Vec<u8>, TrustError> {
    let key = decode_b64(session_key.expose_secret())?;
    let iv = decode_b64(iv_b64)?;
    let data = decode_b64(encrypted_b64)?;
    if data.is_empty() || data.len() % BLOCK_LEN != 0 {
        return Err(TrustError::DecryptionFailed);
    }
    let cipher =
        Aes128CbcDec::new_from_slices(&key, &iv).map_err(|_| TrustError::DecryptionFailed)?;
    cipher
        .decrypt_padded_vec_mut::<Pkcs7>(&data)
        .map_err(|_| TrustError::DecryptionFailed)
}

/// Decrypt and parse an encrypted user-info payload.
///
/// Bad base64, key/IV length, padding or non-UTF-8 output is `DecryptionFailed`;
/// readable text that is not a user-info object is `MalformedPlaintext`.
pub fn decrypt(
    encrypted_b64: &str,
    iv_b64: &str,
    session_key: &SecretString,
) -> Result<DecryptedProfile, TrustError> {
    let plain = decrypt_bytes(encrypted_b64, iv_b64, session_key)?;
    let text = String::from_utf8(plain).map_err(|_| TrustError::DecryptionFailed)?;
    serde_json::from_str(&text).map_err(|_| TrustError::MalformedPlaintext)
}

/// Inverse of [`decrypt_bytes`], returning base64 ciphertext.
pub fn encrypt(
    plaintext: &[u8],
    iv_b64: &str,
    session_key: &SecretString,
) -> Result<String, TrustError> {
    let key = decode_b64(session_key.expose_secret())?;
    let iv = decode_b64(iv_b64)?;
    let cipher =
        Aes128CbcEnc::new_from_slices(&key, &iv).map_err(|_| TrustError::DecryptionFailed)?;
    let sealed = cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext);
    Ok(general_purpose::STANDARD.encode(sealed))
}
