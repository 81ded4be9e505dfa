//! Password hashing, opaque session tokens and the request extractors that
//! resolve them into users.
//!
//! Passwords use Argon2id. Session tokens are random 32-byte values handed
//! to the client as hex; only a salted SHA-256 hash is stored, so a leaked
//! database does not leak usable tokens.

use axum::{extract::FromRequestParts, http::request::Parts};
use sha2::{Digest, Sha256};

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::db::{queries, AppState};
use crate::error::{AppError, Result};
use crate::models::User;

/// Session lifetime: 30 days.
pub const SESSAO_TTL_SECS: i64 = 30 * 86400;

pub fn hash_senha(senha: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(senha.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
}

pub fn verificar_senha(senha: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(senha.as_bytes(), &parsed)
        .is_ok()
}

/// Generate a new opaque session token (hex of 32 random bytes).
pub fn gerar_token() -> String {
    use rand::RngCore;
    let mut bytes = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Hash a token for database lookups. Salted SHA-256, lowercase hex.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(b"largada-v1:");
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

fn bearer_token(parts: &Parts) -> Result<String> {
    parts
        .headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.to_string())
        .ok_or(AppError::Unauthorized)
}

/// Extractor for an authenticated participant.
pub struct AuthUser(pub User);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> std::result::Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let conn = state.db.get()?;
        let user = queries::get_user_by_sessao(&conn, &hash_token(&token))?
            .ok_or(AppError::Unauthorized)?;
        Ok(AuthUser(user))
    }
}

/// Extractor for an authenticated admin. 403 for non-admin sessions.
pub struct AdminUser(pub User);

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> std::result::Result<Self, Self::Rejection> {
        let AuthUser(user) = AuthUser::from_request_parts(parts, state).await?;
        if !user.admin {
            return Err(AppError::Forbidden("Acesso restrito a administradores".into()));
        }
        Ok(AdminUser(user))
    }
}
