use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Utc;
use rocket_db_pools::sqlx::{self, PgPool};
use sha2::{Digest, Sha256};

use crate::auth::{ActiveSession, AuthResult};

/// Resolves a session token to the session it identifies.
#[rocket::async_trait]
pub trait SessionValidator: Send + Sync {
    /// `Ok(None)` when the token is unknown or expired.
    async fn validate(&self, token: &str) -> AuthResult<Option<ActiveSession>>;
}

/// Sessions kept in the `sessions` table, keyed by token digest.
#[derive(Debug, Clone)]
pub struct PgSessionValidator {
    pool: PgPool,
}

impl PgSessionValidator {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[rocket::async_trait]
impl SessionValidator for PgSessionValidator {
    async fn validate(&self, token: &str) -> AuthResult<Option<ActiveSession>> {
        let user_id: Option<String> = sqlx::query_scalar(
            "SELECT user_id FROM sessions WHERE token_hash = $1 AND expires_at > $2",
        )
        .bind(hash_token(token))
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(user_id.map(|user_id| ActiveSession { user_id }))
    }
}

/// Digest stored in place of the raw token.
pub fn hash_token(token: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(token.as_bytes()))
}
