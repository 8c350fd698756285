use rocket::http::Status;
use thiserror::Error;

pub type AuthResult<T> = Result<T, AuthError>;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("no session cookie")]
    MissingSession,
    #[error("session unknown or expired")]
    InvalidSession,
    #[error("configuration error: {0}")]
    Config(String),
    #[error("database error: {0}")]
    Sqlx(#[from] rocket_db_pools::sqlx::Error),
}

impl AuthError {
    pub fn status(&self) -> Status {
        match self {
            AuthError::MissingSession | AuthError::InvalidSession => Status::Forbidden,
            AuthError::Config(_) | AuthError::Sqlx(_) => Status::InternalServerError,
        }
    }
}
