//! Session checks: the validator capability and the Rocket request guard
//! built on it.

use std::sync::Arc;

pub mod error;
pub mod guards;
pub mod session_store;

pub use error::{AuthError, AuthResult};
pub use guards::ActiveSession;
pub use session_store::{PgSessionValidator, SessionValidator};

#[derive(Clone)]
pub struct SessionState {
    pub cookie_name: String,
    pub validator: Arc<dyn SessionValidator>,
}

impl SessionState {
    pub fn new(cookie_name: impl Into<String>, validator: Arc<dyn SessionValidator>) -> Self {
        Self {
            cookie_name: cookie_name.into(),
            validator,
        }
    }
}
