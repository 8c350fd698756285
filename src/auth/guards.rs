use rocket::Request;
use rocket::State;
use rocket::request::{FromRequest, Outcome};
use rocket_okapi::r#gen::OpenApiGenerator;
use rocket_okapi::request::{OpenApiFromRequest, RequestHeaderInput};

use crate::auth::{AuthError, AuthResult, SessionState};

/// A request carrying a live session cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveSession {
    pub user_id: String,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for ActiveSession {
    type Error = AuthError;

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        match resolve_session(request).await {
            Ok(session) => Outcome::Success(session),
            Err(err) => Outcome::Error((err.status(), err)),
        }
    }
}

impl<'r> OpenApiFromRequest<'r> for ActiveSession {
    fn from_request_input(
        _gen: &mut OpenApiGenerator,
        _name: String,
        _required: bool,
    ) -> rocket_okapi::Result<RequestHeaderInput> {
        Ok(RequestHeaderInput::None)
    }
}

async fn resolve_session(request: &Request<'_>) -> AuthResult<ActiveSession> {
    let state = request
        .guard::<&State<SessionState>>()
        .await
        .succeeded()
        .ok_or_else(|| AuthError::Config("SessionState missing from state".into()))?;

    let token = request
        .cookies()
        .get(&state.cookie_name)
        .map(|cookie| cookie.value().trim().to_string())
        .filter(|value| !value.is_empty())
        .ok_or(AuthError::MissingSession)?;

    state
        .validator
        .validate(&token)
        .await?
        .ok_or(AuthError::InvalidSession)
}
