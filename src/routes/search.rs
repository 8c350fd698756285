use crate::auth::{ActiveSession, AuthError};
use crate::error::ApiError;
use crate::routes::params::SearchParams;
use crate::search::{Item, SearchPipeline};
use rocket::State;
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::{get, post};
use rocket_okapi::openapi;

/// Search job postings near a location, tagged with keywords and the
/// caller's favorites. Requires an active session.
#[openapi(tag = "Search")]
#[get("/search?<params..>")]
pub async fn search_items(
    params: Option<SearchParams>,
    session: Result<ActiveSession, AuthError>,
    pipeline: &State<SearchPipeline>,
) -> Result<Json<Vec<Item>>, ApiError> {
    run_search(params, session, pipeline).await
}

/// Same as the GET variant; parameters are read from the query string.
#[openapi(tag = "Search")]
#[post("/search?<params..>")]
pub async fn search_items_post(
    params: Option<SearchParams>,
    session: Result<ActiveSession, AuthError>,
    pipeline: &State<SearchPipeline>,
) -> Result<Json<Vec<Item>>, ApiError> {
    run_search(params, session, pipeline).await
}

async fn run_search(
    params: Option<SearchParams>,
    session: Result<ActiveSession, AuthError>,
    pipeline: &SearchPipeline,
) -> Result<Json<Vec<Item>>, ApiError> {
    // The session decides first so unauthenticated callers always see 403,
    // whatever they sent.
    let session = match session {
        Ok(session) => session,
        Err(err) if err.status() == Status::Forbidden => return Err(ApiError::Forbidden),
        Err(err) => return Err(err.into()),
    };

    let params = params.ok_or_else(|| {
        ApiError::BadRequest("Query parameters 'lat' and 'lon' must be numbers".to_string())
    })?;

    // Favorite flags are private; a caller may only ask for their own.
    let user_id = params.user_id();
    if !user_id.is_empty() && user_id != session.user_id {
        log::debug!(
            "search: session user '{}' asked for favorites of '{}'",
            session.user_id,
            user_id
        );
        return Err(ApiError::Forbidden);
    }

    let items = pipeline
        .run(
            Some(&session),
            user_id,
            params.geo(),
            params.keyword(),
        )
        .await?;

    Ok(Json(items))
}
