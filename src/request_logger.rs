use rocket::fairing::{Fairing, Info, Kind};
use rocket::{Data, Request, Response};
use std::time::Instant;

/// Logs one line per request with its status and latency. Server errors are
/// logged at `warn` so they stand out at the default filter.
pub struct RequestLogger;

/// Arrival time stashed in the request-local cache.
struct Arrival(Instant);

#[rocket::async_trait]
impl Fairing for RequestLogger {
    fn info(&self) -> Info {
        Info {
            name: "Request Logger",
            kind: Kind::Request | Kind::Response,
        }
    }

    async fn on_request(&self, request: &mut Request<'_>, _: &mut Data<'_>) {
        request.local_cache(|| Arrival(Instant::now()));
    }

    async fn on_response<'r>(&self, request: &'r Request<'_>, response: &mut Response<'r>) {
        let elapsed_ms = request.local_cache(|| Arrival(Instant::now())).0.elapsed().as_secs_f64() * 1000.0;
        let status = response.status();
        // Query strings carry user ids; log the path only.
        let path = request.uri().path();

        if status.code >= 500 {
            log::warn!("{} {} -> {} ({:.2}ms)", request.method(), path, status.code, elapsed_ms);
        } else {
            log::info!("{} {} -> {} ({:.2}ms)", request.method(), path, status.code, elapsed_ms);
        }
    }
}
