use actix_web::{get, HttpResponse, Responder};
use serde_json::json;

/// Liveness probe
///
/// Answers unconditionally and never touches the database; a healthy process
/// with a broken store still reports up, and the store surfaces its own
/// errors per request. Reports the crate name and version so deployments can
/// tell what is actually running.
#[get("/health")]
pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "status": "up",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
