/// REST API for the credential gateway
///
/// POST /login  - Verify credentials and issue a session token
/// GET  /health - Liveness probe
pub mod auth;
pub mod models;

pub async fn health() -> &'static str {
    "OK"
}
