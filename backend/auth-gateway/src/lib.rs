//! Credential Gateway Library
//!
//! Public HTTP boundary for login: checks the submitted credentials against the
//! account directory over gRPC and issues a signed session token.
//! Re-exports modules for testing and integration

pub mod clients;
pub mod config;
pub mod rest_api;

use actix_web::web;
use clients::CredentialVerifier;
use crypto_core::TokenIssuer;
use std::sync::Arc;

/// Shared handler state, built once in `main`
#[derive(Clone)]
pub struct GatewayState {
    pub verifier: Arc<dyn CredentialVerifier>,
    pub tokens: TokenIssuer,
}

impl GatewayState {
    pub fn new(verifier: Arc<dyn CredentialVerifier>, tokens: TokenIssuer) -> Self {
        Self { verifier, tokens }
    }
}

/// Mount the gateway routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/login", web::route().to(rest_api::auth::login))
        .route("/health", web::get().to(rest_api::health));
}
