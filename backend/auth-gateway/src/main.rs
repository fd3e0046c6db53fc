use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::{Context, Result};
use auth_gateway::clients::GrpcCredentialVerifier;
use auth_gateway::config::Config;
use auth_gateway::{configure_routes, GatewayState};
use crypto_core::TokenIssuer;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::prelude::*;

#[actix_web::main]
async fn main() -> Result<()> {
    // Structured JSON logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "auth_gateway=info,info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_target(true),
        )
        .init();

    info!("Starting Credential Gateway...");

    let config = Config::from_env().context("Failed to load configuration")?;

    let tokens = TokenIssuer::new(
        config.jwt.secret.as_bytes(),
        config.jwt.issuer.clone(),
        config.jwt.lifetime(),
    )
    .context("Invalid JWT configuration")?;

    info!(
        issuer = %tokens.issuer(),
        lifetime_secs = tokens.lifetime_secs(),
        "Token issuer configured"
    );

    let verifier = GrpcCredentialVerifier::new(
        &config.account_service.url,
        config.account_service.request_timeout(),
    )
    .context("Invalid ACCOUNT_SERVICE_URL")?;

    info!(endpoint = %config.account_service.url, "Account service client initialized");

    let state = web::Data::new(GatewayState::new(Arc::new(verifier), tokens));

    let bind_addr = config.bind_addr();
    info!("Credential Gateway starting on http://{}", bind_addr);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(state.clone())
            .configure(configure_routes)
    })
    .bind(&bind_addr)
    .with_context(|| format!("Failed to bind {}", bind_addr))?
    .run()
    .await
    .context("HTTP server error")?;

    info!("Credential Gateway shutdown complete");
    Ok(())
}
