//! MedPortal gateway - session authorization and backend proxy.
//!
//! This binary starts the HTTP server and configures all components.

use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use medportal_gateway::{
    backend::{Backend, HttpBackend},
    config::Config,
    server::{create_router, RouterConfig},
};

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::parse();

    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let backend = match HttpBackend::new(&config.backend_url, config.backend_deadline()) {
        Ok(backend) => backend,
        Err(e) => {
            error!("Failed to create backend client: {}", e);
            return ExitCode::FAILURE;
        }
    };

    log_configuration(&config, &backend);

    let router = create_router(backend, build_router_config(&config));

    let addr = config.bind_address();

    info!("");
    info!("────────────────────────────────────────────────────────────────");
    info!("  MedPortal gateway v{}", env!("CARGO_PKG_VERSION"));
    info!("  Server listening on: http://{}", addr);
    info!("");
    info!("  Try these endpoints:");
    info!("    curl http://{}/health", addr);
    info!("    curl http://{}/dashboard-stats", addr);
    info!("────────────────────────────────────────────────────────────────");
    info!("");

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = axum::serve(listener, router).await {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

/// Log the effective configuration, warning about development-only settings.
fn log_configuration(config: &Config, backend: &impl Backend) {
    info!("Configuration:");
    info!("  Backend: {}", backend.base_url());
    info!("  Backend deadline: {}s", config.backend_timeout);

    if config.session_secret.is_some() {
        info!("  Session cookies: signed");
    } else {
        warn!("  Session cookies: UNSIGNED - the admin role can be forged by editing the cookie");
        warn!("        Enable signing: --session-secret=<secret>");
    }

    if config.allow_demo_fallback {
        warn!("  Demo login fallback: ENABLED - development only");
    }

    match &config.cors_origins {
        Some(origins) => info!("  CORS origins: {}", origins.join(", ")),
        None => info!("  CORS origins: any"),
    }
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "medportal_gateway=debug,tower_http=debug"
    } else {
        "medportal_gateway=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Build RouterConfig from the application Config.
fn build_router_config(config: &Config) -> RouterConfig {
    let mut router_config = RouterConfig::new().with_tracing(!config.no_tracing);

    if let Some(ref secret) = config.session_secret {
        router_config = router_config.with_session_secret(secret.clone());
    }

    if config.allow_demo_fallback {
        if let Some(demo) = config.demo_credentials() {
            router_config = router_config.with_demo_fallback(demo);
        }
    }

    if let Some(ref origins) = config.cors_origins {
        router_config = router_config.with_cors_origins(origins.clone());
    }

    router_config
}
