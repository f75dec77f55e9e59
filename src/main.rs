//! Entry point for the Fleet Estimator binary.
//!
//! Running this binary starts an HTTP server exposing the estimate,
//! dashboard, result token, contact and health endpoints.  Settings are
//! read from `FLEET_*` environment variables; see
//! [`fleet_estimator::config::ServerConfig`].

use fleet_estimator::config::ServerConfig;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let config = ServerConfig::from_env();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&config.log_filter)
                .unwrap_or_else(|_| EnvFilter::new(fleet_estimator::config::DEFAULT_LOG_FILTER)),
        )
        .with_target(false)
        .init();

    if let Err(err) = fleet_estimator::api::serve(config).await {
        error!("Error running server: {:#}", err);
        std::process::exit(1);
    }
}
