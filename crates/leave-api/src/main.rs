//! Leave server entry point
//!
//! Run with:
//! ```bash
//! cargo run -p leave-api --bin leave-server
//! ```
//!
//! Configuration is loaded from environment variables (and a `.env` file if present).

use leave_common::{try_init_tracing, AppConfig, TracingConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;

    if let Err(e) = try_init_tracing(&TracingConfig::for_environment(config.app.env)) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    info!(
        env = ?config.app.env,
        backend = ?config.storage.backend,
        address = %config.api.address(),
        "Starting leave server"
    );

    if let Err(e) = leave_api::run(config).await {
        error!(error = %e, "Server failed");
        return Err(e.into());
    }

    Ok(())
}
