use std::process::ExitCode;

use log::{error, info};
use termlink_runner::{BridgeConfig, bootstrap};

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "termlink.toml".to_string());
    let config = match BridgeConfig::load(&path) {
        Ok(config) => config,
        Err(e) => {
            error!("{path}: {e}");
            return ExitCode::FAILURE;
        }
    };

    let bridge = match bootstrap::start(&config) {
        Ok(bridge) => bridge,
        Err(e) => {
            error!("failed to start bridge: {e}");
            return ExitCode::FAILURE;
        }
    };
    info!(
        "bridge '{}' running, tick {}ms",
        config.broker_key, config.timing.tick_ms
    );

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("signal handler failed: {e}");
    }
    info!("shutting down");
    let _ = bridge.shutdown.send(());
    let _ = bridge.handle.await;
    ExitCode::SUCCESS
}
