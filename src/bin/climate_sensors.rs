//! Shows temperature and relative humidity on an LCD 20x4 Bricklet.
//!
//! Connect settings come from `CLIMATE_SENSORS_HOST`, `CLIMATE_SENSORS_PORT`
//! and `CLIMATE_SENSORS_UPDATE_PERIOD_MS`. Log level from `RUST_LOG`.

use std::sync::Arc;

use climate_sensors::brickd::BrickdTransport;
use climate_sensors::{Config, Result, Session};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;
    let session = Session::new(Arc::new(BrickdTransport::new()), config);
    session.connect()?;

    println!("Press key to exit");

    let mut line = String::new();
    let mut stdin = BufReader::new(tokio::io::stdin());
    tokio::select! {
        read = stdin.read_line(&mut line) => {
            read?;
        }
        _ = tokio::signal::ctrl_c() => {
            println!();
        }
    }

    session.disconnect()
}
