//! Startup configuration.
//!
//! Values are fixed once a [`Session`](crate::Session) is created. Each
//! option can be overridden from the environment; nothing is read from
//! the command line.

use std::time::Duration;

use tracing::debug;

use crate::error::{Error, Result};

/// Default brick daemon host.
pub const DEFAULT_HOST: &str = "localhost";

/// Default brick daemon port.
pub const DEFAULT_PORT: u16 = 4223;

/// Default sensor callback period.
pub const DEFAULT_UPDATE_PERIOD: Duration = Duration::from_millis(1000);

/// Environment variable overriding the host.
pub const HOST_VAR: &str = "CLIMATE_SENSORS_HOST";

/// Environment variable overriding the port.
pub const PORT_VAR: &str = "CLIMATE_SENSORS_PORT";

/// Environment variable overriding the update period, in milliseconds.
pub const UPDATE_PERIOD_VAR: &str = "CLIMATE_SENSORS_UPDATE_PERIOD_MS";

/// Connection and sampling settings.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Config {
    /// Host running the brick daemon.
    pub host: String,
    /// Port of the brick daemon.
    pub port: u16,
    /// Period of the temperature and humidity value callbacks.
    pub update_period: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            update_period: DEFAULT_UPDATE_PERIOD,
        }
    }
}

impl Config {
    /// Build a configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] if a variable is set but cannot
    /// be parsed, or if the update period is zero.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(host) = lookup(HOST_VAR) {
            let host = host.trim();
            if host.is_empty() {
                return Err(invalid(HOST_VAR, host));
            }
            config.host = host.to_string();
        }

        if let Some(port) = lookup(PORT_VAR) {
            config.port = port.trim().parse().map_err(|_| invalid(PORT_VAR, &port))?;
        }

        if let Some(period) = lookup(UPDATE_PERIOD_VAR) {
            let millis: u64 = period
                .trim()
                .parse()
                .map_err(|_| invalid(UPDATE_PERIOD_VAR, &period))?;
            config = config.with_update_period(Duration::from_millis(millis))?;
        }

        debug!("Loaded configuration: {:?}", config);
        Ok(config)
    }

    /// Set the host.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set the port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the callback period.
    ///
    /// # Errors
    ///
    /// A zero period would disable the sensor callbacks entirely, so it is
    /// rejected with [`Error::InvalidParameter`]. Periods that do not fit
    /// the bricklet's 32-bit millisecond field are rejected too.
    pub fn with_update_period(mut self, period: Duration) -> Result<Self> {
        if period.is_zero() || period.as_millis() > u128::from(u32::MAX) {
            return Err(invalid("update_period", &format!("{:?}", period)));
        }
        self.update_period = period;
        Ok(self)
    }
}

fn invalid(name: &str, value: &str) -> Error {
    Error::InvalidParameter {
        name: name.to_string(),
        value: value.to_string(),
    }
}
