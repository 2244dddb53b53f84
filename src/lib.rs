//! # climate-sensors
//!
//! Shows temperature and relative humidity from Tinkerforge bricklets on
//! an LCD 20x4 Bricklet.
//!
//! A [`Session`] owns one connection to a brick daemon. Devices are found
//! through enumeration: a Temperature Bricklet and a Humidity Bricklet are
//! polled once and then report every update period, and an LCD 20x4
//! Bricklet gets both readings written to it on every report.
//!
//! The brick daemon protocol itself is not implemented here. The session
//! talks to it through the [`Transport`] traits; the `brickd` feature
//! provides an implementation on top of the `tinkerforge` crate.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use climate_sensors::{brickd::BrickdTransport, Config, Session, Result};
//!
//! fn main() -> Result<()> {
//!     let session = Session::new(Arc::new(BrickdTransport::new()), Config::default());
//!     session.connect()?;
//!
//!     std::thread::sleep(std::time::Duration::from_secs(10));
//!     println!("{:?}", session.readings());
//!
//!     session.disconnect()
//! }
//! ```
//!
//! ## Feature Flags
//!
//! - `brickd`: Tinkerforge transport and the `climate-sensors` binary
//! - `serde`: Enable serialization/deserialization for data types

pub mod config;
pub mod data;
pub mod error;
pub mod session;
pub mod transport;

#[cfg(feature = "brickd")]
pub mod brickd;

pub use config::Config;
pub use data::{DisplayLines, RawHumidity, RawTemperature, Readings};
pub use error::{Error, Result};
pub use session::Session;
pub use transport::{
    CallbackHandle, ConnectReason, ConnectionState, DeviceKind, EnumerateEvent, EnumerationType,
    HumiditySensor, Lcd, TemperatureSensor, Transport,
};
