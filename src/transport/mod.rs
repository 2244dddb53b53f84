//! Capability interface to the brick daemon.
//!
//! The wire protocol, device enumeration and callback dispatch belong to
//! the vendor library. This module only describes what the session needs
//! from it: a connection that reports connects and enumerations, and
//! typed handles for the three supported bricklets.
//!
//! Handlers may be invoked from any transport thread.

pub mod callback;
pub mod events;

use std::time::Duration;

pub use callback::CallbackHandle;
pub use events::{ConnectReason, ConnectionState, DeviceKind, EnumerateEvent, EnumerationType};

use crate::error::Result;

/// Handler for completed (re)connections.
pub type ConnectedHandler = Box<dyn Fn(ConnectReason) + Send + Sync>;

/// Handler for enumeration events.
pub type EnumerateHandler = Box<dyn Fn(EnumerateEvent) + Send + Sync>;

/// Handler for periodic temperature values, in hundredths of °C.
pub type TemperatureHandler = Box<dyn Fn(i16) + Send + Sync>;

/// Handler for periodic humidity values, in tenths of %RH.
pub type HumidityHandler = Box<dyn Fn(u16) + Send + Sync>;

/// A connection to a brick daemon.
#[cfg_attr(test, mockall::automock)]
pub trait Transport: Send + Sync {
    /// Open the connection.
    fn connect(&self, host: &str, port: u16) -> Result<()>;

    /// Close the connection.
    fn disconnect(&self) -> Result<()>;

    /// Current connection state.
    fn connection_state(&self) -> ConnectionState;

    /// Ask every attached device to announce itself.
    fn enumerate(&self) -> Result<()>;

    /// Register a handler for completed (re)connections.
    fn on_connected(&self, handler: ConnectedHandler) -> CallbackHandle;

    /// Register a handler for enumeration events.
    fn on_enumerate(&self, handler: EnumerateHandler) -> CallbackHandle;

    /// Create a handle for the Temperature Bricklet with `uid`.
    fn temperature_sensor(&self, uid: &str) -> Result<Box<dyn TemperatureSensor>>;

    /// Create a handle for the Humidity Bricklet with `uid`.
    fn humidity_sensor(&self, uid: &str) -> Result<Box<dyn HumiditySensor>>;

    /// Create a handle for the LCD 20x4 Bricklet with `uid`.
    fn lcd(&self, uid: &str) -> Result<Box<dyn Lcd>>;
}

/// Temperature Bricklet.
#[cfg_attr(test, mockall::automock)]
pub trait TemperatureSensor: Send + Sync {
    /// UID of the device.
    fn uid(&self) -> String;

    /// Poll the current temperature in hundredths of °C.
    fn temperature(&self) -> Result<i16>;

    /// Set the period of the temperature callback.
    fn set_temperature_callback_period(&self, period: Duration) -> Result<()>;

    /// Register a handler for the periodic temperature callback.
    fn on_temperature(&self, handler: TemperatureHandler) -> CallbackHandle;
}

/// Humidity Bricklet.
#[cfg_attr(test, mockall::automock)]
pub trait HumiditySensor: Send + Sync {
    /// UID of the device.
    fn uid(&self) -> String;

    /// Poll the current relative humidity in tenths of a percent.
    fn humidity(&self) -> Result<u16>;

    /// Set the period of the humidity callback.
    fn set_humidity_callback_period(&self, period: Duration) -> Result<()>;

    /// Register a handler for the periodic humidity callback.
    fn on_humidity(&self, handler: HumidityHandler) -> CallbackHandle;
}

/// LCD 20x4 Bricklet.
#[cfg_attr(test, mockall::automock)]
pub trait Lcd: Send + Sync {
    /// UID of the device.
    fn uid(&self) -> String;

    /// Turn the backlight on.
    fn backlight_on(&self) -> Result<()>;

    /// Turn the backlight off.
    fn backlight_off(&self) -> Result<()>;

    /// Clear all four lines.
    fn clear_display(&self) -> Result<()>;

    /// Write `text` to `line`, starting at `position`.
    fn write_line(&self, line: u8, position: u8, text: &str) -> Result<()>;
}
