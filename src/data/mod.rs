//! Data structures for sensor readings.
//!
//! This module contains the fixed-point conversions for raw bricklet values,
//! the cached readings of a session, and the text shown on the LCD.

pub mod display;
pub mod readings;

pub use display::{DisplayLine, DisplayLines, HUMIDITY_LINE, TEMPERATURE_LINE};
pub use readings::{RawHumidity, RawTemperature, Readings};
