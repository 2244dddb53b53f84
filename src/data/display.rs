//! Text shown on the 20x4 LCD.

use std::fmt;

use super::readings::Readings;

/// LCD line and position of the temperature text.
pub const TEMPERATURE_LINE: (u8, u8) = (1, 2);

/// LCD line and position of the humidity text.
pub const HUMIDITY_LINE: (u8, u8) = (2, 2);

/// One piece of text placed at a fixed line and position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayLine {
    /// Zero-based LCD line.
    pub line: u8,
    /// Zero-based column the text starts at.
    pub position: u8,
    /// The text itself.
    pub text: String,
}

impl fmt::Display for DisplayLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{}] {}", self.line, self.position, self.text)
    }
}

/// The two lines rendered from a set of readings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayLines {
    /// Temperature line.
    pub temperature: DisplayLine,
    /// Relative humidity line.
    pub humidity: DisplayLine,
}

impl DisplayLines {
    /// Render readings into LCD text.
    ///
    /// ```
    /// use climate_sensors::data::{DisplayLines, Readings};
    ///
    /// let lines = DisplayLines::render(&Readings { temperature: 21.5, humidity: 45.5 });
    /// assert_eq!(lines.temperature.text, "Temp:   21.50 C");
    /// assert_eq!(lines.humidity.text, "RelHum: 45.50 %");
    /// ```
    pub fn render(readings: &Readings) -> Self {
        Self {
            temperature: DisplayLine {
                line: TEMPERATURE_LINE.0,
                position: TEMPERATURE_LINE.1,
                text: format!("Temp:   {:3.2} C", readings.temperature),
            },
            humidity: DisplayLine {
                line: HUMIDITY_LINE.0,
                position: HUMIDITY_LINE.1,
                text: format!("RelHum: {:3.2} %", readings.humidity),
            },
        }
    }

    /// Lines in write order.
    pub fn iter(&self) -> impl Iterator<Item = &DisplayLine> {
        [&self.temperature, &self.humidity].into_iter()
    }
}
