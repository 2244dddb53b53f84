//! Raw sensor values and their display units.

/// Raw temperature value from a Temperature Bricklet.
///
/// The bricklet reports hundredths of a degree Celsius as a signed 16-bit
/// integer, so `2345` means 23.45 °C.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RawTemperature(pub i16);

impl RawTemperature {
    /// Number of raw units per degree Celsius.
    pub const SCALE: f64 = 100.0;

    /// Convert the raw value to Celsius.
    ///
    /// # Example
    ///
    /// ```
    /// use climate_sensors::data::RawTemperature;
    ///
    /// assert_eq!(RawTemperature(2345).to_celsius(), 23.45);
    /// ```
    pub fn to_celsius(&self) -> f64 {
        f64::from(self.0) / Self::SCALE
    }
}

impl From<i16> for RawTemperature {
    fn from(value: i16) -> Self {
        Self(value)
    }
}

/// Raw relative humidity value from a Humidity Bricklet.
///
/// The bricklet reports tenths of a percent, so `455` means 45.5 %RH.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RawHumidity(pub u16);

impl RawHumidity {
    /// Number of raw units per percent.
    pub const SCALE: f64 = 10.0;

    /// Convert the raw value to percent relative humidity.
    ///
    /// # Example
    ///
    /// ```
    /// use climate_sensors::data::RawHumidity;
    ///
    /// assert_eq!(RawHumidity(455).to_percent(), 45.5);
    /// ```
    pub fn to_percent(&self) -> f64 {
        f64::from(self.0) / Self::SCALE
    }
}

impl From<u16> for RawHumidity {
    fn from(value: u16) -> Self {
        Self(value)
    }
}

/// Most recent values of both sensors, in display units.
///
/// Both fields start at `0.0` and are updated independently; a sensor that
/// never reported keeps its default.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Readings {
    /// Temperature in degrees Celsius.
    pub temperature: f64,
    /// Relative humidity in percent.
    pub humidity: f64,
}

impl Readings {
    /// Cache a raw temperature value.
    pub fn update_temperature(&mut self, raw: RawTemperature) {
        self.temperature = raw.to_celsius();
    }

    /// Cache a raw humidity value.
    pub fn update_humidity(&mut self, raw: RawHumidity) {
        self.humidity = raw.to_percent();
    }
}
