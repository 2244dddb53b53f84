//! Connection and enumeration events delivered by a transport.

/// Connection state of a transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConnectionState {
    /// Not connected to the brick daemon.
    #[default]
    Disconnected,
    /// Connected to the brick daemon.
    Connected,
    /// Connection lost, automatic reconnect in progress.
    Pending,
}

impl ConnectionState {
    /// Check if connected.
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }

    /// Check if disconnected.
    pub fn is_disconnected(&self) -> bool {
        matches!(self, Self::Disconnected)
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Disconnected => write!(f, "Disconnected"),
            Self::Connected => write!(f, "Connected"),
            Self::Pending => write!(f, "Pending"),
        }
    }
}

/// Why a connection was established.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConnectReason {
    /// Explicit call to connect.
    Request,
    /// The transport reconnected on its own after losing the link.
    AutoReconnect,
}

/// Kind of enumeration event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EnumerationType {
    /// Device answered an explicit enumerate request.
    Available,
    /// Device was newly connected or restarted.
    Connected,
    /// Device was removed. Only `uid` is meaningful for this type.
    Disconnected,
}

/// Bricklet kinds this crate knows how to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DeviceKind {
    /// Temperature Bricklet.
    Temperature,
    /// Humidity Bricklet.
    Humidity,
    /// LCD 20x4 Bricklet.
    Lcd20x4,
}

impl DeviceKind {
    /// Device identifier of the Temperature Bricklet.
    pub const TEMPERATURE_IDENTIFIER: u16 = 216;
    /// Device identifier of the Humidity Bricklet.
    pub const HUMIDITY_IDENTIFIER: u16 = 27;
    /// Device identifier of the LCD 20x4 Bricklet.
    pub const LCD_20X4_IDENTIFIER: u16 = 212;

    /// Look up the kind for a device identifier.
    pub fn from_identifier(device_identifier: u16) -> Option<Self> {
        match device_identifier {
            Self::TEMPERATURE_IDENTIFIER => Some(Self::Temperature),
            Self::HUMIDITY_IDENTIFIER => Some(Self::Humidity),
            Self::LCD_20X4_IDENTIFIER => Some(Self::Lcd20x4),
            _ => None,
        }
    }

    /// The device identifier of this kind.
    pub fn identifier(&self) -> u16 {
        match self {
            Self::Temperature => Self::TEMPERATURE_IDENTIFIER,
            Self::Humidity => Self::HUMIDITY_IDENTIFIER,
            Self::Lcd20x4 => Self::LCD_20X4_IDENTIFIER,
        }
    }
}

impl std::fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Temperature => write!(f, "Temperature Bricklet"),
            Self::Humidity => write!(f, "Humidity Bricklet"),
            Self::Lcd20x4 => write!(f, "LCD 20x4 Bricklet"),
        }
    }
}

/// One enumeration record.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnumerateEvent {
    /// UID of the device.
    pub uid: String,
    /// UID of the brick the device is attached to.
    pub connected_uid: String,
    /// Port or position on the parent brick.
    pub position: char,
    /// Hardware version (major, minor, revision).
    pub hardware_version: [u8; 3],
    /// Firmware version (major, minor, revision).
    pub firmware_version: [u8; 3],
    /// Device identifier, see [`DeviceKind`].
    pub device_identifier: u16,
    /// What kind of event this is.
    pub enumeration_type: EnumerationType,
}

impl EnumerateEvent {
    /// Event announcing an available device, with zeroed version info.
    pub fn available(uid: impl Into<String>, device_identifier: u16) -> Self {
        Self {
            uid: uid.into(),
            connected_uid: String::new(),
            position: '0',
            hardware_version: [0; 3],
            firmware_version: [0; 3],
            device_identifier,
            enumeration_type: EnumerationType::Available,
        }
    }

    /// Event announcing that a device went away.
    pub fn disconnected(uid: impl Into<String>, device_identifier: u16) -> Self {
        Self {
            enumeration_type: EnumerationType::Disconnected,
            ..Self::available(uid, device_identifier)
        }
    }

    /// Whether this event reports a removed device.
    pub fn is_disconnect(&self) -> bool {
        self.enumeration_type == EnumerationType::Disconnected
    }

    /// The known kind of the device, if any.
    pub fn kind(&self) -> Option<DeviceKind> {
        DeviceKind::from_identifier(self.device_identifier)
    }
}
