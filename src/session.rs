//! Session controller for one brick daemon connection.
//!
//! Tracks at most one Temperature, Humidity and LCD 20x4 bricklet and keeps
//! the LCD showing the latest cached readings. All device discovery comes
//! from enumeration events; every successful (re)connect enumerates again
//! and repopulates the device slots from scratch.

use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use tracing::{debug, error, info, trace, warn};

use crate::config::Config;
use crate::data::{DisplayLines, RawHumidity, RawTemperature, Readings};
use crate::error::Result;
use crate::transport::{
    CallbackHandle, ConnectReason, ConnectionState, DeviceKind, EnumerateEvent, HumiditySensor,
    Lcd, TemperatureSensor, Transport,
};

/// A device handle together with its value-callback registration.
///
/// Dropping it unregisters the callback.
struct Attached<D: ?Sized> {
    device: Box<D>,
    _callback: CallbackHandle,
}

/// Everything guarded by the session lock.
#[derive(Default)]
struct SessionState {
    temperature: Option<Attached<dyn TemperatureSensor>>,
    humidity: Option<Attached<dyn HumiditySensor>>,
    lcd: Option<Box<dyn Lcd>>,
    readings: Readings,
}

impl SessionState {
    /// Write both lines if a display is attached. Called with the lock held
    /// so the two writes are never interleaved with another refresh.
    fn refresh_display(&self) -> Result<()> {
        let lcd = match &self.lcd {
            Some(lcd) => lcd,
            None => return Ok(()),
        };

        for line in DisplayLines::render(&self.readings).iter() {
            trace!("Writing {}", line);
            lcd.write_line(line.line, line.position, &line.text)?;
        }
        Ok(())
    }
}

struct Inner {
    transport: Arc<dyn Transport>,
    config: Config,
    state: Mutex<SessionState>,
    /// Connected/enumerate registrations on the transport.
    registrations: Mutex<Vec<CallbackHandle>>,
}

/// Controller for one connection to a brick daemon.
///
/// Handlers registered on the transport hold only a weak reference to the
/// session, so dropping the session unregisters them.
pub struct Session {
    inner: Arc<Inner>,
}

impl Session {
    /// Create a session and register its handlers on `transport`.
    ///
    /// Nothing is sent until [`Session::connect`] is called.
    pub fn new(transport: Arc<dyn Transport>, config: Config) -> Self {
        let inner = Arc::new(Inner {
            transport,
            config,
            state: Mutex::new(SessionState::default()),
            registrations: Mutex::new(Vec::new()),
        });

        let weak = Arc::downgrade(&inner);
        let connected = inner.transport.on_connected(Box::new(move |reason| {
            if let Some(inner) = weak.upgrade() {
                if let Err(e) = inner.handle_connected(reason) {
                    error!("Enumerate after connect failed: {}", e);
                }
            }
        }));

        let weak = Arc::downgrade(&inner);
        let enumerate = inner.transport.on_enumerate(Box::new(move |event| {
            if let Some(inner) = weak.upgrade() {
                let uid = event.uid.clone();
                if let Err(e) = inner.handle_enumerate(event) {
                    error!("Failed to set up device {}: {}", uid, e);
                }
            }
        }));

        inner.registrations.lock().extend([connected, enumerate]);

        Self { inner }
    }

    /// Connect to the configured brick daemon and request enumeration.
    ///
    /// Does nothing unless the transport is disconnected.
    ///
    /// # Errors
    ///
    /// Transport errors are returned as-is; nothing is retried.
    pub fn connect(&self) -> Result<()> {
        self.inner.connect()
    }

    /// Blank the display and close the connection.
    ///
    /// Does nothing if the transport is already disconnected.
    pub fn disconnect(&self) -> Result<()> {
        self.inner.disconnect()
    }

    /// Handle a completed (re)connection by enumerating again.
    pub fn handle_connected(&self, reason: ConnectReason) -> Result<()> {
        self.inner.handle_connected(reason)
    }

    /// Handle one enumeration event.
    pub fn handle_enumerate(&self, event: EnumerateEvent) -> Result<()> {
        self.inner.handle_enumerate(event)
    }

    /// Handle a periodic temperature value (hundredths of °C).
    pub fn handle_temperature(&self, raw: i16) -> Result<()> {
        self.inner.handle_temperature(raw)
    }

    /// Handle a periodic humidity value (tenths of %RH).
    pub fn handle_humidity(&self, raw: u16) -> Result<()> {
        self.inner.handle_humidity(raw)
    }

    /// Write the cached readings to the LCD, if one is attached.
    pub fn refresh_display(&self) -> Result<()> {
        self.inner.state.lock().refresh_display()
    }

    /// Latest cached readings.
    pub fn readings(&self) -> Readings {
        self.inner.state.lock().readings
    }

    /// Connection state reported by the transport.
    pub fn connection_state(&self) -> ConnectionState {
        self.inner.transport.connection_state()
    }

    /// Whether a Temperature Bricklet is attached.
    pub fn has_temperature_sensor(&self) -> bool {
        self.inner.state.lock().temperature.is_some()
    }

    /// Whether a Humidity Bricklet is attached.
    pub fn has_humidity_sensor(&self) -> bool {
        self.inner.state.lock().humidity.is_some()
    }

    /// Whether an LCD is attached.
    pub fn has_display(&self) -> bool {
        self.inner.state.lock().lcd.is_some()
    }

    /// The configuration this session was created with.
    pub fn config(&self) -> &Config {
        &self.inner.config
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("Session")
            .field("config", &self.inner.config)
            .field("readings", &state.readings)
            .field("temperature", &state.temperature.as_ref().map(|t| t.device.uid()))
            .field("humidity", &state.humidity.as_ref().map(|h| h.device.uid()))
            .field("lcd", &state.lcd.as_ref().map(|l| l.uid()))
            .finish()
    }
}

impl Inner {
    fn connect(&self) -> Result<()> {
        if !self.transport.connection_state().is_disconnected() {
            debug!("Already connected");
            return Ok(());
        }

        info!(
            "Connecting to brick daemon at {}:{}",
            self.config.host, self.config.port
        );
        self.transport.connect(&self.config.host, self.config.port)?;
        self.transport.enumerate()
    }

    fn disconnect(&self) -> Result<()> {
        if self.transport.connection_state().is_disconnected() {
            return Ok(());
        }

        info!("Disconnecting from brick daemon");

        {
            let state = self.state.lock();
            if let Some(lcd) = &state.lcd {
                if let Err(e) = lcd.backlight_off().and_then(|_| lcd.clear_display()) {
                    warn!("Error blanking display {}: {}", lcd.uid(), e);
                }
            }
        }

        self.transport.disconnect()
    }

    fn handle_connected(&self, reason: ConnectReason) -> Result<()> {
        info!("Connected ({:?}), enumerating devices", reason);
        self.transport.enumerate()
    }

    fn handle_enumerate(self: &Arc<Self>, event: EnumerateEvent) -> Result<()> {
        if event.is_disconnect() {
            // Slots and readings are left alone; a later enumeration of the
            // same kind replaces the stale handle.
            debug!("Device {} disconnected", event.uid);
            return Ok(());
        }

        match event.kind() {
            Some(DeviceKind::Temperature) => self.attach_temperature(&event.uid),
            Some(DeviceKind::Humidity) => self.attach_humidity(&event.uid),
            Some(DeviceKind::Lcd20x4) => self.attach_lcd(&event.uid),
            None => {
                debug!(
                    "Ignoring device {} with identifier {}",
                    event.uid, event.device_identifier
                );
                Ok(())
            }
        }
    }

    fn attach_temperature(self: &Arc<Self>, uid: &str) -> Result<()> {
        let sensor = self.transport.temperature_sensor(uid)?;

        let weak: Weak<Self> = Arc::downgrade(self);
        let callback = sensor.on_temperature(Box::new(move |raw| {
            if let Some(inner) = weak.upgrade() {
                if let Err(e) = inner.handle_temperature(raw) {
                    error!("Failed to show temperature: {}", e);
                }
            }
        }));

        let raw = sensor.temperature()?;
        self.state
            .lock()
            .readings
            .update_temperature(RawTemperature::from(raw));

        sensor.set_temperature_callback_period(self.config.update_period)?;

        info!("Attached {} {}", DeviceKind::Temperature, uid);
        let previous = self.state.lock().temperature.replace(Attached {
            device: sensor,
            _callback: callback,
        });
        if let Some(previous) = previous {
            debug!("Replaced temperature sensor {}", previous.device.uid());
        }
        Ok(())
    }

    fn attach_humidity(self: &Arc<Self>, uid: &str) -> Result<()> {
        let sensor = self.transport.humidity_sensor(uid)?;

        let weak: Weak<Self> = Arc::downgrade(self);
        let callback = sensor.on_humidity(Box::new(move |raw| {
            if let Some(inner) = weak.upgrade() {
                if let Err(e) = inner.handle_humidity(raw) {
                    error!("Failed to show humidity: {}", e);
                }
            }
        }));

        let raw = sensor.humidity()?;
        self.state.lock().readings.update_humidity(RawHumidity::from(raw));

        sensor.set_humidity_callback_period(self.config.update_period)?;

        info!("Attached {} {}", DeviceKind::Humidity, uid);
        let previous = self.state.lock().humidity.replace(Attached {
            device: sensor,
            _callback: callback,
        });
        if let Some(previous) = previous {
            debug!("Replaced humidity sensor {}", previous.device.uid());
        }
        Ok(())
    }

    fn attach_lcd(&self, uid: &str) -> Result<()> {
        let lcd = self.transport.lcd(uid)?;
        lcd.backlight_on()?;

        info!("Attached {} {}", DeviceKind::Lcd20x4, uid);
        let previous = self.state.lock().lcd.replace(lcd);
        if let Some(previous) = previous {
            debug!("Replaced display {}", previous.uid());
        }
        Ok(())
    }

    fn handle_temperature(&self, raw: i16) -> Result<()> {
        let mut state = self.state.lock();
        state.readings.update_temperature(RawTemperature::from(raw));
        debug!("Temperature {:.2} °C", state.readings.temperature);
        state.refresh_display()
    }

    fn handle_humidity(&self, raw: u16) -> Result<()> {
        let mut state = self.state.lock();
        state.readings.update_humidity(RawHumidity::from(raw));
        debug!("Humidity {:.1} %RH", state.readings.humidity);
        state.refresh_display()
    }
}
