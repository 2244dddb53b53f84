//! Transport backed by the `tinkerforge` crate's IP connection.
//!
//! Callback receivers from the vendor crate are drained on their own
//! threads and forwarded to the registered handler until the returned
//! [`CallbackHandle`] is dropped.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tinkerforge::converting_receiver::BrickletRecvTimeoutError;
use tinkerforge::humidity_bricklet::HumidityBricklet;
use tinkerforge::ip_connection::{
    ConnectReason as TfConnectReason, ConnectionState as TfConnectionState,
    EnumerationType as TfEnumerationType, IpConnection,
};
use tinkerforge::lcd_20x4_bricklet::Lcd20x4Bricklet;
use tinkerforge::temperature_bricklet::TemperatureBricklet;
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::transport::{
    CallbackHandle, ConnectReason, ConnectedHandler, ConnectionState, EnumerateEvent,
    EnumerateHandler, EnumerationType, HumidityHandler, HumiditySensor, Lcd, TemperatureHandler,
    TemperatureSensor, Transport,
};

/// Drain `receiver` on a new thread, passing every item to `handler`.
///
/// The thread also ends on its own once the vendor side drops the sender.
fn forward<I, T, F>(name: &str, receiver: I, handler: F) -> CallbackHandle
where
    I: IntoIterator<Item = T> + Send + 'static,
    F: Fn(T) + Send + 'static,
{
    let active = Arc::new(AtomicBool::new(true));
    let running = active.clone();
    let name = name.to_string();

    thread::spawn(move || {
        trace!("{} forwarder started", name);
        for item in receiver {
            if !running.load(Ordering::SeqCst) {
                break;
            }
            handler(item);
        }
        trace!("{} forwarder ended", name);
    });

    CallbackHandle::new(move || active.store(false, Ordering::SeqCst))
}

fn period_millis(period: Duration) -> u32 {
    u32::try_from(period.as_millis()).unwrap_or(u32::MAX)
}

/// IP connection to a brick daemon.
pub struct BrickdTransport {
    ipcon: Mutex<IpConnection>,
}

impl BrickdTransport {
    /// Create an unconnected transport.
    pub fn new() -> Self {
        Self {
            ipcon: Mutex::new(IpConnection::new()),
        }
    }
}

impl Default for BrickdTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for BrickdTransport {
    fn connect(&self, host: &str, port: u16) -> Result<()> {
        let result = self.ipcon.lock().connect((host.to_string(), port)).recv();
        match result {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(Error::ConnectionFailed {
                reason: format!("{}:{}: {:?}", host, port, e),
            }),
            Err(e) => Err(Error::Internal(format!("connect result lost: {}", e))),
        }
    }

    fn disconnect(&self) -> Result<()> {
        let result = self.ipcon.lock().disconnect().recv();
        match result {
            Ok(Ok(())) => Ok(()),
            Ok(Err(_)) => Err(Error::NotConnected),
            Err(e) => Err(Error::Internal(format!("disconnect result lost: {}", e))),
        }
    }

    fn connection_state(&self) -> ConnectionState {
        match self.ipcon.lock().get_connection_state() {
            TfConnectionState::Disconnected => ConnectionState::Disconnected,
            TfConnectionState::Connected => ConnectionState::Connected,
            _ => ConnectionState::Pending,
        }
    }

    fn enumerate(&self) -> Result<()> {
        debug!("Requesting enumeration");
        self.ipcon.lock().enumerate();
        Ok(())
    }

    fn on_connected(&self, handler: ConnectedHandler) -> CallbackHandle {
        let receiver = self.ipcon.lock().get_connect_callback_receiver();
        forward("connect", receiver, move |reason| {
            let reason = match reason {
                TfConnectReason::Request => ConnectReason::Request,
                _ => ConnectReason::AutoReconnect,
            };
            handler(reason)
        })
    }

    fn on_enumerate(&self, handler: EnumerateHandler) -> CallbackHandle {
        let receiver = self.ipcon.lock().get_enumerate_callback_receiver();
        forward("enumerate", receiver, move |response| {
            let enumeration_type = match response.enumeration_type {
                TfEnumerationType::Available => EnumerationType::Available,
                TfEnumerationType::Connected => EnumerationType::Connected,
                _ => EnumerationType::Disconnected,
            };
            handler(EnumerateEvent {
                uid: response.uid,
                connected_uid: response.connected_uid,
                position: response.position,
                hardware_version: response.hardware_version,
                firmware_version: response.firmware_version,
                device_identifier: response.device_identifier,
                enumeration_type,
            })
        })
    }

    fn temperature_sensor(&self, uid: &str) -> Result<Box<dyn TemperatureSensor>> {
        let device = TemperatureBricklet::new(uid, &*self.ipcon.lock());
        Ok(Box::new(BrickdTemperature {
            uid: uid.to_string(),
            device: Mutex::new(device),
        }))
    }

    fn humidity_sensor(&self, uid: &str) -> Result<Box<dyn HumiditySensor>> {
        let device = HumidityBricklet::new(uid, &*self.ipcon.lock());
        Ok(Box::new(BrickdHumidity {
            uid: uid.to_string(),
            device: Mutex::new(device),
        }))
    }

    fn lcd(&self, uid: &str) -> Result<Box<dyn Lcd>> {
        let device = Lcd20x4Bricklet::new(uid, &*self.ipcon.lock());
        Ok(Box::new(BrickdLcd {
            uid: uid.to_string(),
            device: Mutex::new(device),
        }))
    }
}

struct BrickdTemperature {
    uid: String,
    device: Mutex<TemperatureBricklet>,
}

impl TemperatureSensor for BrickdTemperature {
    fn uid(&self) -> String {
        self.uid.clone()
    }

    fn temperature(&self) -> Result<i16> {
        self.device
            .lock()
            .get_temperature()
            .recv()
            .map_err(|e| Error::device(&self.uid, "read temperature", format!("{:?}", e)))
    }

    fn set_temperature_callback_period(&self, period: Duration) -> Result<()> {
        self.device
            .lock()
            .set_temperature_callback_period(period_millis(period))
            .recv()
            .map_err(|e| Error::device(&self.uid, "set callback period", format!("{:?}", e)))
    }

    fn on_temperature(&self, handler: TemperatureHandler) -> CallbackHandle {
        let receiver = self.device.lock().get_temperature_callback_receiver();
        forward("temperature", receiver, move |raw| handler(raw))
    }
}

struct BrickdHumidity {
    uid: String,
    device: Mutex<HumidityBricklet>,
}

impl HumiditySensor for BrickdHumidity {
    fn uid(&self) -> String {
        self.uid.clone()
    }

    fn humidity(&self) -> Result<u16> {
        self.device
            .lock()
            .get_humidity()
            .recv()
            .map_err(|e| Error::device(&self.uid, "read humidity", format!("{:?}", e)))
    }

    fn set_humidity_callback_period(&self, period: Duration) -> Result<()> {
        self.device
            .lock()
            .set_humidity_callback_period(period_millis(period))
            .recv()
            .map_err(|e| Error::device(&self.uid, "set callback period", format!("{:?}", e)))
    }

    fn on_humidity(&self, handler: HumidityHandler) -> CallbackHandle {
        let receiver = self.device.lock().get_humidity_callback_receiver();
        forward("humidity", receiver, move |raw| handler(raw))
    }
}

/// Resolve the acknowledgement of a setter.
///
/// Setters with response-expected disabled report `SuccessButResponseExpectedIsDisabled`
/// as soon as the request is sent; that counts as success.
fn acknowledged(
    uid: &str,
    operation: &'static str,
    result: std::result::Result<(), BrickletRecvTimeoutError>,
) -> Result<()> {
    match result {
        Ok(()) | Err(BrickletRecvTimeoutError::SuccessButResponseExpectedIsDisabled) => Ok(()),
        Err(e) => Err(Error::device(uid, operation, format!("{:?}", e))),
    }
}

struct BrickdLcd {
    uid: String,
    device: Mutex<Lcd20x4Bricklet>,
}

impl Lcd for BrickdLcd {
    fn uid(&self) -> String {
        self.uid.clone()
    }

    fn backlight_on(&self) -> Result<()> {
        let result = self.device.lock().backlight_on().recv();
        acknowledged(&self.uid, "turn backlight on", result)
    }

    fn backlight_off(&self) -> Result<()> {
        let result = self.device.lock().backlight_off().recv();
        acknowledged(&self.uid, "turn backlight off", result)
    }

    fn clear_display(&self) -> Result<()> {
        let result = self.device.lock().clear_display().recv();
        acknowledged(&self.uid, "clear display", result)
    }

    fn write_line(&self, line: u8, position: u8, text: &str) -> Result<()> {
        let result = self
            .device
            .lock()
            .write_line(line, position, text.to_string())
            .recv();
        acknowledged(&self.uid, "write line", result)
    }
}
