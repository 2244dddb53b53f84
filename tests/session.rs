//! End-to-end session behaviour against an in-memory brick daemon.

use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use climate_sensors::transport::{
    ConnectedHandler, EnumerateHandler, HumidityHandler, TemperatureHandler,
};
use climate_sensors::{
    CallbackHandle, Config, ConnectReason, ConnectionState, DeviceKind, EnumerateEvent,
    HumiditySensor, Lcd, Result, Session, TemperatureSensor, Transport,
};

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Connect(String, u16),
    Disconnect,
    Enumerate,
    Poll(String),
    Period(String, Duration),
    BacklightOn(String),
    BacklightOff(String),
    Clear(String),
    Write(u8, u8, String),
}

type Calls = Arc<Mutex<Vec<Call>>>;

struct Registry<H> {
    next_id: AtomicU64,
    handlers: Mutex<Vec<(u64, H)>>,
}

impl<H: Send + Sync + 'static> Registry<H> {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            next_id: AtomicU64::new(0),
            handlers: Mutex::new(Vec::new()),
        })
    }

    fn register(self: &Arc<Self>, handler: H) -> CallbackHandle {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.handlers.lock().push((id, handler));
        let registry = Arc::downgrade(self);
        CallbackHandle::new(move || {
            if let Some(registry) = registry.upgrade() {
                registry.handlers.lock().retain(|(i, _)| *i != id);
            }
        })
    }

    fn len(&self) -> usize {
        self.handlers.lock().len()
    }
}

struct FakeBrickd {
    calls: Calls,
    state: Mutex<ConnectionState>,
    connected: Arc<Registry<ConnectedHandler>>,
    enumerate: Arc<Registry<EnumerateHandler>>,
    temperature: Arc<Registry<TemperatureHandler>>,
    humidity: Arc<Registry<HumidityHandler>>,
    initial_temperature: i16,
    initial_humidity: u16,
}

impl FakeBrickd {
    fn new(initial_temperature: i16, initial_humidity: u16) -> Arc<Self> {
        Arc::new(Self {
            calls: Calls::default(),
            state: Mutex::new(ConnectionState::Disconnected),
            connected: Registry::new(),
            enumerate: Registry::new(),
            temperature: Registry::new(),
            humidity: Registry::new(),
            initial_temperature,
            initial_humidity,
        })
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    fn writes(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Write(..)))
            .collect()
    }

    fn fire_connected(&self, reason: ConnectReason) {
        for (_, handler) in self.connected.handlers.lock().iter() {
            handler(reason);
        }
    }

    fn fire_enumerate(&self, event: EnumerateEvent) {
        for (_, handler) in self.enumerate.handlers.lock().iter() {
            handler(event.clone());
        }
    }

    fn fire_temperature(&self, raw: i16) {
        for (_, handler) in self.temperature.handlers.lock().iter() {
            handler(raw);
        }
    }

    fn fire_humidity(&self, raw: u16) {
        for (_, handler) in self.humidity.handlers.lock().iter() {
            handler(raw);
        }
    }
}

impl Transport for FakeBrickd {
    fn connect(&self, host: &str, port: u16) -> Result<()> {
        self.calls.lock().push(Call::Connect(host.to_string(), port));
        *self.state.lock() = ConnectionState::Connected;
        Ok(())
    }

    fn disconnect(&self) -> Result<()> {
        self.calls.lock().push(Call::Disconnect);
        *self.state.lock() = ConnectionState::Disconnected;
        Ok(())
    }

    fn connection_state(&self) -> ConnectionState {
        *self.state.lock()
    }

    fn enumerate(&self) -> Result<()> {
        self.calls.lock().push(Call::Enumerate);
        Ok(())
    }

    fn on_connected(&self, handler: ConnectedHandler) -> CallbackHandle {
        self.connected.register(handler)
    }

    fn on_enumerate(&self, handler: EnumerateHandler) -> CallbackHandle {
        self.enumerate.register(handler)
    }

    fn temperature_sensor(&self, uid: &str) -> Result<Box<dyn TemperatureSensor>> {
        Ok(Box::new(FakeTemperature {
            uid: uid.to_string(),
            calls: self.calls.clone(),
            initial: self.initial_temperature,
            registry: self.temperature.clone(),
        }))
    }

    fn humidity_sensor(&self, uid: &str) -> Result<Box<dyn HumiditySensor>> {
        Ok(Box::new(FakeHumidity {
            uid: uid.to_string(),
            calls: self.calls.clone(),
            initial: self.initial_humidity,
            registry: self.humidity.clone(),
        }))
    }

    fn lcd(&self, uid: &str) -> Result<Box<dyn Lcd>> {
        Ok(Box::new(FakeLcd {
            uid: uid.to_string(),
            calls: self.calls.clone(),
        }))
    }
}

struct FakeTemperature {
    uid: String,
    calls: Calls,
    initial: i16,
    registry: Arc<Registry<TemperatureHandler>>,
}

impl TemperatureSensor for FakeTemperature {
    fn uid(&self) -> String {
        self.uid.clone()
    }

    fn temperature(&self) -> Result<i16> {
        self.calls.lock().push(Call::Poll(self.uid.clone()));
        Ok(self.initial)
    }

    fn set_temperature_callback_period(&self, period: Duration) -> Result<()> {
        self.calls.lock().push(Call::Period(self.uid.clone(), period));
        Ok(())
    }

    fn on_temperature(&self, handler: TemperatureHandler) -> CallbackHandle {
        self.registry.register(handler)
    }
}

struct FakeHumidity {
    uid: String,
    calls: Calls,
    initial: u16,
    registry: Arc<Registry<HumidityHandler>>,
}

impl HumiditySensor for FakeHumidity {
    fn uid(&self) -> String {
        self.uid.clone()
    }

    fn humidity(&self) -> Result<u16> {
        self.calls.lock().push(Call::Poll(self.uid.clone()));
        Ok(self.initial)
    }

    fn set_humidity_callback_period(&self, period: Duration) -> Result<()> {
        self.calls.lock().push(Call::Period(self.uid.clone(), period));
        Ok(())
    }

    fn on_humidity(&self, handler: HumidityHandler) -> CallbackHandle {
        self.registry.register(handler)
    }
}

struct FakeLcd {
    uid: String,
    calls: Calls,
}

impl Lcd for FakeLcd {
    fn uid(&self) -> String {
        self.uid.clone()
    }

    fn backlight_on(&self) -> Result<()> {
        self.calls.lock().push(Call::BacklightOn(self.uid.clone()));
        Ok(())
    }

    fn backlight_off(&self) -> Result<()> {
        self.calls.lock().push(Call::BacklightOff(self.uid.clone()));
        Ok(())
    }

    fn clear_display(&self) -> Result<()> {
        self.calls.lock().push(Call::Clear(self.uid.clone()));
        Ok(())
    }

    fn write_line(&self, line: u8, position: u8, text: &str) -> Result<()> {
        self.calls
            .lock()
            .push(Call::Write(line, position, text.to_string()));
        Ok(())
    }
}

fn temperature_event() -> EnumerateEvent {
    EnumerateEvent::available("6Jm", DeviceKind::TEMPERATURE_IDENTIFIER)
}

fn humidity_event() -> EnumerateEvent {
    EnumerateEvent::available("9Fq", DeviceKind::HUMIDITY_IDENTIFIER)
}

fn lcd_event() -> EnumerateEvent {
    EnumerateEvent::available("cRt", DeviceKind::LCD_20X4_IDENTIFIER)
}

#[test]
fn test_connect_then_enumerate() {
    let fake = FakeBrickd::new(0, 0);
    let session = Session::new(fake.clone(), Config::default());

    session.connect().unwrap();
    session.connect().unwrap();

    assert_eq!(
        fake.calls(),
        vec![Call::Connect("localhost".to_string(), 4223), Call::Enumerate]
    );
    assert_eq!(session.connection_state(), ConnectionState::Connected);
}

#[test]
fn test_temperature_discovery_and_callback() {
    let fake = FakeBrickd::new(2000, 0);
    let session = Session::new(fake.clone(), Config::default());
    session.connect().unwrap();
    fake.clear_calls();

    fake.fire_enumerate(temperature_event());

    assert!(session.has_temperature_sensor());
    assert_eq!(session.readings().temperature, 20.0);
    assert_eq!(
        fake.calls(),
        vec![
            Call::Poll("6Jm".to_string()),
            Call::Period("6Jm".to_string(), Duration::from_millis(1000)),
        ]
    );

    fake.fire_temperature(2150);
    assert_eq!(session.readings().temperature, 21.5);
    assert!(fake.writes().is_empty());

    fake.fire_enumerate(lcd_event());
    fake.fire_temperature(2150);
    assert_eq!(
        fake.writes(),
        vec![
            Call::Write(1, 2, "Temp:   21.50 C".to_string()),
            Call::Write(2, 2, "RelHum: 0.00 %".to_string()),
        ]
    );
}

#[test]
fn test_display_waits_for_first_value() {
    let fake = FakeBrickd::new(0, 0);
    let session = Session::new(fake.clone(), Config::default());

    fake.fire_enumerate(lcd_event());
    assert!(session.has_display());
    assert_eq!(fake.calls(), vec![Call::BacklightOn("cRt".to_string())]);

    fake.fire_enumerate(humidity_event());
    assert!(fake.writes().is_empty());

    fake.fire_humidity(455);
    assert_eq!(
        fake.writes(),
        vec![
            Call::Write(1, 2, "Temp:   0.00 C".to_string()),
            Call::Write(2, 2, "RelHum: 45.50 %".to_string()),
        ]
    );
}

#[test]
fn test_reconnect_enumerates_each_time() {
    let fake = FakeBrickd::new(0, 0);
    let _session = Session::new(fake.clone(), Config::default());

    fake.fire_connected(ConnectReason::Request);
    fake.fire_connected(ConnectReason::AutoReconnect);

    assert_eq!(fake.calls(), vec![Call::Enumerate, Call::Enumerate]);
}

#[test]
fn test_device_disconnect_keeps_last_value() {
    let fake = FakeBrickd::new(2000, 455);
    let session = Session::new(fake.clone(), Config::default());
    fake.fire_enumerate(temperature_event());
    fake.fire_enumerate(humidity_event());
    fake.fire_enumerate(lcd_event());
    fake.clear_calls();

    fake.fire_enumerate(EnumerateEvent::disconnected(
        "6Jm",
        DeviceKind::TEMPERATURE_IDENTIFIER,
    ));

    assert!(fake.calls().is_empty());
    assert!(session.has_temperature_sensor());
    assert_eq!(session.readings().temperature, 20.0);
    assert_eq!(session.readings().humidity, 45.5);
}

#[test]
fn test_rediscovery_keeps_one_callback_per_sensor() {
    let fake = FakeBrickd::new(2000, 455);
    let _session = Session::new(fake.clone(), Config::default());

    fake.fire_enumerate(temperature_event());
    fake.fire_enumerate(temperature_event());
    fake.fire_enumerate(humidity_event());
    fake.fire_enumerate(humidity_event());

    assert_eq!(fake.temperature.len(), 1);
    assert_eq!(fake.humidity.len(), 1);
}

#[test]
fn test_disconnect_blanks_display_once() {
    let fake = FakeBrickd::new(0, 0);
    let session = Session::new(fake.clone(), Config::default());
    session.connect().unwrap();
    fake.fire_enumerate(lcd_event());
    fake.clear_calls();

    session.disconnect().unwrap();
    session.disconnect().unwrap();

    assert_eq!(
        fake.calls(),
        vec![
            Call::BacklightOff("cRt".to_string()),
            Call::Clear("cRt".to_string()),
            Call::Disconnect,
        ]
    );
}

#[test]
fn test_configured_endpoint_and_period() {
    let fake = FakeBrickd::new(0, 0);
    let config = Config::default()
        .with_host("brickd.lan")
        .with_port(4280)
        .with_update_period(Duration::from_millis(250))
        .unwrap();
    let session = Session::new(fake.clone(), config);

    session.connect().unwrap();
    fake.fire_enumerate(humidity_event());

    assert_eq!(
        fake.calls(),
        vec![
            Call::Connect("brickd.lan".to_string(), 4280),
            Call::Enumerate,
            Call::Poll("9Fq".to_string()),
            Call::Period("9Fq".to_string(), Duration::from_millis(250)),
        ]
    );
}

#[test]
fn test_dropping_session_unregisters_everything() {
    let fake = FakeBrickd::new(0, 0);
    let session = Session::new(fake.clone(), Config::default());
    fake.fire_enumerate(temperature_event());
    assert_eq!(fake.connected.len(), 1);
    assert_eq!(fake.enumerate.len(), 1);
    assert_eq!(fake.temperature.len(), 1);

    drop(session);

    assert_eq!(fake.connected.len(), 0);
    assert_eq!(fake.enumerate.len(), 0);
    assert_eq!(fake.temperature.len(), 0);
}

#[test]
fn test_concurrent_callbacks_write_whole_refreshes() {
    let fake = FakeBrickd::new(2000, 455);
    let session = Session::new(fake.clone(), Config::default());
    fake.fire_enumerate(temperature_event());
    fake.fire_enumerate(humidity_event());
    fake.fire_enumerate(lcd_event());
    fake.clear_calls();

    let threads: Vec<_> = (0..4)
        .map(|t| {
            let fake = fake.clone();
            std::thread::spawn(move || {
                for i in 0..50 {
                    if t % 2 == 0 {
                        fake.fire_temperature(2000 + i);
                    } else {
                        fake.fire_humidity(400 + i as u16);
                    }
                }
            })
        })
        .collect();
    for thread in threads {
        thread.join().unwrap();
    }

    fake.fire_temperature(2345);
    fake.fire_humidity(512);

    let writes = fake.writes();
    assert_eq!(writes.len(), 2 * (4 * 50 + 2));
    for pair in writes.chunks(2) {
        assert!(
            matches!(
                pair,
                [Call::Write(1, 2, temp), Call::Write(2, 2, hum)]
                    if temp.starts_with("Temp:") && hum.starts_with("RelHum:")
            ),
            "interleaved refresh: {:?}",
            pair
        );
    }

    assert_eq!(session.readings().temperature, 23.45);
    assert_eq!(session.readings().humidity, 51.2);
    assert_eq!(
        writes[writes.len() - 2..].to_vec(),
        vec![
            Call::Write(1, 2, "Temp:   23.45 C".to_string()),
            Call::Write(2, 2, "RelHum: 51.20 %".to_string()),
        ]
    );
}
