use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use chrono::{DateTime, TimeZone, Utc};
use embedded_hal::delay::DelayNs;
use part_monitor_common::{
    Alert, ClockError, Components, Config, Connectivity, CycleOutcome, Fault, HttpResponse,
    HttpTransport, Monitor, MotionProbe, MotionSample, StartupError, TemperatureProbe, TimeSource,
    TransportError,
};

struct Thermometer(Rc<RefCell<VecDeque<f32>>>);

impl TemperatureProbe for Thermometer {
    type Error = &'static str;

    fn read_celsius(&mut self) -> Result<f32, Self::Error> {
        self.0.borrow_mut().pop_front().ok_or("no data")
    }
}

struct Accelerometer {
    connected: bool,
    samples: Rc<RefCell<VecDeque<MotionSample>>>,
    bus_fault: Rc<Cell<bool>>,
}

impl MotionProbe for Accelerometer {
    type Error = &'static str;

    fn test_connection(&mut self) -> bool {
        self.connected
    }

    fn read_motion(&mut self) -> Result<MotionSample, Self::Error> {
        if self.bus_fault.get() {
            return Err("i2c nack");
        }
        Ok(self.samples.borrow_mut().pop_front().unwrap_or_default())
    }
}

struct FixedTime;

impl TimeSource for FixedTime {
    fn sync(&mut self) -> Result<(), ClockError> {
        Ok(())
    }

    fn now(&self) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 14, 5, 9).unwrap()
    }
}

#[derive(Clone, Default)]
struct Spreadsheet {
    bodies: Rc<RefCell<Vec<String>>>,
    down: Rc<Cell<bool>>,
}

impl HttpTransport for Spreadsheet {
    fn post(
        &mut self,
        _url: &str,
        _headers: &[(&str, &str)],
        body: &[u8],
    ) -> Result<HttpResponse, TransportError> {
        if self.down.get() {
            return Err(TransportError("connection refused".into()));
        }
        self.bodies
            .borrow_mut()
            .push(String::from_utf8_lossy(body).into_owned());
        Ok(HttpResponse {
            status: 200,
            body: "{\"result\":\"success\"}".into(),
        })
    }
}

struct Wifi(Rc<Cell<bool>>);

impl Connectivity for Wifi {
    fn is_connected(&mut self) -> bool {
        self.0.get()
    }
}

struct Sleep(Rc<Cell<u64>>);

impl DelayNs for Sleep {
    fn delay_ns(&mut self, ns: u32) {
        self.0.set(self.0.get() + u64::from(ns) / 1_000_000);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.0.set(self.0.get() + u64::from(ms));
    }
}

struct Rig {
    temperatures: Rc<RefCell<VecDeque<f32>>>,
    samples: Rc<RefCell<VecDeque<MotionSample>>>,
    bus_fault: Rc<Cell<bool>>,
    spreadsheet: Spreadsheet,
    wifi: Rc<Cell<bool>>,
    slept_ms: Rc<Cell<u64>>,
    motion_connected: bool,
}

impl Rig {
    fn new() -> Self {
        Self {
            temperatures: Rc::default(),
            samples: Rc::new(RefCell::new(VecDeque::from([MotionSample::default()]))),
            bus_fault: Rc::default(),
            spreadsheet: Spreadsheet::default(),
            wifi: Rc::new(Cell::new(true)),
            slept_ms: Rc::default(),
            motion_connected: true,
        }
    }

    fn components(
        &self,
    ) -> Components<Thermometer, Accelerometer, FixedTime, Spreadsheet, Wifi, Sleep> {
        Components {
            temperature: Thermometer(self.temperatures.clone()),
            motion: Accelerometer {
                connected: self.motion_connected,
                samples: self.samples.clone(),
                bus_fault: self.bus_fault.clone(),
            },
            time: FixedTime,
            transport: self.spreadsheet.clone(),
            link: Wifi(self.wifi.clone()),
            delay: Sleep(self.slept_ms.clone()),
        }
    }

    fn push(&self, temperature: f32, ax: i16) {
        self.temperatures.borrow_mut().push_back(temperature);
        self.samples.borrow_mut().push_back(MotionSample {
            ax,
            ..Default::default()
        });
    }
}

fn config(dir: &tempfile::TempDir) -> Config {
    Config {
        endpoint: "http://spreadsheet.test/exec".into(),
        log_path: dir.path().join("data.csv"),
        connect_max_attempts: 3,
        ..Default::default()
    }
}

fn log_lines(dir: &tempfile::TempDir) -> Vec<String> {
    std::fs::read_to_string(dir.path().join("data.csv"))
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn completed_cycle_uploads_and_records() {
    let dir = tempfile::tempdir().unwrap();
    let rig = Rig::new();
    let mut monitor = Monitor::boot(config(&dir), rig.components()).unwrap();

    rig.push(25.5, 0);
    let CycleOutcome::Completed(report) = monitor.step() else {
        panic!("cycle should complete");
    };
    assert!(report.uploaded);
    assert!(report.recorded);
    assert!(!report.over_temperature);

    assert_eq!(
        rig.spreadsheet.bodies.borrow().as_slice(),
        [r#"{"method":"append","timestamp":"14:05:09","temperature":25.50,"vibration":"NORMAL"}"#]
    );
    assert_eq!(log_lines(&dir), ["14:05:09,25.50,NORMAL"]);
    assert_eq!(rig.slept_ms.get(), 1500);
}

#[test]
fn offline_cycles_skip_upload_and_storage() {
    let dir = tempfile::tempdir().unwrap();
    let rig = Rig::new();
    let mut monitor = Monitor::boot(config(&dir), rig.components()).unwrap();

    rig.wifi.set(false);
    for _ in 0..4 {
        assert_eq!(monitor.step(), CycleOutcome::Offline);
    }
    assert!(rig.spreadsheet.bodies.borrow().is_empty());
    assert!(log_lines(&dir).is_empty());
    assert_eq!(rig.slept_ms.get(), 4000);

    rig.wifi.set(true);
    rig.push(30.0, 2001);
    let CycleOutcome::Completed(report) = monitor.step() else {
        panic!("cycle should complete after reconnect");
    };
    assert!(report.reading.vibration_high());
    assert_eq!(log_lines(&dir), ["14:05:09,30.00,HIGH VIBRATION"]);
    assert_eq!(monitor.stats().offline, 4);
    assert_eq!(monitor.stats().cycles, 5);
}

#[test]
fn failures_are_absorbed() {
    let dir = tempfile::tempdir().unwrap();
    let rig = Rig::new();
    let mut monitor = Monitor::boot(config(&dir), rig.components()).unwrap();

    // probe returns nothing, spreadsheet is down, storage vanished
    rig.spreadsheet.down.set(true);
    std::fs::remove_dir_all(dir.path()).unwrap();
    let CycleOutcome::Completed(report) = monitor.run_cycle() else {
        panic!("cycle should complete");
    };
    assert_eq!(report.reading.temperature(), -1000.0);
    assert!(!report.uploaded);
    assert!(!report.recorded);

    // next cycle still runs and succeeds once storage is back
    std::fs::create_dir_all(dir.path()).unwrap();
    rig.spreadsheet.down.set(false);
    rig.push(22.0, 0);
    let CycleOutcome::Completed(report) = monitor.run_cycle() else {
        panic!("cycle should complete");
    };
    assert!(report.uploaded);
    assert!(report.recorded);

    let stats = monitor.stats();
    assert_eq!(stats.uploads_failed, 1);
    assert_eq!(stats.records_failed, 1);
    assert_eq!(stats.sensor_errors, 1);
}

#[test]
fn baseline_is_power_on_orientation() {
    let dir = tempfile::tempdir().unwrap();
    let rig = Rig::new();
    rig.samples.borrow_mut()[0] = MotionSample {
        ax: 500,
        ay: -300,
        az: 16384,
        ..Default::default()
    };
    let mut monitor = Monitor::boot(config(&dir), rig.components()).unwrap();
    assert_eq!(monitor.baseline().az0, 16384.0);

    // deviation measured against the boot sample, not zero
    rig.temperatures.borrow_mut().push_back(20.0);
    rig.samples.borrow_mut().push_back(MotionSample {
        ax: 2400,
        ay: -300,
        az: 16384,
        ..Default::default()
    });
    let CycleOutcome::Completed(report) = monitor.run_cycle() else {
        panic!("cycle should complete");
    };
    assert!(!report.reading.vibration_high());
}

#[test]
fn sustained_over_temperature_raises_alert() {
    let dir = tempfile::tempdir().unwrap();
    let rig = Rig::new();
    let mut monitor = Monitor::boot(config(&dir), rig.components()).unwrap();

    let mut alerts = Vec::new();
    for _ in 0..3 {
        rig.push(61.0, 0);
        if let CycleOutcome::Completed(report) = monitor.run_cycle() {
            assert!(report.over_temperature);
            alerts.extend(report.alerts);
        }
    }
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].fault, Fault::OverTemperature);
}

#[test]
fn motion_bus_fault_reads_as_normal() {
    let dir = tempfile::tempdir().unwrap();
    let rig = Rig::new();
    let mut monitor = Monitor::boot(config(&dir), rig.components()).unwrap();

    rig.temperatures.borrow_mut().push_back(24.0);
    rig.bus_fault.set(true);
    let CycleOutcome::Completed(report) = monitor.run_cycle() else {
        panic!("cycle should complete");
    };
    assert!(!report.reading.vibration_high());
    assert!(report.uploaded);
    assert!(report.recorded);
    assert_eq!(monitor.stats().sensor_errors, 1);
    assert_eq!(log_lines(&dir), ["14:05:09,24.00,NORMAL"]);
    assert!(rig.spreadsheet.bodies.borrow()[0].contains(r#""vibration":"NORMAL""#));
}

#[test]
fn offline_cycles_leave_fault_streaks_alone() {
    let dir = tempfile::tempdir().unwrap();
    let rig = Rig::new();
    let mut monitor = Monitor::boot(config(&dir), rig.components()).unwrap();

    let mut alerts = Vec::new();
    for online in [true, true, false, true] {
        rig.wifi.set(online);
        if online {
            rig.push(61.0, 0);
        }
        if let CycleOutcome::Completed(report) = monitor.run_cycle() {
            alerts.extend(report.alerts);
        }
    }
    assert_eq!(
        alerts,
        [Alert {
            fault: Fault::OverTemperature,
            streak: 3
        }]
    );
    assert_eq!(monitor.stats().offline, 1);
}

#[test]
fn boot_gives_up_on_network() {
    let dir = tempfile::tempdir().unwrap();
    let rig = Rig::new();
    rig.wifi.set(false);

    let result = Monitor::boot(config(&dir), rig.components());
    assert!(matches!(
        result,
        Err(StartupError::NetworkUnavailable { attempts: 3 })
    ));
    assert_eq!(rig.slept_ms.get(), 3000);
}

#[test]
fn boot_requires_motion_sensor_and_storage() {
    let dir = tempfile::tempdir().unwrap();
    let mut rig = Rig::new();
    rig.motion_connected = false;
    let result = Monitor::boot(config(&dir), rig.components());
    assert!(matches!(result, Err(StartupError::MotionSensorMissing)));

    let rig = Rig::new();
    let config = Config {
        log_path: dir.path().join("no-card").join("data.csv"),
        ..config(&dir)
    };
    let result = Monitor::boot(config, rig.components());
    assert!(matches!(result, Err(StartupError::StorageUnavailable(_))));
}
