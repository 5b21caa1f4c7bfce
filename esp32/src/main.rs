mod http;
mod sdcard;
mod sntp;
mod wifi;

use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::delay::{Ets, FreeRtos};
use esp_idf_svc::hal::gpio::PinDriver;
use esp_idf_svc::hal::i2c::{config::Config as I2cConfig, I2cDriver};
use esp_idf_svc::hal::prelude::*;
use esp_idf_svc::log::EspLogger;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use log::{error, info};
use part_monitor_common::sensor::{dht22::Dht22, mpu6050::Mpu6050};
use part_monitor_common::{Components, Config, Monitor};

use crate::http::EspHttpTransport;
use crate::sntp::SntpTime;
use crate::wifi::WifiLink;

/// Interval at which a device that failed to boot repeats its diagnosis.
const HALT_REPORT_MS: u32 = 10_000;

fn main() -> anyhow::Result<()> {
    // It is necessary to call this function once. Otherwise some patches to the runtime
    // implemented by esp-idf-sys might not link properly. See https://github.com/esp-rs/esp-idf-template/issues/71
    esp_idf_svc::sys::link_patches();

    // Bind the log crate to the ESP Logging facilities
    EspLogger::initialize_default();

    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;

    let config = Config {
        log_path: format!("{}/data.csv", sdcard::MOUNT_POINT).into(),
        ..Default::default()
    };

    // DHT22 data line on GPIO2, idle high
    let mut dht_pin = PinDriver::input_output_od(peripherals.pins.gpio2)?;
    dht_pin.set_high()?;
    let thermometer = Dht22::new(dht_pin, Ets);

    // MPU6050 on I2C0, SDA GPIO21, SCL GPIO22
    let i2c = I2cDriver::new(
        peripherals.i2c0,
        peripherals.pins.gpio21,
        peripherals.pins.gpio22,
        &I2cConfig::new().baudrate(400_000.Hz()),
    )?;
    let mut accelerometer = Mpu6050::new(i2c);
    if let Err(e) = accelerometer.initialize() {
        error!("MPU6050 initialization failed: {:?}", e);
    }

    // Keep the card mounted for the lifetime of the firmware. A missing card is reported by
    // the monitor when it opens the log file.
    let _sd_card = sdcard::mount(
        peripherals.spi2,
        peripherals.pins.gpio18,
        peripherals.pins.gpio23,
        peripherals.pins.gpio19,
        peripherals.pins.gpio4,
    )
    .map_err(|e| error!("SD card mount failed: {}", e))
    .ok();

    let link = WifiLink::start(
        peripherals.modem,
        sysloop,
        nvs,
        &config.wifi_ssid,
        &config.wifi_password,
    )?;

    let components = Components {
        temperature: thermometer,
        motion: accelerometer,
        time: SntpTime::start()?,
        transport: EspHttpTransport::new()?,
        link,
        delay: FreeRtos,
    };

    match Monitor::boot(config, components) {
        Ok(mut monitor) => monitor.run(),
        Err(e) => loop {
            error!("Startup failed, monitor halted: {}", e);
            info!("Reset the board to retry");
            FreeRtos::delay_ms(HALT_REPORT_MS);
        },
    }
}
