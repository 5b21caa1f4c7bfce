//! Minimal MPU6050 driver: wake-up, identity check and raw 6-axis reads.

use embedded_hal::i2c::I2c;

use super::{MotionProbe, MotionSample};

pub const DEFAULT_ADDRESS: u8 = 0x68;

const REG_GYRO_CONFIG: u8 = 0x1B;
const REG_ACCEL_CONFIG: u8 = 0x1C;
const REG_ACCEL_XOUT_H: u8 = 0x3B;
const REG_PWR_MGMT_1: u8 = 0x6B;
const REG_WHO_AM_I: u8 = 0x75;

const DEVICE_ID: u8 = 0x68;

/// PLL with X axis gyroscope reference, sleep disabled.
const CLOCK_PLL_XGYRO: u8 = 0x01;

pub struct Mpu6050<I> {
    i2c: I,
    address: u8,
}

impl<I: I2c> Mpu6050<I> {
    pub fn new(i2c: I) -> Self {
        Self::with_address(i2c, DEFAULT_ADDRESS)
    }

    pub fn with_address(i2c: I, address: u8) -> Self {
        Self { i2c, address }
    }

    /// Wakes the device up with ±250 °/s and ±2 g full scale ranges.
    pub fn initialize(&mut self) -> Result<(), I::Error> {
        self.write_register(REG_PWR_MGMT_1, CLOCK_PLL_XGYRO)?;
        self.write_register(REG_GYRO_CONFIG, 0x00)?;
        self.write_register(REG_ACCEL_CONFIG, 0x00)
    }

    pub fn device_id(&mut self) -> Result<u8, I::Error> {
        let mut id = [0u8];
        self.i2c.write_read(self.address, &[REG_WHO_AM_I], &mut id)?;
        Ok(id[0])
    }

    /// Burst-reads accelerometer and gyroscope, skipping the die temperature in between.
    pub fn motion6(&mut self) -> Result<MotionSample, I::Error> {
        let mut raw = [0u8; 14];
        self.i2c.write_read(self.address, &[REG_ACCEL_XOUT_H], &mut raw)?;

        let word = |i: usize| i16::from_be_bytes([raw[i], raw[i + 1]]);
        Ok(MotionSample {
            ax: word(0),
            ay: word(2),
            az: word(4),
            gx: word(8),
            gy: word(10),
            gz: word(12),
        })
    }

    fn write_register(&mut self, register: u8, value: u8) -> Result<(), I::Error> {
        self.i2c.write(self.address, &[register, value])
    }
}

impl<I: I2c> MotionProbe for Mpu6050<I> {
    type Error = I::Error;

    fn test_connection(&mut self) -> bool {
        matches!(self.device_id(), Ok(DEVICE_ID))
    }

    fn read_motion(&mut self) -> Result<MotionSample, Self::Error> {
        self.motion6()
    }
}
