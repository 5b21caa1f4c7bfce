//! Bit-banged driver for the DHT22 temperature and humidity sensor.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, InputPin, OutputPin};

use super::TemperatureProbe;

type PinError<P> = <P as ErrorType>::Error;

const MAX_DHT_DATA: usize = 5;

#[derive(Debug, PartialEq)]
pub enum Dht22Error<E> {
    ChecksumError,
    TimeoutError,
    Pin(E),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Dht22Reading {
    pub temperature: f32,
    pub humidity: f32,
}

/// DHT22 on a single open-drain data line.
///
/// `set_high` must release the line so the sensor can drive it, which is what an open-drain
/// input/output pin does.
pub struct Dht22<P, D> {
    pin: P,
    delay: D,
}

impl<P, D> Dht22<P, D>
where
    P: InputPin + OutputPin,
    D: DelayNs,
{
    pub fn new(pin: P, delay: D) -> Self {
        Self { pin, delay }
    }

    /// Counts the microseconds the line stays at `high`. Fails once `max_wait` is exceeded.
    fn signal_level(&mut self, max_wait: u32, high: bool) -> Result<u32, Dht22Error<PinError<P>>> {
        let mut u_sec = 0;
        while self.pin.is_high().map_err(Dht22Error::Pin)? == high {
            u_sec += 1;
            if u_sec > max_wait {
                return Err(Dht22Error::TimeoutError);
            }
            self.delay.delay_us(1);
        }
        Ok(u_sec)
    }

    pub fn read(&mut self) -> Result<Dht22Reading, Dht22Error<PinError<P>>> {
        let mut dht_data = [0u8; MAX_DHT_DATA];

        // pull down for 3 ms to wake the sensor up
        self.pin.set_low().map_err(Dht22Error::Pin)?;
        self.delay.delay_us(3000);

        // release the line and ask for data
        self.pin.set_high().map_err(Dht22Error::Pin)?;
        self.delay.delay_us(25);

        // sensor answers with 80 us low, then 80 us high
        self.signal_level(85, false)?;
        self.signal_level(85, true)?;

        for bit in 0..MAX_DHT_DATA * 8 {
            // every bit starts with a ~50 us low
            self.signal_level(56, false)?;

            // a high pulse longer than ~28 us is a one
            let u_sec = self.signal_level(75, true)?;
            if u_sec > 40 {
                dht_data[bit / 8] |= 1 << (7 - bit % 8);
            }
        }

        decode(dht_data)
    }
}

/// Turns the five raw bytes into a reading after verifying the checksum.
pub fn decode<E>(dht_data: [u8; 5]) -> Result<Dht22Reading, Dht22Error<E>> {
    let checksum = dht_data[..4]
        .iter()
        .fold(0u8, |sum, byte| sum.wrapping_add(*byte));
    if checksum != dht_data[4] {
        return Err(Dht22Error::ChecksumError);
    }

    let humidity = f32::from(u16::from_be_bytes([dht_data[0], dht_data[1]])) / 10.0;

    let mut temperature = f32::from(u16::from_be_bytes([dht_data[2] & 0x7F, dht_data[3]])) / 10.0;
    if dht_data[2] & 0x80 != 0 {
        temperature = -temperature;
    }

    Ok(Dht22Reading {
        temperature,
        humidity,
    })
}

impl<P, D> TemperatureProbe for Dht22<P, D>
where
    P: InputPin + OutputPin,
    D: DelayNs,
{
    type Error = Dht22Error<PinError<P>>;

    fn read_celsius(&mut self) -> Result<f32, Self::Error> {
        self.read().map(|reading| reading.temperature)
    }
}
