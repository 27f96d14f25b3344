//! Sensor subsystem — individual input-device drivers and the aggregating
//! [`SensorHub`].
//!
//! The hub owns every driver (the I²C devices, both single-wire buses, and
//! the ADC channel); the hardware adapter exposes them through the domain
//! ports.  Each driver reports failure in-band, so one flaky sensor never
//! affects another.

pub mod barometer;
pub mod co2;
pub mod dht;
pub mod probe;
pub mod rtc;
pub mod uv;

use barometer::Barometer;
use co2::Scd30Sensor;
use dht::DhtSensor;
use probe::Ds18b20Probe;
use rtc::Ds3231Clock;
use uv::UvSensor;

use crate::config::LoggerConfig;
use crate::pins;

/// Aggregates all input-device drivers.  Built once in `main` where
/// peripheral ownership is established.
pub struct SensorHub {
    pub dht: DhtSensor,
    pub uv: UvSensor,
    pub barometer: Barometer,
    pub probe: Ds18b20Probe,
    pub co2: Scd30Sensor,
    pub clock: Ds3231Clock,
}

impl SensorHub {
    pub fn new(config: &LoggerConfig) -> Self {
        Self {
            dht: DhtSensor::new(pins::DHT_DATA_GPIO),
            uv: UvSensor::new(pins::UV_ADC_GPIO),
            barometer: Barometer::new(config.sea_level_hpa),
            probe: Ds18b20Probe::new(pins::SHARED_MISO_1W_GPIO),
            co2: Scd30Sensor::new(),
            clock: Ds3231Clock::new(),
        }
    }
}
