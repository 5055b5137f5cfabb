// One sensor sample. Channel values are optional: a channel the sensor
// could not produce is absent, not zero.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One timestamped SCD40 sample with optional per-channel values.
///
/// `quality_flags` records which channels were physically valid at capture
/// time. The flags travel with the reading; the aggregator does not read them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub timestamp: DateTime<Utc>,
    pub co2_ppm: Option<f32>,
    pub temperature_c: Option<f32>,
    pub humidity_percent: Option<f32>,
    #[serde(default)]
    pub quality_flags: u32,
}

impl Reading {
    pub const CO2_VALID: u32 = 0x01;
    pub const TEMP_VALID: u32 = 0x02;
    pub const HUMIDITY_VALID: u32 = 0x04;

    /// An empty reading at `timestamp`: all channels absent, no flags set.
    pub fn new(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            co2_ppm: None,
            temperature_c: None,
            humidity_percent: None,
            quality_flags: 0,
        }
    }

    pub fn is_co2_valid(&self) -> bool {
        self.quality_flags & Self::CO2_VALID != 0
    }

    pub fn is_temperature_valid(&self) -> bool {
        self.quality_flags & Self::TEMP_VALID != 0
    }

    pub fn is_humidity_valid(&self) -> bool {
        self.quality_flags & Self::HUMIDITY_VALID != 0
    }

    pub fn set_co2_valid(&mut self, valid: bool) {
        self.set_flag(Self::CO2_VALID, valid);
    }

    pub fn set_temperature_valid(&mut self, valid: bool) {
        self.set_flag(Self::TEMP_VALID, valid);
    }

    pub fn set_humidity_valid(&mut self, valid: bool) {
        self.set_flag(Self::HUMIDITY_VALID, valid);
    }

    fn set_flag(&mut self, flag: u32, valid: bool) {
        if valid {
            self.quality_flags |= flag;
        } else {
            self.quality_flags &= !flag;
        }
    }
}
