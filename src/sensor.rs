// Sensor sampling seam. The worker only sees the trait, so the simulated
// source can be swapped for a real driver without touching the pipeline.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rand::Rng;

use crate::models::Reading;

/// One sample per call. Implementations may fail transiently (bus errors,
/// CRC mismatches); the worker logs and keeps sampling.
pub trait SensorSource: Send + Sync {
    fn read_sample(&self, timestamp: DateTime<Utc>) -> anyhow::Result<Reading>;
}

/// Plausible indoor-air values for development without hardware.
/// Each channel does a bounded random walk; occasionally a channel drops
/// out for one sample to exercise the absent-value paths downstream.
pub struct SimulatedScd40 {
    state: Mutex<WalkState>,
}

struct WalkState {
    co2_ppm: f32,
    temperature_c: f32,
    humidity_percent: f32,
}

const CHANNEL_DROPOUT_PROBABILITY: f64 = 0.02;

impl SimulatedScd40 {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(WalkState {
                co2_ppm: 650.0,
                temperature_c: 21.5,
                humidity_percent: 45.0,
            }),
        }
    }
}

impl Default for SimulatedScd40 {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorSource for SimulatedScd40 {
    fn read_sample(&self, timestamp: DateTime<Utc>) -> anyhow::Result<Reading> {
        let mut rng = rand::rng();
        let mut state = self.state.lock().expect("sensor state lock poisoned");

        state.co2_ppm = (state.co2_ppm + rng.random_range(-15.0..15.0)).clamp(400.0, 2000.0);
        state.temperature_c =
            (state.temperature_c + rng.random_range(-0.2..0.2)).clamp(15.0, 30.0);
        state.humidity_percent =
            (state.humidity_percent + rng.random_range(-1.0..1.0)).clamp(20.0, 80.0);

        let mut reading = Reading::new(timestamp);
        if rng.random_range(0.0..1.0) >= CHANNEL_DROPOUT_PROBABILITY {
            reading.co2_ppm = Some(state.co2_ppm);
            reading.set_co2_valid(true);
        }
        if rng.random_range(0.0..1.0) >= CHANNEL_DROPOUT_PROBABILITY {
            reading.temperature_c = Some(state.temperature_c);
            reading.set_temperature_valid(true);
        }
        if rng.random_range(0.0..1.0) >= CHANNEL_DROPOUT_PROBABILITY {
            reading.humidity_percent = Some(state.humidity_percent);
            reading.set_humidity_valid(true);
        }
        Ok(reading)
    }
}
