//! Vehicle-telemetry CSV record schema.

use serde::Deserialize;

/// One row of the vehicle-telemetry CSV feed.
///
/// Field order matches the CSV column order: vehicle id, unix
/// timestamp, speed, engine state, optional diagnostic error code.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VehicleRecord {
    pub vehicle_id: String,
    pub timestamp_unix_s: i64,
    pub speed_kph: f32,
    pub engine_on: bool,
    pub error_code: Option<u16>,
}

impl VehicleRecord {
    /// The end-of-stream sentinel: an empty vehicle id with every other
    /// field at its zero value. Encountering one ends the feed without
    /// being submitted as a job itself.
    pub fn is_sentinel(&self) -> bool {
        self.vehicle_id.is_empty()
            && self.timestamp_unix_s == 0
            && self.speed_kph == 0.0
            && !self.engine_on
            && self.error_code.is_none()
    }
}
