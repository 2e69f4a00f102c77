// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Location fixes produced by the tracker and their queue representation.
//!
//! Each fix becomes one queued record keyed `gps:<device_id>:<timestamp_ms>`
//! with a flat JSON payload.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{Error, Result};

/// Key namespace for location records.
pub const KEY_PREFIX: &str = "gps";

/// One location sample from the positioning source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationFix {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
    /// Horizontal accuracy radius in metres.
    #[serde(default)]
    pub accuracy_m: f64,
    /// Altitude above WGS84 ellipsoid in metres.
    #[serde(default)]
    pub altitude_m: f64,
    /// Ground speed in metres per second.
    #[serde(default)]
    pub speed_ms: f64,
    /// Bearing in degrees.
    #[serde(default)]
    pub bearing: f64,
    /// Capture time in milliseconds since Unix epoch, stamped at capture if absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp_ms: Option<i64>,
}

/// Queue key and payload for a captured fix.
#[derive(Debug, Clone, PartialEq)]
pub struct FixEntry {
    pub key: String,
    pub payload: Value,
}

impl LocationFix {
    /// Creates a fix with only coordinates set.
    pub fn new(lat: f64, lng: f64) -> Self {
        LocationFix {
            lat,
            lng,
            accuracy_m: 0.0,
            altitude_m: 0.0,
            speed_ms: 0.0,
            bearing: 0.0,
            timestamp_ms: None,
        }
    }

    /// Parses a fix from one JSON line and validates it.
    pub fn parse_line(line: &str) -> Result<Self> {
        let fix: LocationFix = serde_json::from_str(line.trim())
            .map_err(|e| Error::InvalidFix(format!("malformed fix: {e}")))?;
        fix.validate()?;
        Ok(fix)
    }

    /// Checks that coordinates are finite and in range.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("lat", self.lat),
            ("lng", self.lng),
            ("accuracy_m", self.accuracy_m),
            ("altitude_m", self.altitude_m),
            ("speed_ms", self.speed_ms),
            ("bearing", self.bearing),
        ];
        if let Some((name, _)) = fields.iter().find(|(_, v)| !v.is_finite()) {
            return Err(Error::InvalidFix(format!("{name} must be a finite number")));
        }
        if !(-90.0..=90.0).contains(&self.lat) {
            return Err(Error::InvalidFix(format!(
                "lat {} out of range [-90, 90]",
                self.lat
            )));
        }
        if !(-180.0..=180.0).contains(&self.lng) {
            return Err(Error::InvalidFix(format!(
                "lng {} out of range [-180, 180]",
                self.lng
            )));
        }
        if self.accuracy_m < 0.0 {
            return Err(Error::InvalidFix("accuracy_m cannot be negative".into()));
        }
        Ok(())
    }

    /// Builds the queue entry for this fix.
    ///
    /// `captured_at_ms` is used when the fix carries no timestamp of its own.
    pub fn entry(&self, device_id: &str, captured_at_ms: i64) -> Result<FixEntry> {
        self.validate()?;
        if device_id.is_empty() {
            return Err(Error::InvalidFix("device id cannot be empty".into()));
        }
        let timestamp = self.timestamp_ms.unwrap_or(captured_at_ms);

        Ok(FixEntry {
            key: record_key(device_id, timestamp),
            payload: json!({
                "timestamp": timestamp,
                "device_id": device_id,
                "lat": self.lat,
                "lng": self.lng,
                "accuracy_m": self.accuracy_m,
                "altitude_m": self.altitude_m,
                "speed_ms": self.speed_ms,
                "bearing": self.bearing,
            }),
        })
    }
}

/// Key for a fix captured by `device_id` at `timestamp_ms`.
pub fn record_key(device_id: &str, timestamp_ms: i64) -> String {
    format!("{KEY_PREFIX}:{device_id}:{timestamp_ms}")
}

#[cfg(test)]
#[path = "fix_tests.rs"]
mod tests;
