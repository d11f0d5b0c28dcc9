// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Outbox rows and their change payloads.
//!
//! Rows are written into `webhook_outbox` by database triggers on the unit
//! table. Each row carries a JSON diff with the old and new values of the
//! tracked columns:
//!
//! ```text
//! {"OLD_STATUS":"2","NEW_STATUS":"4","OLD_KOORDX":7.1,"NEW_KOORDX":7.2,...}
//! ```
//!
//! Status codes arrive as strings or integers depending on the trigger;
//! coordinates as numbers or numeric strings. `KOORDX` is the longitude,
//! `KOORDY` the latitude.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::unit::{Position, UnitStatus, UnitUpdate};

/// Processing state of an outbox row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutboxStatus {
    /// Waiting to be relayed.
    New,
    /// Quarantined after repeated failures; never fetched again.
    Dead,
}

impl OutboxStatus {
    /// Returns the string representation used in storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            OutboxStatus::New => "NEW",
            OutboxStatus::Dead => "DEAD",
        }
    }
}

impl fmt::Display for OutboxStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OutboxStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_uppercase().as_str() {
            "NEW" => Ok(OutboxStatus::New),
            "DEAD" => Ok(OutboxStatus::Dead),
            _ => Err(Error::InvalidOutboxStatus(s.to_string())),
        }
    }
}

/// A pending change notification read from the outbox table.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboxRow {
    /// Increasing sequence number, used to acknowledge the row.
    pub id: i64,
    /// Local key of the changed unit (its name).
    pub pk: String,
    /// Raw JSON diff.
    pub payload: String,
    /// `None` when the stored value is not a readable timestamp.
    pub created_at: Option<DateTime<Utc>>,
    pub status: OutboxStatus,
    pub correlation_id: Option<String>,
}

impl OutboxRow {
    /// Parses the row's payload.
    pub fn parse_payload(&self) -> Result<OutboxPayload> {
        self.payload.parse()
    }
}

/// Typed view of an outbox payload.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct OutboxPayload {
    #[serde(rename = "OLD_STATUS", default)]
    pub old_status: Option<StatusValue>,
    #[serde(rename = "NEW_STATUS", default)]
    pub new_status: Option<StatusValue>,
    #[serde(rename = "OLD_KOORDX", default, deserialize_with = "coordinate")]
    pub old_koordx: Option<f64>,
    #[serde(rename = "NEW_KOORDX", default, deserialize_with = "coordinate")]
    pub new_koordx: Option<f64>,
    #[serde(rename = "OLD_KOORDY", default, deserialize_with = "coordinate")]
    pub old_koordy: Option<f64>,
    #[serde(rename = "NEW_KOORDY", default, deserialize_with = "coordinate")]
    pub new_koordy: Option<f64>,
}

/// A status code as written by the trigger.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum StatusValue {
    Number(i64),
    Text(String),
}

impl StatusValue {
    pub fn to_status(&self) -> Result<UnitStatus> {
        match self {
            StatusValue::Number(n) => UnitStatus::try_from(*n),
            StatusValue::Text(s) => s.parse(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CoordinateValue {
    Number(f64),
    Text(String),
}

fn coordinate<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<CoordinateValue>::deserialize(deserializer)? {
        None => Ok(None),
        Some(CoordinateValue::Number(n)) => Ok(Some(n)),
        Some(CoordinateValue::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(CoordinateValue::Text(s)) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid coordinate '{s}'"))),
    }
}

impl FromStr for OutboxPayload {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        serde_json::from_str(s).map_err(|e| Error::InvalidPayload(e.to_string()))
    }
}

impl OutboxPayload {
    /// Extracts the fields whose new value differs from the old one.
    ///
    /// An empty update means the row records no actual change. An unreadable
    /// old status counts as changed; an unreadable new status is an error.
    pub fn changes(&self) -> Result<UnitUpdate> {
        let status = match &self.new_status {
            None => None,
            Some(new) => {
                let new = new.to_status()?;
                let old = self.old_status.as_ref().and_then(|v| v.to_status().ok());
                (old != Some(new)).then_some(new)
            }
        };

        let x_changed = self.new_koordx.is_some() && self.new_koordx != self.old_koordx;
        let y_changed = self.new_koordy.is_some() && self.new_koordy != self.old_koordy;
        let position = if x_changed || y_changed {
            match (self.new_koordx, self.new_koordy) {
                (Some(longitude), Some(latitude)) => {
                    Some(Some(Position::new(longitude, latitude)))
                }
                _ => {
                    return Err(Error::InvalidPayload(
                        "position change requires both NEW_KOORDX and NEW_KOORDY".to_string(),
                    ))
                }
            }
        } else {
            None
        };

        Ok(UnitUpdate { status, position })
    }
}

#[cfg(test)]
#[path = "outbox_tests.rs"]
mod tests;
