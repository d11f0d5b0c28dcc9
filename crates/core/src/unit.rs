// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Unit types shared by the local store and the remote API.
//!
//! A [`Unit`] is the trackable entity: a named vehicle or team with a radio
//! status code and an optional last known position. The `name` is the join
//! key between the local store (which never learns the remote id) and the
//! remote service, so [`UnitMapping`] keys on it.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{Error, Result};

/// Radio status code of a unit (FMS status).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitStatus(u8);

impl UnitStatus {
    /// Status reported for units nothing is known about yet.
    pub const UNKNOWN: UnitStatus = UnitStatus(6);

    pub const fn new(code: u8) -> Self {
        UnitStatus(code)
    }

    pub const fn code(&self) -> u8 {
        self.0
    }
}

impl Default for UnitStatus {
    fn default() -> Self {
        UnitStatus::UNKNOWN
    }
}

impl fmt::Display for UnitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UnitStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        s.trim()
            .parse::<u8>()
            .map(UnitStatus)
            .map_err(|_| Error::InvalidStatus(s.to_string()))
    }
}

impl TryFrom<i64> for UnitStatus {
    type Error = Error;

    fn try_from(value: i64) -> Result<Self> {
        u8::try_from(value)
            .map(UnitStatus)
            .map_err(|_| Error::InvalidStatus(value.to_string()))
    }
}

/// Geographic coordinate of a unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub longitude: f64,
    pub latitude: f64,
}

impl Position {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Position {
            longitude,
            latitude,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.longitude, self.latitude)
    }
}

/// A trackable unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    /// Remote identifier; `None` until the unit exists remotely.
    pub id: Option<Uuid>,
    /// Unique name, shared by the local store and the remote service.
    pub name: String,
    pub status: UnitStatus,
    pub position: Option<Position>,
}

impl Unit {
    /// Creates a unit that has not been mirrored remotely yet.
    pub fn new(name: impl Into<String>) -> Self {
        Unit {
            id: None,
            name: name.into(),
            status: UnitStatus::default(),
            position: None,
        }
    }

    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_status(mut self, status: UnitStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    /// Returns the fields of `self` that differ from `other`.
    ///
    /// A position `self` does not know clears the one `other` holds.
    pub fn diff_from(&self, other: &Unit) -> UnitUpdate {
        UnitUpdate {
            status: (self.status != other.status).then_some(self.status),
            position: (self.position != other.position).then_some(self.position),
        }
    }
}

/// Partial update of a unit's mutable fields.
///
/// Absent fields are left untouched by the receiver. `position` set to
/// `Some(None)` is sent as `"position": null` and clears the position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct UnitUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<UnitStatus>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present"
    )]
    pub position: Option<Option<Position>>,
}

/// Distinguishes an explicit `null` from a missing field.
fn present<'de, D, T>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl UnitUpdate {
    /// Returns true if the update carries no field.
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.position.is_none()
    }

    /// Applies the present fields onto `unit`.
    pub fn apply_to(&self, unit: &mut Unit) {
        if let Some(status) = self.status {
            unit.status = status;
        }
        if let Some(position) = self.position {
            unit.position = position;
        }
    }
}

/// Association between unit names and remote identifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnitMapping {
    ids: HashMap<String, Uuid>,
}

impl UnitMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `name → id`, returning the previously mapped id if any.
    pub fn insert(&mut self, name: impl Into<String>, id: Uuid) -> Option<Uuid> {
        self.ids.insert(name.into(), id)
    }

    pub fn get(&self, name: &str) -> Option<Uuid> {
        self.ids.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.ids.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Uuid)> {
        self.ids.iter().map(|(name, id)| (name.as_str(), *id))
    }
}

#[cfg(test)]
#[path = "unit_tests.rs"]
mod tests;
