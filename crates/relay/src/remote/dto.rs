// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Wire shapes of the remote unit API.

use edp_core::{Position, Unit, UnitStatus};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Body of `POST /token`.
#[derive(Debug, Serialize)]
pub struct TokenRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Response of `POST /token`.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

/// HAL collection returned by `GET /units`.
#[derive(Debug, Default, Deserialize)]
pub struct UnitListResponse {
    #[serde(rename = "_embedded", default)]
    pub embedded: Option<EmbeddedUnits>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbeddedUnits {
    #[serde(default)]
    pub unit_list: Vec<UnitDto>,
}

impl UnitListResponse {
    pub fn into_units(self) -> Vec<Unit> {
        self.embedded
            .map(|e| e.unit_list.into_iter().map(Unit::from).collect())
            .unwrap_or_default()
    }
}

/// A unit as the remote service represents it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitDto {
    #[serde(default)]
    pub id: Option<Uuid>,
    pub name: String,
    /// Raw status code; the remote side does not bound it to a byte.
    #[serde(default)]
    pub status: Option<i64>,
    #[serde(default)]
    pub position: Option<Position>,
}

impl From<UnitDto> for Unit {
    /// An out-of-range status is read as unknown so one unit cannot fail
    /// the whole listing.
    fn from(dto: UnitDto) -> Self {
        let status = match dto.status.map(UnitStatus::try_from) {
            None => UnitStatus::default(),
            Some(Ok(status)) => status,
            Some(Err(e)) => {
                tracing::warn!("remote unit '{}': {e}", dto.name);
                UnitStatus::default()
            }
        };
        Unit {
            id: dto.id,
            name: dto.name,
            status,
            position: dto.position,
        }
    }
}

/// Body of `POST /units`.
#[derive(Debug, Serialize)]
pub struct CreateUnitRequest<'a> {
    pub name: &'a str,
    pub status: UnitStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

impl<'a> From<&'a Unit> for CreateUnitRequest<'a> {
    fn from(unit: &'a Unit) -> Self {
        CreateUnitRequest {
            name: &unit.name,
            status: unit.status,
            position: unit.position,
        }
    }
}

#[cfg(test)]
#[path = "dto_tests.rs"]
mod tests;
