// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Test doubles for the remote API.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::collections::{HashSet, VecDeque};
use std::sync::Mutex;

use edp_core::{Unit, UnitUpdate};
use uuid::Uuid;

use crate::remote::{
    ApiRequest, ApiResponse, RemoteError, RemoteResult, Transport, TransportError, UnitApi,
};
use crate::remote::transport::TransportResult;

/// Transport replaying scripted responses and recording every request.
#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<VecDeque<TransportResult<ApiResponse>>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, status: u16, body: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(ApiResponse::new(status, body)));
        self
    }

    pub fn fail(self, error: TransportError) -> Self {
        self.responses.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of recorded requests with this method and path.
    pub fn count(&self, method: crate::remote::Method, path: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }
}

impl Transport for MockTransport {
    fn send(&self, request: &ApiRequest) -> TransportResult<ApiResponse> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::ConnectionFailed("no scripted response".into())))
    }
}

/// In-memory remote unit service.
#[derive(Default)]
pub struct InMemoryRemote {
    pub units: Vec<Unit>,
    pub created: Vec<Unit>,
    pub updates: Vec<(Uuid, UnitUpdate)>,
    pub list_calls: usize,
    fail_list: bool,
    failing_ids: HashSet<Uuid>,
}

impl InMemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a unit with a fresh id and return that id.
    pub fn seed(&mut self, unit: Unit) -> Uuid {
        let id = unit.id.unwrap_or_else(Uuid::new_v4);
        self.units.push(unit.with_id(id));
        id
    }

    pub fn unit(&self, name: &str) -> Option<&Unit> {
        self.units.iter().find(|u| u.name == name)
    }

    pub fn fail_list(&mut self) {
        self.fail_list = true;
    }

    pub fn fail_updates_for(&mut self, id: Uuid) {
        self.failing_ids.insert(id);
    }

    pub fn recover(&mut self, id: Uuid) {
        self.failing_ids.remove(&id);
    }
}

impl UnitApi for InMemoryRemote {
    fn list_units(&mut self) -> RemoteResult<Vec<Unit>> {
        self.list_calls += 1;
        if self.fail_list {
            return Err(RemoteError::Read { status: 503 });
        }
        Ok(self.units.clone())
    }

    fn create_unit(&mut self, unit: &Unit) -> RemoteResult<Unit> {
        let created = unit.clone().with_id(Uuid::new_v4());
        self.units.push(created.clone());
        self.created.push(created.clone());
        Ok(created)
    }

    fn update_unit(&mut self, id: Uuid, update: &UnitUpdate) -> RemoteResult<()> {
        if self.failing_ids.contains(&id) {
            return Err(RemoteError::Write { status: 500 });
        }
        let unit = self
            .units
            .iter_mut()
            .find(|u| u.id == Some(id))
            .ok_or(RemoteError::Write { status: 404 })?;
        update.apply_to(unit);
        self.updates.push((id, *update));
        Ok(())
    }
}
