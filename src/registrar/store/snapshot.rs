use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::registrar::catalog::{Catalog, Course};
use crate::registrar::config::{Calendar, Policy};
use crate::registrar::err::StoreError;
use crate::registrar::person::Person;
use crate::registrar::registration::{RegistrationRequest, RequestId};
use crate::registrar::AppState;

/// 可序列化的完整状态
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub calendar: Calendar,
    pub policy: Policy,
    pub id_counter: u32,
    pub next_request_id: RequestId,
    pub courses: Vec<Course>,
    pub people: Vec<Person>,
    pub pending: Vec<RegistrationRequest>,
    #[serde(default)]
    pub history: Vec<RegistrationRequest>,
}

fn invalid(msg: String) -> StoreError {
    StoreError::InvalidSnapshot(msg)
}

impl AppState {
    pub fn to_snapshot(&self) -> Snapshot {
        Snapshot {
            calendar: self.calendar,
            policy: self.policy,
            id_counter: self.id_counter,
            next_request_id: self.next_request_id,
            courses: self.catalog.iter().cloned().collect(),
            people: self.people.values().cloned().collect(),
            pending: self.pending.clone(),
            history: self.history.clone(),
        }
    }

    /// Rebuild the state from a snapshot, refusing one whose parts do not
    /// agree with each other.
    pub fn from_snapshot(snapshot: Snapshot) -> Result<Self, StoreError> {
        let Snapshot {
            calendar,
            policy,
            id_counter,
            next_request_id,
            courses,
            people,
            pending,
            history,
        } = snapshot;

        let mut state = AppState::new(calendar.year, calendar.semester);
        state.policy = policy;
        state.id_counter = id_counter;
        state.next_request_id = next_request_id;

        let mut catalog = Catalog::new();
        for course in courses {
            let code = course.code().to_string();
            if !catalog.insert(course) {
                return Err(invalid(format!("duplicate course code {}", code)));
            }
        }
        state.catalog = catalog;

        for person in people {
            if let Some(student) = person.as_student() {
                if let Some(unknown) = student
                    .enrollment
                    .all()
                    .find(|r| !state.catalog.contains(r.course()))
                {
                    return Err(invalid(format!(
                        "{} is registered for unknown course {}",
                        person.id(),
                        unknown.course()
                    )));
                }
            }
            let id = person.id().to_string();
            if state.people.insert(id.clone(), person).is_some() {
                return Err(invalid(format!("duplicate person id {}", id)));
            }
        }

        let mut ids = BTreeSet::new();
        for request in pending.iter().chain(history.iter()) {
            if !ids.insert(request.id()) {
                return Err(invalid(format!("duplicate request id {}", request.id())));
            }
            if request.id() >= next_request_id {
                return Err(invalid(format!(
                    "request id {} is not below the next id {}",
                    request.id(),
                    next_request_id
                )));
            }
        }
        if let Some(request) = pending.iter().find(|r| r.status().is_terminal()) {
            return Err(invalid(format!("pending request {} is already decided", request.id())));
        }
        if let Some(request) = history.iter().find(|r| !r.status().is_terminal()) {
            return Err(invalid(format!("request {} in history is not decided", request.id())));
        }
        state.pending = pending;
        state.history = history;

        Ok(state)
    }
}
