use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{AttendanceStore, StoreError};
use crate::model::attendance::{
    AttendanceLogEntry, AttendanceSession, BranchGeofence, CloseSession, NewSession,
    ShiftDescriptor,
};

type EmployeeKey = (String, u64);

#[derive(Debug, Clone)]
struct EmployeeName {
    first_name: String,
    last_name: String,
}

#[derive(Debug, Default)]
struct MemoryState {
    next_id: u64,
    sessions: Vec<AttendanceSession>,
    shifts: HashMap<EmployeeKey, ShiftDescriptor>,
    branches: HashMap<EmployeeKey, BranchGeofence>,
    names: HashMap<EmployeeKey, EmployeeName>,
}

/// Process-local store. Every operation runs under one lock, which gives
/// the same open-session uniqueness and conditional close as the SQL store.
#[derive(Debug, Default)]
pub struct InMemoryAttendanceStore {
    state: Mutex<MemoryState>,
}

impl InMemoryAttendanceStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn with_shift(self, tenant_id: &str, employee_id: u64, shift: ShiftDescriptor) -> Self {
        self.state
            .lock()
            .shifts
            .insert((tenant_id.to_string(), employee_id), shift);
        self
    }

    #[cfg(test)]
    pub fn with_branch(self, tenant_id: &str, employee_id: u64, branch: BranchGeofence) -> Self {
        self.state
            .lock()
            .branches
            .insert((tenant_id.to_string(), employee_id), branch);
        self
    }

    #[cfg(test)]
    pub fn with_employee(
        self,
        tenant_id: &str,
        employee_id: u64,
        first_name: &str,
        last_name: &str,
    ) -> Self {
        self.state.lock().names.insert(
            (tenant_id.to_string(), employee_id),
            EmployeeName {
                first_name: first_name.to_string(),
                last_name: last_name.to_string(),
            },
        );
        self
    }

    #[cfg(test)]
    pub fn sessions(&self) -> Vec<AttendanceSession> {
        self.state.lock().sessions.clone()
    }
}

fn open_sessions<'a>(
    sessions: &'a [AttendanceSession],
    tenant_id: &'a str,
    employee_id: u64,
) -> impl Iterator<Item = &'a AttendanceSession> + 'a {
    sessions
        .iter()
        .filter(move |s| s.tenant_id == tenant_id && s.employee_id == employee_id && s.is_open())
}

#[async_trait]
impl AttendanceStore for InMemoryAttendanceStore {
    async fn find_open_session(
        &self,
        tenant_id: &str,
        employee_id: u64,
    ) -> Result<Option<AttendanceSession>, StoreError> {
        let state = self.state.lock();
        Ok(open_sessions(&state.sessions, tenant_id, employee_id)
            .next()
            .cloned())
    }

    async fn find_most_recent_open_session(
        &self,
        tenant_id: &str,
        employee_id: u64,
    ) -> Result<Option<AttendanceSession>, StoreError> {
        let state = self.state.lock();
        Ok(open_sessions(&state.sessions, tenant_id, employee_id)
            .max_by_key(|s| s.punch_in)
            .cloned())
    }

    async fn create_session(&self, session: NewSession) -> Result<AttendanceSession, StoreError> {
        let mut state = self.state.lock();

        if open_sessions(&state.sessions, &session.tenant_id, session.employee_id)
            .next()
            .is_some()
        {
            return Err(StoreError::Conflict(format!(
                "employee {} already has an open session",
                session.employee_id
            )));
        }

        state.next_id += 1;
        let created = session.into_session(state.next_id);
        state.sessions.push(created.clone());
        Ok(created)
    }

    async fn close_session(
        &self,
        session_id: u64,
        close: CloseSession,
    ) -> Result<AttendanceSession, StoreError> {
        let mut state = self.state.lock();

        let session = state
            .sessions
            .iter_mut()
            .find(|s| s.id == session_id && s.is_open())
            .ok_or_else(|| StoreError::NotFound(format!("open session {session_id}")))?;

        close.apply(session);
        Ok(session.clone())
    }

    async fn recent_logs(
        &self,
        tenant_id: &str,
        limit: u32,
    ) -> Result<Vec<AttendanceLogEntry>, StoreError> {
        let state = self.state.lock();
        let mut sessions: Vec<_> = state
            .sessions
            .iter()
            .filter(|s| s.tenant_id == tenant_id)
            .collect();
        sessions.sort_by(|a, b| b.punch_in.cmp(&a.punch_in));

        Ok(sessions
            .into_iter()
            .take(limit as usize)
            .map(|s| {
                let name = state.names.get(&(s.tenant_id.clone(), s.employee_id));
                AttendanceLogEntry {
                    session: s.clone(),
                    first_name: name.map(|n| n.first_name.clone()),
                    last_name: name.map(|n| n.last_name.clone()),
                }
            })
            .collect())
    }

    async fn lookup_shift(
        &self,
        employee_id: u64,
        tenant_id: &str,
    ) -> Result<Option<ShiftDescriptor>, StoreError> {
        Ok(self
            .state
            .lock()
            .shifts
            .get(&(tenant_id.to_string(), employee_id))
            .cloned())
    }

    async fn lookup_branch_geofence(
        &self,
        employee_id: u64,
        tenant_id: &str,
    ) -> Result<Option<BranchGeofence>, StoreError> {
        Ok(self
            .state
            .lock()
            .branches
            .get(&(tenant_id.to_string(), employee_id))
            .cloned())
    }
}
