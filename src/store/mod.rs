//! Persistence contract for attendance sessions and the employee lookups
//! the punch rules depend on.

pub mod memory;
pub mod mysql;

use async_trait::async_trait;
use thiserror::Error;

use crate::model::attendance::{
    AttendanceLogEntry, AttendanceSession, BranchGeofence, CloseSession, NewSession,
    ShiftDescriptor,
};

#[derive(Debug, Error)]
pub enum StoreError {
    /// The open-session uniqueness guard rejected the write.
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("not found: {0}")]
    NotFound(String),

    /// A stored row could not be mapped back to the domain model.
    #[error("corrupt record: {0}")]
    Decode(String),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait AttendanceStore: Send + Sync {
    /// The open session of the employee, if any.
    async fn find_open_session(
        &self,
        tenant_id: &str,
        employee_id: u64,
    ) -> Result<Option<AttendanceSession>, StoreError>;

    /// The open session with the latest punch-in, if any.
    async fn find_most_recent_open_session(
        &self,
        tenant_id: &str,
        employee_id: u64,
    ) -> Result<Option<AttendanceSession>, StoreError>;

    /// Inserts a new open session.
    ///
    /// Must fail with [`StoreError::Conflict`] if the employee already has an
    /// open session, even when two inserts race.
    async fn create_session(&self, session: NewSession) -> Result<AttendanceSession, StoreError>;

    /// Closes the session only if it is still open.
    ///
    /// Fails with [`StoreError::NotFound`] if the id is unknown or already closed.
    async fn close_session(
        &self,
        session_id: u64,
        close: CloseSession,
    ) -> Result<AttendanceSession, StoreError>;

    /// Most recent sessions of the tenant with employee names, newest
    /// punch-in first.
    async fn recent_logs(
        &self,
        tenant_id: &str,
        limit: u32,
    ) -> Result<Vec<AttendanceLogEntry>, StoreError>;

    async fn lookup_shift(
        &self,
        employee_id: u64,
        tenant_id: &str,
    ) -> Result<Option<ShiftDescriptor>, StoreError>;

    async fn lookup_branch_geofence(
        &self,
        employee_id: u64,
        tenant_id: &str,
    ) -> Result<Option<BranchGeofence>, StoreError>;
}
