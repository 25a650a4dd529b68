use std::sync::Arc;

use chrono::{DateTime, SubsecRound, Utc};
use tracing::{info, instrument, warn};

use super::error::AttendanceError;
use super::policy::AttendancePolicy;
use crate::model::attendance::{
    AttendanceLogEntry, AttendanceSession, AttendanceStatus, CloseSession, GeoPoint,
    LocationType, NewSession,
};
use crate::store::{AttendanceStore, StoreError};
use crate::utils::clock::Clock;
use crate::utils::geo::{is_within_radius, validate_point};
use crate::utils::lateness::is_late;

pub const DEFAULT_LOG_LIMIT: u32 = 50;
pub const MAX_LOG_LIMIT: u32 = 200;

const ACTIVE_SESSION_EXISTS: &str = "Active session already exists.";
const NO_ACTIVE_SESSION: &str = "No active session found to punch out from.";

#[derive(Debug, Clone)]
pub struct PunchIn {
    pub employee_id: u64,
    pub location_type: LocationType,
    pub location: Option<GeoPoint>,
    pub proof_ref: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PunchOut {
    pub employee_id: u64,
    pub location: Option<GeoPoint>,
    pub proof_ref: Option<String>,
}

/// Punch-in/punch-out rules over an [`AttendanceStore`].
///
/// A session moves from open to closed exactly once; a new punch-in after a
/// close always opens a fresh session.
#[derive(Clone)]
pub struct AttendanceService {
    store: Arc<dyn AttendanceStore>,
    clock: Arc<dyn Clock>,
    policy: AttendancePolicy,
}

impl AttendanceService {
    pub fn new(
        store: Arc<dyn AttendanceStore>,
        clock: Arc<dyn Clock>,
        policy: AttendancePolicy,
    ) -> Self {
        Self {
            store,
            clock,
            policy,
        }
    }

    #[instrument(
        name = "punch_in",
        skip(self, request),
        fields(employee_id = request.employee_id, location_type = %request.location_type)
    )]
    pub async fn punch_in(
        &self,
        tenant_id: &str,
        request: PunchIn,
    ) -> Result<AttendanceSession, AttendanceError> {
        if let Some(location) = &request.location {
            validate_point(location).map_err(AttendanceError::Validation)?;
        }

        // Fast path only; the store's uniqueness guard is authoritative
        if self
            .store
            .find_open_session(tenant_id, request.employee_id)
            .await?
            .is_some()
        {
            warn!("Punch-in rejected: active session exists");
            return Err(AttendanceError::Conflict(ACTIVE_SESSION_EXISTS.to_string()));
        }

        let now = self.now();

        let shift = self
            .store
            .lookup_shift(request.employee_id, tenant_id)
            .await
            .map_err(AttendanceError::dependency("shift lookup"))?;
        let late = shift
            .as_ref()
            .is_some_and(|s| is_late(now, s, self.policy.zone));

        let is_within_geofence = match (request.location_type, request.location) {
            (LocationType::Office, Some(location)) => {
                self.within_branch_geofence(tenant_id, request.employee_id, location)
                    .await?
            }
            _ => true,
        };

        let new_session = NewSession {
            tenant_id: tenant_id.to_string(),
            employee_id: request.employee_id,
            shift_id: shift.map(|s| s.id),
            punch_in: now,
            location_type: request.location_type,
            location: request.location,
            proof_ref: request.proof_ref,
            is_within_geofence,
            status: if late {
                AttendanceStatus::Late
            } else {
                AttendanceStatus::Present
            },
        };

        let session = self
            .store
            .create_session(new_session)
            .await
            .map_err(|e| match e {
                StoreError::Conflict(_) => {
                    warn!("Punch-in lost race to a concurrent punch-in");
                    AttendanceError::Conflict(ACTIVE_SESSION_EXISTS.to_string())
                }
                other => other.into(),
            })?;

        info!(
            session_id = session.id,
            status = %session.status,
            is_within_geofence = session.is_within_geofence,
            "Punch-in recorded"
        );

        Ok(session)
    }

    #[instrument(name = "punch_out", skip(self, request), fields(employee_id = request.employee_id))]
    pub async fn punch_out(
        &self,
        tenant_id: &str,
        request: PunchOut,
    ) -> Result<AttendanceSession, AttendanceError> {
        if let Some(location) = &request.location {
            validate_point(location).map_err(AttendanceError::Validation)?;
        }

        let session = self
            .store
            .find_most_recent_open_session(tenant_id, request.employee_id)
            .await?
            .ok_or_else(|| AttendanceError::NotFound(NO_ACTIVE_SESSION.to_string()))?;

        let now = self.now();
        let elapsed_minutes = (now - session.punch_in).num_milliseconds() as f64 / 60_000.0;

        if elapsed_minutes < f64::from(self.policy.min_session_minutes) {
            warn!(
                session_id = session.id,
                elapsed_minutes, "Punch-out rejected: session too short"
            );
            return Err(AttendanceError::Validation(format!(
                "Minimum shift duration is {} minutes.",
                self.policy.min_session_minutes
            )));
        }

        let out_within_geofence = match (session.location_type, request.location) {
            (LocationType::Office, Some(location)) => {
                self.within_branch_geofence(tenant_id, request.employee_id, location)
                    .await?
            }
            _ => true,
        };

        let hours = elapsed_minutes / 60.0;
        let close = CloseSession {
            punch_out: now,
            location: request.location,
            proof_ref: request.proof_ref,
            working_hours: round_hours(hours),
            status: self.policy.closing_status(session.status, hours),
            is_within_geofence: session.is_within_geofence && out_within_geofence,
        };

        let closed = self
            .store
            .close_session(session.id, close)
            .await
            .map_err(|e| match e {
                StoreError::NotFound(_) => {
                    warn!(session_id = session.id, "Punch-out lost race to a concurrent close");
                    AttendanceError::NotFound(NO_ACTIVE_SESSION.to_string())
                }
                other => other.into(),
            })?;

        info!(
            session_id = closed.id,
            status = %closed.status,
            working_hours = closed.working_hours,
            "Punch-out recorded"
        );

        Ok(closed)
    }

    /// The employee's open session, if any.
    pub async fn active_session(
        &self,
        tenant_id: &str,
        employee_id: u64,
    ) -> Result<Option<AttendanceSession>, AttendanceError> {
        Ok(self.store.find_open_session(tenant_id, employee_id).await?)
    }

    /// Latest sessions of the tenant with employee names, newest first.
    pub async fn recent_logs(
        &self,
        tenant_id: &str,
        limit: Option<u32>,
    ) -> Result<Vec<AttendanceLogEntry>, AttendanceError> {
        let limit = limit.unwrap_or(DEFAULT_LOG_LIMIT).clamp(1, MAX_LOG_LIMIT);
        Ok(self.store.recent_logs(tenant_id, limit).await?)
    }

    /// Current instant at the microsecond precision the store keeps, so the
    /// returned session matches what a later read gives back.
    fn now(&self) -> DateTime<Utc> {
        self.clock.now().trunc_subsecs(6)
    }

    async fn within_branch_geofence(
        &self,
        tenant_id: &str,
        employee_id: u64,
        location: GeoPoint,
    ) -> Result<bool, AttendanceError> {
        let branch = self
            .store
            .lookup_branch_geofence(employee_id, tenant_id)
            .await
            .map_err(AttendanceError::dependency("branch geofence lookup"))?;

        let Some(branch) = branch else {
            return Ok(true);
        };

        let radius = branch
            .radius_meters
            .unwrap_or(self.policy.default_geofence_radius_meters);
        let inside = is_within_radius(
            branch.center.lat,
            branch.center.lng,
            location.lat,
            location.lng,
            radius,
        );

        if !inside {
            warn!(employee_id, radius, "Punch outside branch geofence");
        }

        Ok(inside)
    }
}

fn round_hours(hours: f64) -> f64 {
    (hours * 100.0).round() / 100.0
}
