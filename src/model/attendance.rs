use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum LocationType {
    Office,
    Wfh,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum AttendanceStatus {
    Present,
    Late,
    Absent,
    HalfDay,
}

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GeoPoint {
    #[schema(example = 23.8103)]
    pub lat: f64,
    #[schema(example = 90.4125)]
    pub lng: f64,
}

/// One continuous work period of one employee.
///
/// The session is open while `punch_out` is `None`. Closing sets `punch_out`,
/// `working_hours` and the final `status` together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(
    example = json!({
        "id": 42,
        "tenant_id": "acme",
        "employee_id": 1000,
        "shift_id": 3,
        "punch_in": "2026-01-05T09:02:11Z",
        "punch_out": null,
        "location_type": "OFFICE",
        "punch_in_location": { "lat": 23.8103, "lng": 90.4125 },
        "punch_out_location": null,
        "punch_in_proof_ref": "selfies/1000/2026-01-05.jpg",
        "punch_out_proof_ref": null,
        "is_within_geofence": true,
        "working_hours": null,
        "status": "PRESENT"
    })
)]
pub struct AttendanceSession {
    #[schema(example = 42)]
    pub id: u64,
    #[schema(example = "acme")]
    pub tenant_id: String,
    #[schema(example = 1000)]
    pub employee_id: u64,
    #[schema(nullable = true)]
    pub shift_id: Option<u64>,
    #[schema(example = "2026-01-05T09:02:11Z", format = "date-time", value_type = String)]
    pub punch_in: DateTime<Utc>,
    #[schema(format = "date-time", value_type = String, nullable = true)]
    pub punch_out: Option<DateTime<Utc>>,
    pub location_type: LocationType,
    #[schema(nullable = true)]
    pub punch_in_location: Option<GeoPoint>,
    #[schema(nullable = true)]
    pub punch_out_location: Option<GeoPoint>,
    #[schema(nullable = true)]
    pub punch_in_proof_ref: Option<String>,
    #[schema(nullable = true)]
    pub punch_out_proof_ref: Option<String>,
    pub is_within_geofence: bool,
    #[schema(example = 8.25, nullable = true)]
    pub working_hours: Option<f64>,
    pub status: AttendanceStatus,
}

impl AttendanceSession {
    pub fn is_open(&self) -> bool {
        self.punch_out.is_none()
    }
}

/// A session as listed in the tenant's attendance log, with the name of the
/// employee it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AttendanceLogEntry {
    #[serde(flatten)]
    pub session: AttendanceSession,
    #[schema(example = "Jane", nullable = true)]
    pub first_name: Option<String>,
    #[schema(example = "Doe", nullable = true)]
    pub last_name: Option<String>,
}

/// Fields of a session about to be opened; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewSession {
    pub tenant_id: String,
    pub employee_id: u64,
    pub shift_id: Option<u64>,
    pub punch_in: DateTime<Utc>,
    pub location_type: LocationType,
    pub location: Option<GeoPoint>,
    pub proof_ref: Option<String>,
    pub is_within_geofence: bool,
    pub status: AttendanceStatus,
}

impl NewSession {
    pub fn into_session(self, id: u64) -> AttendanceSession {
        AttendanceSession {
            id,
            tenant_id: self.tenant_id,
            employee_id: self.employee_id,
            shift_id: self.shift_id,
            punch_in: self.punch_in,
            punch_out: None,
            location_type: self.location_type,
            punch_in_location: self.location,
            punch_out_location: None,
            punch_in_proof_ref: self.proof_ref,
            punch_out_proof_ref: None,
            is_within_geofence: self.is_within_geofence,
            working_hours: None,
            status: self.status,
        }
    }
}

/// Fields written when an open session is closed.
#[derive(Debug, Clone)]
pub struct CloseSession {
    pub punch_out: DateTime<Utc>,
    pub location: Option<GeoPoint>,
    pub proof_ref: Option<String>,
    pub working_hours: f64,
    pub status: AttendanceStatus,
    pub is_within_geofence: bool,
}

impl CloseSession {
    pub fn apply(self, session: &mut AttendanceSession) {
        session.punch_out = Some(self.punch_out);
        session.punch_out_location = self.location;
        session.punch_out_proof_ref = self.proof_ref;
        session.working_hours = Some(self.working_hours);
        session.status = self.status;
        session.is_within_geofence = self.is_within_geofence;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShiftDescriptor {
    pub id: u64,
    pub start_time: NaiveTime,
    pub grace_period_mins: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BranchGeofence {
    pub center: GeoPoint,
    /// `None` when the branch has a location but no configured radius.
    pub radius_meters: Option<f64>,
}
