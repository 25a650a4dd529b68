use crate::attendance::{AttendanceError, AttendanceService, PunchIn, PunchOut};
use crate::auth::auth::AuthUser;
use crate::model::attendance::{
    AttendanceLogEntry, AttendanceSession, AttendanceStatus, GeoPoint, LocationType,
};
use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
pub struct PunchInRequest {
    /// Employee to punch for; defaults to the caller's own record
    #[schema(example = 1000, nullable = true)]
    pub employee_id: Option<u64>,
    #[schema(example = "OFFICE")]
    pub location_type: LocationType,
    #[schema(example = 23.8103, nullable = true)]
    pub lat: Option<f64>,
    #[schema(example = 90.4125, nullable = true)]
    pub lng: Option<f64>,
    /// Reference to the captured verification photo
    #[schema(example = "selfies/1000/2026-01-05-in.jpg", nullable = true)]
    pub proof_ref: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct PunchOutRequest {
    #[schema(example = 1000, nullable = true)]
    pub employee_id: Option<u64>,
    #[schema(example = 23.8103, nullable = true)]
    pub lat: Option<f64>,
    #[schema(example = 90.4125, nullable = true)]
    pub lng: Option<f64>,
    #[schema(example = "selfies/1000/2026-01-05-out.jpg", nullable = true)]
    pub proof_ref: Option<String>,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct ActiveSessionQuery {
    /// Employee to inspect; defaults to the caller's own record
    pub employee_id: Option<u64>,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct LogsQuery {
    /// Maximum number of sessions (default 50, max 200)
    pub limit: Option<u32>,
}

#[derive(Serialize, ToSchema)]
pub struct SessionResponse {
    #[schema(example = true)]
    pub success: bool,
    #[schema(example = "Punch-in successful")]
    pub message: String,
    pub data: AttendanceSession,
}

#[derive(Serialize, ToSchema)]
pub struct LogsResponse {
    #[schema(example = true)]
    pub success: bool,
    #[schema(example = 1)]
    pub count: usize,
    pub data: Vec<AttendanceLogEntry>,
}

fn coordinates(lat: Option<f64>, lng: Option<f64>) -> Result<Option<GeoPoint>, AttendanceError> {
    match (lat, lng) {
        (Some(lat), Some(lng)) => Ok(Some(GeoPoint { lat, lng })),
        (None, None) => Ok(None),
        _ => Err(AttendanceError::Validation(
            "lat and lng must be supplied together".to_string(),
        )),
    }
}

/// Punch-in endpoint
#[utoipa::path(
    post,
    path = "/api/attendance/punch-in",
    request_body(
        content = PunchInRequest,
        description = "Punch-in payload",
        content_type = "application/json"
    ),
    responses(
        (status = 201, description = "Session opened", body = SessionResponse),
        (status = 400, description = "Invalid coordinates", body = Object, example = json!({
            "success": false,
            "message": "Latitude 123 is outside -90..90"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Active session already exists", body = Object, example = json!({
            "success": false,
            "message": "Active session already exists."
        })),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn punch_in(
    auth: AuthUser,
    service: web::Data<AttendanceService>,
    payload: web::Json<PunchInRequest>,
) -> actix_web::Result<impl Responder> {
    let payload = payload.into_inner();
    let employee_id = auth.target_employee(payload.employee_id)?;
    debug!(user_id = auth.user_id, username = %auth.username, employee_id, "Punch-in request");

    let request = PunchIn {
        employee_id,
        location_type: payload.location_type,
        location: coordinates(payload.lat, payload.lng)?,
        proof_ref: payload.proof_ref,
    };

    let session = service.punch_in(&auth.tenant_id, request).await?;

    let message = if session.status == AttendanceStatus::Late {
        "Punch-in recorded (Late)"
    } else {
        "Punch-in successful"
    };

    Ok(HttpResponse::Created().json(SessionResponse {
        success: true,
        message: message.to_string(),
        data: session,
    }))
}

/// Punch-out endpoint
#[utoipa::path(
    post,
    path = "/api/attendance/punch-out",
    request_body(
        content = PunchOutRequest,
        description = "Punch-out payload",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Session closed", body = SessionResponse),
        (status = 400, description = "Session shorter than the minimum duration", body = Object, example = json!({
            "success": false,
            "message": "Minimum shift duration is 15 minutes."
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "No active session", body = Object, example = json!({
            "success": false,
            "message": "No active session found to punch out from."
        })),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn punch_out(
    auth: AuthUser,
    service: web::Data<AttendanceService>,
    payload: web::Json<PunchOutRequest>,
) -> actix_web::Result<impl Responder> {
    let payload = payload.into_inner();
    let employee_id = auth.target_employee(payload.employee_id)?;
    debug!(user_id = auth.user_id, username = %auth.username, employee_id, "Punch-out request");

    let request = PunchOut {
        employee_id,
        location: coordinates(payload.lat, payload.lng)?,
        proof_ref: payload.proof_ref,
    };

    let session = service.punch_out(&auth.tenant_id, request).await?;

    Ok(HttpResponse::Ok().json(SessionResponse {
        success: true,
        message: "Punch-out successful.".to_string(),
        data: session,
    }))
}

/// Current open session of an employee
#[utoipa::path(
    get,
    path = "/api/attendance/active",
    params(ActiveSessionQuery),
    responses(
        (status = 200, description = "Open session, or null when punched out", body = Object, example = json!({
            "success": true,
            "data": null
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn active_session(
    auth: AuthUser,
    service: web::Data<AttendanceService>,
    query: web::Query<ActiveSessionQuery>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.target_employee(query.employee_id)?;
    let session = service.active_session(&auth.tenant_id, employee_id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "data": session
    })))
}

/// Recent attendance logs of the tenant (Admin/HR/Manager)
#[utoipa::path(
    get,
    path = "/api/attendance/logs",
    params(LogsQuery),
    responses(
        (status = 200, description = "Latest sessions with employee names, newest first", body = LogsResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn logs(
    auth: AuthUser,
    service: web::Data<AttendanceService>,
    query: web::Query<LogsQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_supervisor()?;

    let entries = service.recent_logs(&auth.tenant_id, query.limit).await?;

    Ok(HttpResponse::Ok().json(LogsResponse {
        success: true,
        count: entries.len(),
        data: entries,
    }))
}
