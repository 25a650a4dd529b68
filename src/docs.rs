use crate::api::attendance::{
    ActiveSessionQuery, LogsQuery, LogsResponse, PunchInRequest, PunchOutRequest, SessionResponse,
};
use crate::model::attendance::{
    AttendanceLogEntry, AttendanceSession, AttendanceStatus, GeoPoint, LocationType,
};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HRM Attendance API",
        version = "1.0.0",
        description = r#"
## Time & Attendance

Punch-in / punch-out tracking for a multi-tenant HR system.

### 🔹 Key Features
- **Punch-in** with optional GPS coordinates and selfie reference
  - Lateness against the employee's shift start + grace period
  - Geofence check against the employee's branch for OFFICE punches
- **Punch-out** with a 15 minute minimum session
  - Final status: PRESENT, LATE, HALF_DAY or ABSENT from the worked hours
- **Active session** lookup and **attendance logs** for supervisors

### 🔐 Security
Endpoints under `/api` require a **JWT Bearer** access token carrying the tenant id.
An optional `x-tenant-id` header must match the token's tenant.

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::attendance::punch_in,
        crate::api::attendance::punch_out,
        crate::api::attendance::active_session,
        crate::api::attendance::logs,

        crate::api::health::health
    ),
    components(
        schemas(
            PunchInRequest,
            PunchOutRequest,
            ActiveSessionQuery,
            LogsQuery,
            SessionResponse,
            LogsResponse,
            AttendanceSession,
            AttendanceLogEntry,
            AttendanceStatus,
            LocationType,
            GeoPoint
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Attendance", description = "Attendance punch APIs"),
        (name = "Health", description = "Service health"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_every_attendance_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/attendance/punch-in",
            "/api/attendance/punch-out",
            "/api/attendance/active",
            "/api/attendance/logs",
            "/health",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
