use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, NaiveTime, Utc};
use sqlx::{FromRow, MySqlPool};

use super::{AttendanceStore, StoreError};
use crate::model::attendance::{
    AttendanceLogEntry, AttendanceSession, AttendanceStatus, BranchGeofence, CloseSession,
    GeoPoint, LocationType, NewSession, ShiftDescriptor,
};

const SESSION_COLUMNS: &str = r#"
    id, client_id, employee_id, shift_id,
    punch_in, punch_out,
    punch_in_lat, punch_in_lng, punch_in_selfie_url,
    punch_out_lat, punch_out_lng, punch_out_selfie_url,
    location_type, is_within_geofence, working_hours, status
"#;

/// MySQL-backed store. The one-open-session rule is enforced by the
/// `uq_attendance_open` key over the generated `open_marker` column.
#[derive(Clone)]
pub struct MySqlAttendanceStore {
    pool: MySqlPool,
}

impl MySqlAttendanceStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    async fn fetch_by_id(&self, id: u64) -> Result<Option<AttendanceSession>, StoreError> {
        let sql = format!("SELECT {SESSION_COLUMNS} FROM attendance WHERE id = ?");

        sqlx::query_as::<_, AttendanceRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(AttendanceSession::try_from)
            .transpose()
    }

    async fn fetch_open(
        &self,
        tenant_id: &str,
        employee_id: u64,
    ) -> Result<Option<AttendanceSession>, StoreError> {
        let sql = format!(
            r#"
            SELECT {SESSION_COLUMNS}
            FROM attendance
            WHERE client_id = ? AND employee_id = ? AND punch_out IS NULL
            ORDER BY punch_in DESC
            LIMIT 1
            "#
        );

        sqlx::query_as::<_, AttendanceRow>(&sql)
            .bind(tenant_id)
            .bind(employee_id)
            .fetch_optional(&self.pool)
            .await?
            .map(AttendanceSession::try_from)
            .transpose()
    }
}

#[derive(FromRow)]
struct AttendanceLogRow {
    #[sqlx(flatten)]
    session: AttendanceRow,
    first_name: Option<String>,
    last_name: Option<String>,
}

#[derive(FromRow)]
struct AttendanceRow {
    id: u64,
    client_id: String,
    employee_id: u64,
    shift_id: Option<u64>,
    punch_in: DateTime<Utc>,
    punch_out: Option<DateTime<Utc>>,
    punch_in_lat: Option<f64>,
    punch_in_lng: Option<f64>,
    punch_in_selfie_url: Option<String>,
    punch_out_lat: Option<f64>,
    punch_out_lng: Option<f64>,
    punch_out_selfie_url: Option<String>,
    location_type: String,
    is_within_geofence: bool,
    working_hours: Option<f64>,
    status: String,
}

fn point(lat: Option<f64>, lng: Option<f64>) -> Option<GeoPoint> {
    match (lat, lng) {
        (Some(lat), Some(lng)) => Some(GeoPoint { lat, lng }),
        _ => None,
    }
}

impl TryFrom<AttendanceRow> for AttendanceSession {
    type Error = StoreError;

    fn try_from(row: AttendanceRow) -> Result<Self, Self::Error> {
        let location_type = LocationType::from_str(&row.location_type).map_err(|_| {
            StoreError::Decode(format!(
                "attendance {}: unknown location_type {:?}",
                row.id, row.location_type
            ))
        })?;
        let status = AttendanceStatus::from_str(&row.status).map_err(|_| {
            StoreError::Decode(format!("attendance {}: unknown status {:?}", row.id, row.status))
        })?;

        Ok(AttendanceSession {
            id: row.id,
            tenant_id: row.client_id,
            employee_id: row.employee_id,
            shift_id: row.shift_id,
            punch_in: row.punch_in,
            punch_out: row.punch_out,
            location_type,
            punch_in_location: point(row.punch_in_lat, row.punch_in_lng),
            punch_out_location: point(row.punch_out_lat, row.punch_out_lng),
            punch_in_proof_ref: row.punch_in_selfie_url,
            punch_out_proof_ref: row.punch_out_selfie_url,
            is_within_geofence: row.is_within_geofence,
            working_hours: row.working_hours,
            status,
        })
    }
}

#[derive(FromRow)]
struct ShiftRow {
    id: u64,
    start_time: NaiveTime,
    grace_period_mins: u32,
}

#[derive(FromRow)]
struct BranchRow {
    latitude: Option<f64>,
    longitude: Option<f64>,
    geofence_radius_meters: Option<f64>,
}

/// Only a unique-key hit (MySQL 1062) means a second open session; SQLSTATE
/// 23000 alone also covers foreign-key and NOT NULL failures.
fn is_open_session_conflict(e: &sqlx::Error) -> bool {
    match e {
        sqlx::Error::Database(db_err) => db_err.is_unique_violation(),
        _ => false,
    }
}

#[async_trait]
impl AttendanceStore for MySqlAttendanceStore {
    async fn find_open_session(
        &self,
        tenant_id: &str,
        employee_id: u64,
    ) -> Result<Option<AttendanceSession>, StoreError> {
        self.fetch_open(tenant_id, employee_id).await
    }

    async fn find_most_recent_open_session(
        &self,
        tenant_id: &str,
        employee_id: u64,
    ) -> Result<Option<AttendanceSession>, StoreError> {
        self.fetch_open(tenant_id, employee_id).await
    }

    async fn create_session(&self, session: NewSession) -> Result<AttendanceSession, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO attendance (
                client_id, employee_id, shift_id, punch_in,
                punch_in_lat, punch_in_lng, punch_in_selfie_url,
                location_type, is_within_geofence, status
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&session.tenant_id)
        .bind(session.employee_id)
        .bind(session.shift_id)
        .bind(session.punch_in)
        .bind(session.location.map(|p| p.lat))
        .bind(session.location.map(|p| p.lng))
        .bind(&session.proof_ref)
        .bind(session.location_type.to_string())
        .bind(session.is_within_geofence)
        .bind(session.status.to_string())
        .execute(&self.pool)
        .await;

        match result {
            Ok(done) => Ok(session.into_session(done.last_insert_id())),
            Err(e) if is_open_session_conflict(&e) => Err(StoreError::Conflict(format!(
                "employee {} already has an open session",
                session.employee_id
            ))),
            Err(e) => Err(e.into()),
        }
    }

    async fn close_session(
        &self,
        session_id: u64,
        close: CloseSession,
    ) -> Result<AttendanceSession, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE attendance
            SET punch_out = ?,
                punch_out_lat = ?,
                punch_out_lng = ?,
                punch_out_selfie_url = ?,
                working_hours = ?,
                status = ?,
                is_within_geofence = ?
            WHERE id = ?
            AND punch_out IS NULL
            "#,
        )
        .bind(close.punch_out)
        .bind(close.location.map(|p| p.lat))
        .bind(close.location.map(|p| p.lng))
        .bind(&close.proof_ref)
        .bind(close.working_hours)
        .bind(close.status.to_string())
        .bind(close.is_within_geofence)
        .bind(session_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("open session {session_id}")));
        }

        self.fetch_by_id(session_id)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("session {session_id}")))
    }

    async fn recent_logs(
        &self,
        tenant_id: &str,
        limit: u32,
    ) -> Result<Vec<AttendanceLogEntry>, StoreError> {
        let rows = sqlx::query_as::<_, AttendanceLogRow>(
            r#"
            SELECT
                a.id, a.client_id, a.employee_id, a.shift_id,
                a.punch_in, a.punch_out,
                a.punch_in_lat, a.punch_in_lng, a.punch_in_selfie_url,
                a.punch_out_lat, a.punch_out_lng, a.punch_out_selfie_url,
                a.location_type, a.is_within_geofence, a.working_hours, a.status,
                e.first_name, e.last_name
            FROM attendance a
            LEFT JOIN employees e ON e.id = a.employee_id AND e.client_id = a.client_id
            WHERE a.client_id = ?
            ORDER BY a.punch_in DESC
            LIMIT ?
            "#,
        )
        .bind(tenant_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| -> Result<AttendanceLogEntry, StoreError> {
                Ok(AttendanceLogEntry {
                    session: AttendanceSession::try_from(row.session)?,
                    first_name: row.first_name,
                    last_name: row.last_name,
                })
            })
            .collect()
    }

    async fn lookup_shift(
        &self,
        employee_id: u64,
        tenant_id: &str,
    ) -> Result<Option<ShiftDescriptor>, StoreError> {
        let row = sqlx::query_as::<_, ShiftRow>(
            r#"
            SELECT s.id, s.start_time, s.grace_period_mins
            FROM employees e
            JOIN shifts s ON e.shift_id = s.id
            WHERE e.id = ? AND e.client_id = ?
            "#,
        )
        .bind(employee_id)
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| ShiftDescriptor {
            id: r.id,
            start_time: r.start_time,
            grace_period_mins: r.grace_period_mins,
        }))
    }

    async fn lookup_branch_geofence(
        &self,
        employee_id: u64,
        tenant_id: &str,
    ) -> Result<Option<BranchGeofence>, StoreError> {
        let row = sqlx::query_as::<_, BranchRow>(
            r#"
            SELECT b.latitude, b.longitude, b.geofence_radius_meters
            FROM employees e
            JOIN branches b ON e.branch_id = b.id
            WHERE e.id = ? AND e.client_id = ?
            "#,
        )
        .bind(employee_id)
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await?;

        // A branch without a center has no geofence to check against
        Ok(row.and_then(|r| {
            point(r.latitude, r.longitude).map(|center| BranchGeofence {
                center,
                radius_meters: r.geofence_radius_meters,
            })
        }))
    }
}
