use chrono::{FixedOffset, Offset, Utc};

use crate::model::attendance::AttendanceStatus;

/// Thresholds and reference zone for punch classification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttendancePolicy {
    /// Zone in which shift start times are interpreted
    pub zone: FixedOffset,
    /// Shortest session that may be closed
    pub min_session_minutes: u32,
    /// Sessions shorter than this close as ABSENT
    pub absent_below_hours: f64,
    /// Non-late sessions shorter than this close as HALF_DAY
    pub full_day_hours: f64,
    /// Radius used for branches that have a center but no radius
    pub default_geofence_radius_meters: f64,
}

impl Default for AttendancePolicy {
    fn default() -> Self {
        Self {
            zone: Utc.fix(),
            min_session_minutes: 15,
            absent_below_hours: 4.0,
            full_day_hours: 8.0,
            default_geofence_radius_meters: 100.0,
        }
    }
}

impl AttendancePolicy {
    /// Final status of a session opened as `opened_as` that lasted `hours`.
    ///
    /// ABSENT wins over everything, a LATE opening is kept otherwise, and only
    /// then does the half-day bucket apply.
    pub fn closing_status(&self, opened_as: AttendanceStatus, hours: f64) -> AttendanceStatus {
        if hours < self.absent_below_hours {
            AttendanceStatus::Absent
        } else if opened_as == AttendanceStatus::Late {
            AttendanceStatus::Late
        } else if hours < self.full_day_hours {
            AttendanceStatus::HalfDay
        } else {
            AttendanceStatus::Present
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::attendance::AttendanceStatus::*;

    #[test]
    fn short_sessions_are_absent_even_when_late() {
        let policy = AttendancePolicy::default();
        assert_eq!(policy.closing_status(Present, 3.5), Absent);
        assert_eq!(policy.closing_status(Late, 2.0), Absent);
    }

    #[test]
    fn hour_buckets_for_on_time_sessions() {
        let policy = AttendancePolicy::default();
        assert_eq!(policy.closing_status(Present, 4.0), HalfDay);
        assert_eq!(policy.closing_status(Present, 7.99), HalfDay);
        assert_eq!(policy.closing_status(Present, 8.0), Present);
        assert_eq!(policy.closing_status(Present, 9.0), Present);
    }

    #[test]
    fn late_is_never_downgraded_to_half_day() {
        let policy = AttendancePolicy::default();
        assert_eq!(policy.closing_status(Late, 5.0), Late);
        assert_eq!(policy.closing_status(Late, 10.0), Late);
    }
}
