use chrono::{DateTime, Duration, FixedOffset, Utc};

use crate::model::attendance::ShiftDescriptor;

/// Whether `now` is strictly after the shift start plus grace period.
///
/// The shift start is taken on the calendar date of `now` as seen in `zone`.
pub fn is_late(now: DateTime<Utc>, shift: &ShiftDescriptor, zone: FixedOffset) -> bool {
    let local = now.with_timezone(&zone).naive_local();
    let threshold = local.date().and_time(shift.start_time)
        + Duration::minutes(i64::from(shift.grace_period_mins));

    local > threshold
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveTime, TimeZone};

    fn nine_am_shift(grace: u32) -> ShiftDescriptor {
        ShiftDescriptor {
            id: 1,
            start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            grace_period_mins: grace,
        }
    }

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    #[test]
    fn within_grace_is_on_time() {
        let now = Utc.with_ymd_and_hms(2026, 1, 5, 9, 10, 0).unwrap();
        assert!(!is_late(now, &nine_am_shift(15), utc()));
    }

    #[test]
    fn past_grace_is_late() {
        let now = Utc.with_ymd_and_hms(2026, 1, 5, 9, 20, 0).unwrap();
        assert!(is_late(now, &nine_am_shift(15), utc()));
    }

    #[test]
    fn exactly_at_threshold_is_on_time() {
        let now = Utc.with_ymd_and_hms(2026, 1, 5, 9, 15, 0).unwrap();
        assert!(!is_late(now, &nine_am_shift(15), utc()));
    }

    #[test]
    fn uses_reference_zone_for_time_of_day() {
        // 03:20 UTC is 09:20 at UTC+6
        let now = Utc.with_ymd_and_hms(2026, 1, 5, 3, 20, 0).unwrap();
        let dhaka = FixedOffset::east_opt(6 * 3600).unwrap();
        assert!(is_late(now, &nine_am_shift(15), dhaka));
        assert!(!is_late(now, &nine_am_shift(15), utc()));
    }
}
