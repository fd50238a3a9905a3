//! Calendar-day bucketing for repetition counts.
//!
//! Counts are stored per local calendar day, but everything upstream of
//! storage works in UTC instants. [`DayBucketer`] is the single place
//! where an instant is turned into a day key.

use chrono::{DateTime, FixedOffset, Local, NaiveDate, Offset, Utc};
use serde::{Deserialize, Serialize};

/// One calendar day's repetition count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayRecord {
    pub day: NaiveDate,
    pub count: u32,
}

/// Maps UTC instants to calendar days using a UTC offset captured once,
/// at construction.
///
/// The offset is deliberately frozen rather than re-resolved per call:
/// every instant seen by one bucketer lands in a day consistently, even
/// if the process straddles a DST transition. A given instant may still
/// bucket to a different day under a bucketer built after the system
/// timezone changes; counts already stored under the old day keys are
/// left as recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayBucketer {
    offset: FixedOffset,
}

impl DayBucketer {
    /// Creates a bucketer with an explicit UTC offset.
    pub const fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// Creates a bucketer from the system timezone's current offset.
    pub fn local() -> Self {
        Self::new(*Local::now().offset())
    }

    /// Creates a bucketer that keys days by UTC.
    pub fn utc() -> Self {
        Self::new(Utc.fix())
    }

    /// The offset this bucketer was built with.
    pub const fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// The calendar day `instant` falls on.
    pub fn day_of(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.offset).date_naive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn instant(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, h, m, 0).unwrap()
    }

    #[test]
    fn utc_bucketer_uses_utc_date() {
        let bucketer = DayBucketer::utc();
        assert_eq!(
            bucketer.day_of(instant(23, 59)),
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
        );
    }

    #[test]
    fn positive_offset_rolls_late_evening_into_next_day() {
        // UTC+05:30: 2025-06-01T20:00Z is 01:30 local on June 2.
        let bucketer = DayBucketer::new(FixedOffset::east_opt(5 * 3600 + 1800).unwrap());
        assert_eq!(
            bucketer.day_of(instant(20, 0)),
            NaiveDate::from_ymd_opt(2025, 6, 2).unwrap()
        );
    }

    #[test]
    fn negative_offset_rolls_early_morning_into_previous_day() {
        // UTC-07:00: 2025-06-01T03:00Z is 20:00 local on May 31.
        let bucketer = DayBucketer::new(FixedOffset::west_opt(7 * 3600).unwrap());
        assert_eq!(
            bucketer.day_of(instant(3, 0)),
            NaiveDate::from_ymd_opt(2025, 5, 31).unwrap()
        );
    }

    #[test]
    fn same_instant_buckets_differently_across_offsets() {
        let east = DayBucketer::new(FixedOffset::east_opt(10 * 3600).unwrap());
        let west = DayBucketer::new(FixedOffset::west_opt(10 * 3600).unwrap());
        let at = instant(12, 0);
        assert_ne!(east.day_of(at), west.day_of(at));
    }

    #[test]
    fn offset_is_frozen_at_construction() {
        let bucketer = DayBucketer::new(FixedOffset::east_opt(3600).unwrap());
        let copy = bucketer;
        assert_eq!(bucketer.offset(), copy.offset());
        assert_eq!(bucketer.day_of(instant(0, 0)), copy.day_of(instant(0, 0)));
    }

    #[test]
    fn day_record_serializes_with_iso_date() {
        let record = DayRecord {
            day: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            count: 42,
        };
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"day":"2025-06-01","count":42}"#);
    }
}
