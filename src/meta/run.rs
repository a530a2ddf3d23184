use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};

use crate::io::SourceKind;

/// The clock a vendor family records its run start time against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StartTimeConvention {
    /// The instrument computer's local wall clock
    LocalTime,
    Utc,
}

/// A run start time as reported by the source, together with the clock
/// convention of its vendor family. No conversion is applied.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunStartTime {
    pub timestamp: NaiveDateTime,
    /// The UTC offset in seconds, when the vendor string carried one
    pub utc_offset_seconds: Option<i32>,
    pub convention: StartTimeConvention,
}

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %I:%M:%S %p",
];

impl RunStartTime {
    /// Parse a vendor start time string. Strings with an explicit offset are
    /// parsed as RFC 3339, others against a small set of naive layouts.
    pub fn parse(text: &str, convention: StartTimeConvention) -> Option<Self> {
        let text = text.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
            return Some(Self {
                timestamp: dt.naive_local(),
                utc_offset_seconds: Some(dt.offset().local_minus_utc()),
                convention,
            });
        }
        for fmt in NAIVE_FORMATS {
            if let Ok(timestamp) = NaiveDateTime::parse_from_str(text, fmt) {
                return Some(Self {
                    timestamp,
                    utc_offset_seconds: None,
                    convention,
                });
            }
        }
        log::debug!("Could not parse run start time {text:?}");
        None
    }

    pub fn offset(&self) -> Option<FixedOffset> {
        self.utc_offset_seconds.and_then(FixedOffset::east_opt)
    }

    /// Interpret the timestamp under its own convention, using `local_offset`
    /// for local-time stamps that carry no offset of their own.
    pub fn to_utc(&self, local_offset: FixedOffset) -> Option<DateTime<Utc>> {
        match (self.offset(), self.convention) {
            (Some(offset), _) => offset
                .from_local_datetime(&self.timestamp)
                .single()
                .map(|dt| dt.with_timezone(&Utc)),
            (None, StartTimeConvention::Utc) => Some(Utc.from_utc_datetime(&self.timestamp)),
            (None, StartTimeConvention::LocalTime) => local_offset
                .from_local_datetime(&self.timestamp)
                .single()
                .map(|dt| dt.with_timezone(&Utc)),
        }
    }
}

/// Metadata describing the run that does not belong to any single spectrum
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MassSpectrometryRun {
    pub source_kind: Option<SourceKind>,
    pub start_time: Option<RunStartTime>,
    pub default_instrument_id: Option<u32>,
}

impl MassSpectrometryRun {
    pub fn new(
        source_kind: Option<SourceKind>,
        start_time: Option<RunStartTime>,
        default_instrument_id: Option<u32>,
    ) -> Self {
        Self {
            source_kind,
            start_time,
            default_instrument_id,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_parse_start_time() {
        let t = RunStartTime::parse("2011-03-04T18:31:52Z", StartTimeConvention::LocalTime).unwrap();
        assert_eq!(t.timestamp.year(), 2011);
        assert_eq!(t.timestamp.hour(), 18);
        assert_eq!(t.offset(), Some(FixedOffset::east_opt(0).unwrap()));

        let t = RunStartTime::parse("3/4/2011 6:31:52 PM", StartTimeConvention::Utc).unwrap();
        assert_eq!(t.timestamp.hour(), 18);
        assert_eq!(t.offset(), None);
        assert_eq!(t.convention, StartTimeConvention::Utc);

        assert!(RunStartTime::parse("yesterday", StartTimeConvention::Utc).is_none());
    }

    #[test]
    fn test_conventions_are_not_converted_implicitly() {
        let text = "2020-01-02 10:00:00";
        let local = RunStartTime::parse(text, StartTimeConvention::LocalTime).unwrap();
        let utc = RunStartTime::parse(text, StartTimeConvention::Utc).unwrap();
        assert_eq!(local.timestamp, utc.timestamp);

        let pacific = FixedOffset::west_opt(8 * 3600).unwrap();
        assert_eq!(local.to_utc(pacific).unwrap().hour(), 18);
        assert_eq!(utc.to_utc(pacific).unwrap().hour(), 10);
    }
}
