use chrono::{DateTime, Utc};
use serde::Serialize;

/// Default aggregation period for history queries.
pub const DEFAULT_PERIOD: &str = "1d";

/// Parameters for a monitored-object history request.
///
/// Timestamps are milliseconds since the Unix epoch; `0` leaves the bound
/// to the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryQuery {
    pub start_ms: i64,
    pub end_ms: i64,
    pub period: String,
    pub include_events: bool,
}

impl Default for HistoryQuery {
    fn default() -> Self {
        Self {
            start_ms: 0,
            end_ms: 0,
            period: DEFAULT_PERIOD.to_string(),
            include_events: false,
        }
    }
}

impl HistoryQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn between(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start_ms: start.timestamp_millis(),
            end_ms: end.timestamp_millis(),
            ..Self::default()
        }
    }

    pub fn period(mut self, period: impl Into<String>) -> Self {
        self.period = period.into();
        self
    }

    pub fn include_events(mut self, include_events: bool) -> Self {
        self.include_events = include_events;
        self
    }

    pub(crate) fn form(&self) -> HistoryForm<'_> {
        HistoryForm {
            ts_start_date: self.start_ms,
            ts_end_date: self.end_ms,
            period: &self.period,
            include_events: self.include_events,
            js_timestamps: true,
            adjust_to_most_recent: true,
        }
    }
}

/// Wire form of a history request. Millisecond timestamps and snapping to
/// the most recent reading are always requested.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct HistoryForm<'a> {
    ts_start_date: i64,
    ts_end_date: i64,
    period: &'a str,
    include_events: bool,
    js_timestamps: bool,
    adjust_to_most_recent: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_default_query() {
        let query = HistoryQuery::new();
        assert_eq!(query.start_ms, 0);
        assert_eq!(query.end_ms, 0);
        assert_eq!(query.period, "1d");
        assert!(!query.include_events);
    }

    #[test]
    fn test_between_uses_milliseconds() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        let query = HistoryQuery::between(start, end).period("1h").include_events(true);
        assert_eq!(query.start_ms, 1_704_067_200_000);
        assert_eq!(query.end_ms - query.start_ms, 86_400_000);
        assert_eq!(query.period, "1h");
        assert!(query.include_events);
    }

    #[test]
    fn test_form_field_names() {
        let query = HistoryQuery::new();
        let json = serde_json::to_value(query.form()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "tsStartDate": 0,
                "tsEndDate": 0,
                "period": "1d",
                "includeEvents": false,
                "jsTimestamps": true,
                "adjustToMostRecent": true
            })
        );
    }
}
