use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Wall-clock format used for visit timestamps
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One redirect occurrence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticsEvent {
    /// Local time of the visit, formatted with [`TIMESTAMP_FORMAT`]
    #[serde(rename = "Timestamp")]
    pub timestamp: String,

    /// Requester address (`ip:port` of the peer, or the forwarded client IP)
    #[serde(rename = "IPAddress")]
    pub ip_address: String,
}

impl AnalyticsEvent {
    /// Create an event stamped with the current local time
    pub fn new(ip_address: impl Into<String>) -> Self {
        Self::at(chrono::Local::now(), ip_address)
    }

    pub fn at<Tz>(time: DateTime<Tz>, ip_address: impl Into<String>) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        Self {
            timestamp: time.format(TIMESTAMP_FORMAT).to_string(),
            ip_address: ip_address.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_event_timestamp_format() {
        let time = Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        let event = AnalyticsEvent::at(time, "10.0.0.1:5555");

        assert_eq!(event.timestamp, "2024-03-09 07:05:01");
        assert_eq!(event.ip_address, "10.0.0.1:5555");
    }

    #[test]
    fn test_event_wire_field_names() {
        let time = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let event = AnalyticsEvent::at(time, "127.0.0.1:1");

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["Timestamp"], "2024-01-01 00:00:00");
        assert_eq!(json["IPAddress"], "127.0.0.1:1");
        assert_eq!(json.as_object().unwrap().len(), 2);
    }
}
