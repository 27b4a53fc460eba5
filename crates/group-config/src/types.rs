//! Per-group digest configuration record.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// Daily time range during which scheduled digests are suppressed.
///
/// The window may wrap past midnight (`22:00`–`07:00`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuietWindow {
    #[serde(with = "hh_mm")]
    pub start: NaiveTime,
    #[serde(with = "hh_mm")]
    pub end: NaiveTime,
}

impl QuietWindow {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    /// Whether the given time falls inside the window.
    pub fn contains(&self, time: NaiveTime) -> bool {
        if self.start <= self.end {
            time >= self.start && time < self.end
        } else {
            // Wraps past midnight
            time >= self.start || time < self.end
        }
    }
}

/// Digest settings of one group. Always written as a whole record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupConfig {
    pub enabled: bool,
    pub interval_hours: u32,
    pub quiet: QuietWindow,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub delete_after_minutes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub prompt: Option<String>,
}

impl Default for GroupConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_hours: 12,
            quiet: QuietWindow::new(
                NaiveTime::from_hms_opt(23, 0, 0).expect("valid time"),
                NaiveTime::from_hms_opt(7, 0, 0).expect("valid time"),
            ),
            delete_after_minutes: None,
            prompt: None,
        }
    }
}

/// Serialize `NaiveTime` as `"HH:MM"`.
mod hh_mm {
    use chrono::NaiveTime;
    use serde::{self, Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let s = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&s, FORMAT).map_err(serde::de::Error::custom)
    }
}
