use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Booking {
    pub id: i64,
    pub customer_name: String,
    pub customer_phone: String,
    #[serde(default)]
    pub customer_email: Option<String>,
    pub event_type: String,
    pub event_date: NaiveDate,
    #[serde(default)]
    pub guest_count: Option<u32>,
    #[serde(default)]
    pub package_type: Option<String>,
    #[serde(default)]
    pub special_requests: Option<String>,
    #[serde(default)]
    pub status: BookingStatus,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub created_at: NaiveDateTime,
    #[serde(default, deserialize_with = "timestamp::deserialize_opt")]
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase", from = "serde_json::Value")]
pub enum BookingStatus {
    #[default]
    Pending,
    Confirmed,
    Cancelled,
    Rejected,
}

impl BookingStatus {
    pub const ALL: [BookingStatus; 4] = [
        BookingStatus::Pending,
        BookingStatus::Confirmed,
        BookingStatus::Cancelled,
        BookingStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Rejected => "rejected",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "Pending",
            BookingStatus::Confirmed => "Confirmed",
            BookingStatus::Cancelled => "Cancelled",
            BookingStatus::Rejected => "Rejected",
        }
    }

    /// Lenient parse for values coming from the booking service.
    /// Anything unrecognised is shown as pending.
    pub fn parse(s: &str) -> Self {
        Self::try_parse(s).unwrap_or(BookingStatus::Pending)
    }

    /// Strict parse for operator input.
    pub fn try_parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(BookingStatus::Pending),
            "confirmed" => Some(BookingStatus::Confirmed),
            "cancelled" => Some(BookingStatus::Cancelled),
            "rejected" => Some(BookingStatus::Rejected),
            _ => None,
        }
    }

    pub fn allowed_transitions(&self) -> &'static [BookingStatus] {
        match self {
            BookingStatus::Pending => &[BookingStatus::Confirmed, BookingStatus::Rejected],
            BookingStatus::Confirmed => &[BookingStatus::Cancelled],
            BookingStatus::Cancelled | BookingStatus::Rejected => &[],
        }
    }

    pub fn can_transition_to(&self, target: BookingStatus) -> bool {
        self.allowed_transitions().contains(&target)
    }

    pub fn is_terminal(&self) -> bool {
        self.allowed_transitions().is_empty()
    }
}

// Any non-string value (null, numbers, objects) is shown as pending.
impl From<serde_json::Value> for BookingStatus {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(s) => BookingStatus::parse(&s),
            _ => BookingStatus::Pending,
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `None` lists every booking.
pub type StatusFilter = Option<BookingStatus>;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookingPage {
    #[serde(default)]
    pub bookings: Vec<Booking>,
    #[serde(default)]
    pub total: u64,
}

/// Controls the console offers for a booking.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConsoleAction {
    Confirm,
    Reject,
    Cancel,
    Delete,
}

impl ConsoleAction {
    pub fn for_status(status: BookingStatus) -> Vec<ConsoleAction> {
        let mut actions: Vec<ConsoleAction> = status
            .allowed_transitions()
            .iter()
            .filter_map(|target| ConsoleAction::for_target(*target))
            .collect();
        actions.push(ConsoleAction::Delete);
        actions
    }

    pub fn for_target(target: BookingStatus) -> Option<ConsoleAction> {
        match target {
            BookingStatus::Confirmed => Some(ConsoleAction::Confirm),
            BookingStatus::Rejected => Some(ConsoleAction::Reject),
            BookingStatus::Cancelled => Some(ConsoleAction::Cancel),
            BookingStatus::Pending => None,
        }
    }

    pub fn target(&self) -> Option<BookingStatus> {
        match self {
            ConsoleAction::Confirm => Some(BookingStatus::Confirmed),
            ConsoleAction::Reject => Some(BookingStatus::Rejected),
            ConsoleAction::Cancel => Some(BookingStatus::Cancelled),
            ConsoleAction::Delete => None,
        }
    }
}

mod timestamp {
    use chrono::{DateTime, NaiveDateTime};
    use serde::{Deserialize, Deserializer};

    const FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"];

    pub fn parse(s: &str) -> Option<NaiveDateTime> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(dt.naive_utc());
        }
        FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}")))
    }

    pub fn deserialize_opt<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            Some(raw) => parse(&raw)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}"))),
            None => Ok(None),
        }
    }
}
