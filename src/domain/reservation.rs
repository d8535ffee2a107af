use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use super::{CustomerContact, UnknownStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    Waiting,
    Rejected,
}

impl ReservationStatus {
    pub const ALL: [ReservationStatus; 4] = [
        ReservationStatus::Pending,
        ReservationStatus::Confirmed,
        ReservationStatus::Waiting,
        ReservationStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Pending => "Pending",
            ReservationStatus::Confirmed => "Confirmed",
            ReservationStatus::Waiting => "Waiting",
            ReservationStatus::Rejected => "Rejected",
        }
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReservationStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ReservationStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

/// A table booking as stored in the `reservations` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reservation {
    pub reservation_id: String,
    #[serde(flatten)]
    pub customer: CustomerContact,
    pub guests: u32,
    pub date: NaiveDate,
    pub time: NaiveTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_request: Option<String>,
    pub status: ReservationStatus,
    pub created_at: DateTime<Utc>,
}

/// Payload for creating a new reservation.
#[derive(Debug, Clone)]
pub struct ReservationDraft {
    pub customer: CustomerContact,
    pub guests: u32,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub special_request: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReservationCounts {
    pub pending: usize,
    pub confirmed: usize,
    pub waiting: usize,
    pub rejected: usize,
    pub total: usize,
}

impl ReservationCounts {
    pub fn tally<'a>(reservations: impl IntoIterator<Item = &'a Reservation>) -> Self {
        let mut counts = Self::default();
        for reservation in reservations {
            match reservation.status {
                ReservationStatus::Pending => counts.pending += 1,
                ReservationStatus::Confirmed => counts.confirmed += 1,
                ReservationStatus::Waiting => counts.waiting += 1,
                ReservationStatus::Rejected => counts.rejected += 1,
            }
            counts.total += 1;
        }
        counts
    }
}
