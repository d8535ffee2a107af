use chrono::{DateTime, Utc};

use crate::domain::{Reservation, ReservationDraft, ReservationStatus};
use crate::mirror_framework::Record;

impl Record for Reservation {
    type Status = ReservationStatus;
    type Draft = ReservationDraft;

    const TABLE: &'static str = "reservations";

    fn id(&self) -> &str {
        &self.reservation_id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn set_created_at(&mut self, at: DateTime<Utc>) {
        self.created_at = at;
    }

    fn set_status(&mut self, status: ReservationStatus) {
        self.status = status;
    }

    /// Builds the reservation row with status `Pending`.
    ///
    /// # Errors
    /// Rejects a booking with no guests, or without a name or email.
    fn from_draft(id: String, draft: ReservationDraft) -> Result<Self, String> {
        if draft.guests == 0 {
            return Err("guests must be at least 1".to_string());
        }
        if draft.customer.name.trim().is_empty() {
            return Err("customer name is required".to_string());
        }
        if draft.customer.email.trim().is_empty() {
            return Err("customer email is required".to_string());
        }
        let special_request = draft
            .special_request
            .map(|request| request.trim().to_string())
            .filter(|request| !request.is_empty());
        Ok(Self {
            reservation_id: id,
            customer: draft.customer,
            guests: draft.guests,
            date: draft.date,
            time: draft.time,
            special_request,
            status: ReservationStatus::Pending,
            created_at: Utc::now(),
        })
    }
}
