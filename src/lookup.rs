//! Public "track my order / reservation" lookups.
//!
//! Input is trimmed and uppercased, then matched exactly against the mirrored
//! rows. Each status has a fixed presentation; an unknown id gets its own
//! not-found presentation rather than an error.

use tracing::{debug, instrument};

use crate::clients::{OrderClient, ReservationClient};
use crate::domain::{Order, OrderStatus, Reservation, ReservationStatus};
use crate::ids;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Neutral,
    Progress,
    Success,
    Warning,
    Danger,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusPresentation {
    pub headline: &'static str,
    pub detail: &'static str,
    pub tone: Tone,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LookupOutcome<R> {
    Found {
        record: R,
        presentation: StatusPresentation,
    },
    /// `query` is the normalised identifier that matched nothing.
    NotFound {
        query: String,
        presentation: StatusPresentation,
    },
}

impl<R> LookupOutcome<R> {
    pub fn presentation(&self) -> StatusPresentation {
        match self {
            LookupOutcome::Found { presentation, .. } | LookupOutcome::NotFound { presentation, .. } => *presentation,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, LookupOutcome::Found { .. })
    }
}

pub const NOT_FOUND: StatusPresentation = StatusPresentation {
    headline: "Not found",
    detail: "We couldn't find anything with that code. Check it and try again.",
    tone: Tone::Neutral,
};

pub fn order_presentation(status: OrderStatus) -> StatusPresentation {
    match status {
        OrderStatus::Pending => StatusPresentation {
            headline: "Order received",
            detail: "Your order is waiting to be picked up by the kitchen.",
            tone: Tone::Neutral,
        },
        OrderStatus::Preparing => StatusPresentation {
            headline: "Preparing",
            detail: "Our chefs are preparing your order.",
            tone: Tone::Progress,
        },
        OrderStatus::Completed => StatusPresentation {
            headline: "Completed",
            detail: "Your order is ready. Enjoy your meal!",
            tone: Tone::Success,
        },
        OrderStatus::Cancelled => StatusPresentation {
            headline: "Cancelled",
            detail: "This order was cancelled. Contact us if this is unexpected.",
            tone: Tone::Danger,
        },
    }
}

pub fn reservation_presentation(status: ReservationStatus) -> StatusPresentation {
    match status {
        ReservationStatus::Pending => StatusPresentation {
            headline: "Awaiting confirmation",
            detail: "We have your request and will confirm it shortly.",
            tone: Tone::Neutral,
        },
        ReservationStatus::Confirmed => StatusPresentation {
            headline: "Confirmed",
            detail: "Your table is booked. We look forward to seeing you.",
            tone: Tone::Success,
        },
        ReservationStatus::Waiting => StatusPresentation {
            headline: "On the waiting list",
            detail: "We're fully booked right now; we'll let you know if a table opens up.",
            tone: Tone::Warning,
        },
        ReservationStatus::Rejected => StatusPresentation {
            headline: "Not available",
            detail: "We couldn't accommodate this booking. Please try another time.",
            tone: Tone::Danger,
        },
    }
}

#[instrument(skip(orders))]
pub fn lookup_order(orders: &OrderClient, raw_id: &str) -> LookupOutcome<Order> {
    let query = ids::normalize(raw_id);
    let found = if query.is_empty() { None } else { orders.get_order_by_id(&query) };
    match found {
        Some(order) => LookupOutcome::Found {
            presentation: order_presentation(order.order_status),
            record: order,
        },
        None => {
            debug!(%query, "No order with this id");
            LookupOutcome::NotFound { query, presentation: NOT_FOUND }
        }
    }
}

#[instrument(skip(reservations))]
pub fn lookup_reservation(reservations: &ReservationClient, raw_id: &str) -> LookupOutcome<Reservation> {
    let query = ids::normalize(raw_id);
    let found = if query.is_empty() { None } else { reservations.get_reservation_by_id(&query) };
    match found {
        Some(reservation) => LookupOutcome::Found {
            presentation: reservation_presentation(reservation.status),
            record: reservation,
        },
        None => {
            debug!(%query, "No reservation with this id");
            LookupOutcome::NotFound { query, presentation: NOT_FOUND }
        }
    }
}

/// Pulls the `id` parameter out of a query string such as `?id=ORD-ABC123`.
/// The value is form-decoded, so `%XX` escapes and `+` are resolved.
pub fn id_from_query(query: &str) -> Option<String> {
    let pairs: Vec<(String, String)> = match serde_urlencoded::from_str(query.trim_start_matches('?')) {
        Ok(pairs) => pairs,
        Err(e) => {
            debug!(error = %e, "Unreadable query string");
            return None;
        }
    };
    pairs
        .into_iter()
        .find(|(key, _)| key == "id")
        .map(|(_, value)| value)
        .filter(|value| !value.trim().is_empty())
}
