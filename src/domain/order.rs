use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{CartLine, CustomerContact, ShippingAddress};

/// Raised when a status string from a filter box or URL matches no variant.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("Unknown status: {0}")]
pub struct UnknownStatus(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentStatus {
    Paid,
    Unpaid,
    Refunded,
}

/// Kitchen-side lifecycle of an order. Cancellation is a status, never a delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    Pending,
    Preparing,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 4] = [
        OrderStatus::Pending,
        OrderStatus::Preparing,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Preparing => "Preparing",
            OrderStatus::Completed => "Completed",
            OrderStatus::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PaymentStatus::Paid => "Paid",
            PaymentStatus::Unpaid => "Unpaid",
            PaymentStatus::Refunded => "Refunded",
        };
        f.write_str(label)
    }
}

/// A purchased line, frozen at checkout time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub quantity: u32,
    pub image: String,
}

impl From<&CartLine> for OrderLine {
    fn from(line: &CartLine) -> Self {
        Self {
            id: line.item_id.clone(),
            name: line.name.clone(),
            price: line.unit_price,
            quantity: line.quantity,
            image: line.image_ref.clone(),
        }
    }
}

/// A placed order as stored in the `orders` table.
///
/// `total_amount` is fixed at creation as `subtotal + tax` and never
/// recomputed afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: String,
    #[serde(flatten)]
    pub customer: CustomerContact,
    #[serde(flatten)]
    pub shipping: ShippingAddress,
    pub items: Vec<OrderLine>,
    pub subtotal: f64,
    pub tax: f64,
    pub total_amount: f64,
    pub payment_status: PaymentStatus,
    pub order_status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Paid and not cancelled: the orders that count towards revenue.
    pub fn counts_as_revenue(&self) -> bool {
        self.payment_status == PaymentStatus::Paid && self.order_status != OrderStatus::Cancelled
    }
}

/// Payload for creating a new order.
#[derive(Debug, Clone)]
pub struct OrderDraft {
    pub customer: CustomerContact,
    pub shipping: ShippingAddress,
    pub items: Vec<OrderLine>,
    pub subtotal: f64,
    pub tax: f64,
}

impl OrderDraft {
    /// Subtotal plus tax, rounded to cents. This is the stored `total_amount`.
    pub fn total_amount(&self) -> f64 {
        round_cents(self.subtotal + self.tax)
    }
}

/// Rounds a currency amount to whole cents.
pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Order totals broken down by status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrderCounts {
    pub pending: usize,
    pub preparing: usize,
    pub completed: usize,
    pub cancelled: usize,
    pub total: usize,
}

impl OrderCounts {
    pub fn tally<'a>(orders: impl IntoIterator<Item = &'a Order>) -> Self {
        let mut counts = Self::default();
        for order in orders {
            match order.order_status {
                OrderStatus::Pending => counts.pending += 1,
                OrderStatus::Preparing => counts.preparing += 1,
                OrderStatus::Completed => counts.completed += 1,
                OrderStatus::Cancelled => counts.cancelled += 1,
            }
            counts.total += 1;
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!("completed".parse::<OrderStatus>(), Ok(OrderStatus::Completed));
        assert_eq!(" Preparing ".parse::<OrderStatus>(), Ok(OrderStatus::Preparing));
        assert!("shipped".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn draft_total_is_rounded_to_cents() {
        let draft = OrderDraft {
            customer: CustomerContact::new("Ana", "ana@example.com", ""),
            shipping: ShippingAddress::new("1 Main St", "Springfield", "12345"),
            items: vec![],
            subtotal: 0.1,
            tax: 0.2,
        };
        assert_eq!(draft.total_amount(), 0.3);
        assert_eq!(round_cents(51.835_000_1), 51.84);
    }

    #[test]
    fn order_serializes_with_flat_snake_case_fields() {
        let order = Order {
            order_id: "ORD-ABC123".to_string(),
            customer: CustomerContact::new("Ana", "ana@example.com", "555-0101"),
            shipping: ShippingAddress::new("1 Main St", "Springfield", "12345"),
            items: vec![],
            subtotal: 10.0,
            tax: 0.8,
            total_amount: 10.8,
            payment_status: PaymentStatus::Paid,
            order_status: OrderStatus::Preparing,
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["order_id"], "ORD-ABC123");
        assert_eq!(json["customer_name"], "Ana");
        assert_eq!(json["postal_code"], "12345");
        assert_eq!(json["order_status"], "Preparing");
        assert_eq!(json["payment_status"], "Paid");
    }
}
