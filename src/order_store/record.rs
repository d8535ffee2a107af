use chrono::{DateTime, Utc};

use crate::domain::{Order, OrderDraft, OrderStatus, PaymentStatus};
use crate::mirror_framework::Record;

impl Record for Order {
    type Status = OrderStatus;
    type Draft = OrderDraft;

    const TABLE: &'static str = "orders";

    fn id(&self) -> &str {
        &self.order_id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn set_created_at(&mut self, at: DateTime<Utc>) {
        self.created_at = at;
    }

    fn set_status(&mut self, status: OrderStatus) {
        self.order_status = status;
    }

    /// Builds the order row.
    ///
    /// Checkout is the payment step, so every new order is `Paid` and goes
    /// straight to `Preparing`. The total is fixed here as subtotal plus tax,
    /// rounded to cents.
    fn from_draft(id: String, draft: OrderDraft) -> Result<Self, String> {
        if draft.items.is_empty() {
            return Err("order has no items".to_string());
        }
        let total_amount = draft.total_amount();
        Ok(Self {
            order_id: id,
            customer: draft.customer,
            shipping: draft.shipping,
            items: draft.items,
            subtotal: draft.subtotal,
            tax: draft.tax,
            total_amount,
            payment_status: PaymentStatus::Paid,
            order_status: OrderStatus::Preparing,
            created_at: Utc::now(),
        })
    }
}
