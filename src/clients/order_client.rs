use tracing::{debug, info, instrument};

use crate::domain::{Order, OrderCounts, OrderDraft};
use crate::mirror_framework::MirrorClient;
use crate::order_store::OrderError;

/// Client for the order mirror.
#[derive(Clone)]
pub struct OrderClient {
    inner: MirrorClient<Order>,
}

impl_mirror_client!(OrderClient, Order, OrderError, order, orders);

impl OrderClient {
    /// Inserts a new order and returns its `ORD-` id.
    ///
    /// The stored order is always `Paid` and `Preparing`.
    #[instrument(skip(self, draft), fields(items = draft.items.len()))]
    pub async fn add_order(&self, draft: OrderDraft) -> Result<String, OrderError> {
        debug!("Sending request");
        let order = self.inner.create(draft).await.map_err(OrderError::on_insert)?;
        info!(order_id = %order.order_id, total = order.total_amount, "Order placed");
        Ok(order.order_id)
    }

    /// Sum of `total_amount` over paid, non-cancelled orders.
    pub fn get_total_revenue(&self) -> f64 {
        self.inner
            .rows()
            .iter()
            .filter(|order| order.counts_as_revenue())
            .map(|order| order.total_amount)
            .sum()
    }

    pub fn get_orders_count(&self) -> OrderCounts {
        OrderCounts::tally(self.inner.rows().iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CustomerContact, OrderLine, OrderStatus, PaymentStatus, ShippingAddress};
    use crate::ids;
    use crate::mirror_framework::{MirrorActor, MirrorSettings};
    use crate::remote::{MemoryTable, StoreError};
    use chrono::{Duration, Utc};
    use std::sync::Arc;

    fn draft(subtotal: f64, tax: f64) -> OrderDraft {
        OrderDraft {
            customer: CustomerContact::new("Ana", "ana@example.com", "555-0101"),
            shipping: ShippingAddress::new("1 Main St", "Springfield", "12345"),
            items: vec![OrderLine {
                id: "pasta".into(),
                name: "Pasta".into(),
                price: subtotal,
                quantity: 1,
                image: "pasta.jpg".into(),
            }],
            subtotal,
            tax,
        }
    }

    fn stored(id: &str, total: f64, payment: PaymentStatus, status: OrderStatus, age_minutes: i64) -> Order {
        Order {
            order_id: id.into(),
            customer: CustomerContact::new("Bo", "bo@example.com", ""),
            shipping: ShippingAddress::new("2 High St", "Shelbyville", "54321"),
            items: vec![],
            subtotal: total,
            tax: 0.0,
            total_amount: total,
            payment_status: payment,
            order_status: status,
            created_at: Utc::now() - Duration::minutes(age_minutes),
        }
    }

    async fn start(table: Arc<MemoryTable<Order>>) -> OrderClient {
        let (actor, inner) = MirrorActor::<Order>::new(table, ids::order_id, MirrorSettings::default());
        tokio::spawn(actor.run());
        let client = OrderClient::new(inner);
        client.loaded().await.unwrap();
        client
    }

    #[tokio::test]
    async fn test_add_order_fixes_statuses_and_total() {
        let client = start(Arc::new(MemoryTable::new())).await;

        let id = client.add_order(draft(24.0, 2.0)).await.unwrap();

        assert!(ids::is_well_formed(&id, "ORD-", 6), "{id}");
        let order = client.get_order_by_id(&id).unwrap();
        assert_eq!(order.payment_status, PaymentStatus::Paid);
        assert_eq!(order.order_status, OrderStatus::Preparing);
        assert_eq!(order.total_amount, 26.0);
    }

    #[tokio::test]
    async fn test_stored_total_is_rounded_to_cents() {
        let client = start(Arc::new(MemoryTable::new())).await;
        let order = draft(0.1, 0.2);
        let expected = order.total_amount();

        let id = client.add_order(order).await.unwrap();

        assert_eq!(client.get_order_by_id(&id).unwrap().total_amount, 0.3);
        assert_eq!(client.get_total_revenue(), expected);
    }

    #[tokio::test]
    async fn test_add_order_surfaces_insert_error() {
        let table = Arc::new(MemoryTable::new());
        let client = start(table.clone()).await;
        table.fail_next_insert(StoreError::Rejected("permission denied".into())).await;

        let result = client.add_order(draft(10.0, 1.0)).await;

        assert!(matches!(result, Err(OrderError::Insert(_))));
        assert!(client.orders().is_empty());
    }

    #[tokio::test]
    async fn test_update_unknown_order_fails_and_leaves_rows() {
        let table = Arc::new(MemoryTable::with_rows(vec![stored(
            "ORD-AAAAAA",
            10.0,
            PaymentStatus::Paid,
            OrderStatus::Preparing,
            5,
        )]));
        let client = start(table).await;
        let before = client.orders();

        let result = client.update_order_status("ORD-ABC123".into(), OrderStatus::Completed).await;

        assert!(matches!(result, Err(OrderError::Update(_))));
        assert_eq!(client.orders(), before);
    }

    #[tokio::test]
    async fn test_revenue_and_counts() {
        let table = Arc::new(MemoryTable::with_rows(vec![
            stored("ORD-000001", 20.0, PaymentStatus::Paid, OrderStatus::Completed, 30),
            stored("ORD-000002", 15.5, PaymentStatus::Paid, OrderStatus::Preparing, 20),
            stored("ORD-000003", 40.0, PaymentStatus::Paid, OrderStatus::Cancelled, 10),
            stored("ORD-000004", 12.0, PaymentStatus::Refunded, OrderStatus::Completed, 5),
            stored("ORD-000005", 8.0, PaymentStatus::Unpaid, OrderStatus::Pending, 1),
        ]));
        let client = start(table).await;

        assert_eq!(client.get_total_revenue(), 35.5);
        let counts = client.get_orders_count();
        assert_eq!(
            counts,
            OrderCounts { pending: 1, preparing: 1, completed: 2, cancelled: 1, total: 5 }
        );
    }

    #[tokio::test]
    async fn test_revenue_grows_with_paid_orders() {
        let client = start(Arc::new(MemoryTable::new())).await;
        let mut last = client.get_total_revenue();
        for subtotal in [5.0, 12.5, 30.0] {
            client.add_order(draft(subtotal, 0.5)).await.unwrap();
            let revenue = client.get_total_revenue();
            assert!(revenue >= last);
            last = revenue;
        }
        assert_eq!(last, 49.0);
    }

    #[tokio::test]
    async fn test_orders_are_newest_first() {
        let table = Arc::new(MemoryTable::with_rows(vec![
            stored("ORD-OLDEST", 1.0, PaymentStatus::Paid, OrderStatus::Completed, 60),
            stored("ORD-NEWEST", 1.0, PaymentStatus::Paid, OrderStatus::Completed, 1),
        ]));
        let client = start(table).await;

        let ids: Vec<_> = client.orders().iter().map(|o| o.order_id.clone()).collect();
        assert_eq!(ids, vec!["ORD-NEWEST", "ORD-OLDEST"]);
    }
}
