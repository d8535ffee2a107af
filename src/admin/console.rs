use chrono::NaiveDate;
use tracing::{info, instrument};

use super::AdminAccess;
use crate::clients::{OrderClient, ReservationClient};
use crate::domain::{
    CustomerContact, Order, OrderCounts, OrderStatus, Reservation, ReservationCounts, ReservationStatus,
};
use crate::ids;
use crate::order_store::OrderError;
use crate::reservation_store::ReservationError;

#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    /// Case-insensitive substring of the id, customer name or email.
    pub search: Option<String>,
}

impl OrderFilter {
    pub fn matches(&self, order: &Order) -> bool {
        self.status.map_or(true, |status| order.order_status == status)
            && matches_search(self.search.as_deref(), &order.order_id, &order.customer)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReservationFilter {
    pub status: Option<ReservationStatus>,
    pub date: Option<NaiveDate>,
    pub search: Option<String>,
}

impl ReservationFilter {
    pub fn matches(&self, reservation: &Reservation) -> bool {
        self.status.map_or(true, |status| reservation.status == status)
            && self.date.map_or(true, |date| reservation.date == date)
            && matches_search(self.search.as_deref(), &reservation.reservation_id, &reservation.customer)
    }
}

fn matches_search(search: Option<&str>, id: &str, customer: &CustomerContact) -> bool {
    let needle = match search.map(str::trim) {
        Some(needle) if !needle.is_empty() => needle.to_lowercase(),
        _ => return true,
    };
    [id, customer.name.as_str(), customer.email.as_str()]
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
}

/// Headline numbers for the back office landing page.
#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub revenue: f64,
    pub orders: OrderCounts,
    pub reservations: ReservationCounts,
}

/// Admin list/filter/update screens over both mirrors.
#[derive(Clone)]
pub struct AdminConsole {
    access: AdminAccess,
    orders: OrderClient,
    reservations: ReservationClient,
}

impl AdminConsole {
    pub fn new(access: AdminAccess, orders: OrderClient, reservations: ReservationClient) -> Self {
        Self { access, orders, reservations }
    }

    /// Mirrored orders matching `filter`, newest first.
    pub fn list_orders(&self, filter: &OrderFilter) -> Vec<Order> {
        self.orders.orders().iter().filter(|order| filter.matches(order)).cloned().collect()
    }

    pub fn list_reservations(&self, filter: &ReservationFilter) -> Vec<Reservation> {
        self.reservations
            .reservations()
            .iter()
            .filter(|reservation| filter.matches(reservation))
            .cloned()
            .collect()
    }

    /// Last write wins; concurrent admins are not reconciled.
    #[instrument(skip(self), fields(admin = %self.access.session().user_id))]
    pub async fn set_order_status(&self, order_id: &str, status: OrderStatus) -> Result<Order, OrderError> {
        let order = self.orders.update_order_status(ids::normalize(order_id), status).await?;
        info!(order_id = %order.order_id, %status, "Order status changed");
        Ok(order)
    }

    #[instrument(skip(self), fields(admin = %self.access.session().user_id))]
    pub async fn set_reservation_status(
        &self,
        reservation_id: &str,
        status: ReservationStatus,
    ) -> Result<Reservation, ReservationError> {
        let reservation = self
            .reservations
            .update_reservation_status(ids::normalize(reservation_id), status)
            .await?;
        info!(reservation_id = %reservation.reservation_id, %status, "Reservation status changed");
        Ok(reservation)
    }

    pub fn dashboard(&self) -> Dashboard {
        Dashboard {
            revenue: self.orders.get_total_revenue(),
            orders: self.orders.get_orders_count(),
            reservations: self.reservations.get_reservations_count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{MemoryAuth, Role, Session};
    use crate::admin::AdminGate;
    use crate::domain::{OrderLine, PaymentStatus, ReservationDraft, ShippingAddress};
    use crate::mirror_framework::{MirrorActor, MirrorSettings};
    use crate::remote::MemoryTable;
    use chrono::{Duration, NaiveTime, Utc};
    use std::sync::Arc;

    fn order(id: &str, name: &str, status: OrderStatus, total: f64, age_minutes: i64) -> Order {
        Order {
            order_id: id.into(),
            customer: CustomerContact::new(name, format!("{}@example.com", name.to_lowercase()), ""),
            shipping: ShippingAddress::new("1 Main St", "Springfield", "12345"),
            items: vec![OrderLine { id: "x".into(), name: "X".into(), price: total, quantity: 1, image: String::new() }],
            subtotal: total,
            tax: 0.0,
            total_amount: total,
            payment_status: PaymentStatus::Paid,
            order_status: status,
            created_at: Utc::now() - Duration::minutes(age_minutes),
        }
    }

    async fn console() -> AdminConsole {
        let orders = Arc::new(MemoryTable::with_rows(vec![
            order("ORD-AAA111", "Dana", OrderStatus::Preparing, 30.0, 30),
            order("ORD-BBB222", "Eli", OrderStatus::Completed, 12.0, 20),
            order("ORD-CCC333", "Danielle", OrderStatus::Cancelled, 50.0, 10),
        ]));
        let (order_actor, order_mirror) = MirrorActor::<Order>::new(orders, ids::order_id, MirrorSettings::default());
        tokio::spawn(order_actor.run());
        let (reservation_actor, reservation_mirror) = MirrorActor::<Reservation>::new(
            Arc::new(MemoryTable::<Reservation>::new()),
            ids::reservation_id,
            MirrorSettings::default(),
        );
        tokio::spawn(reservation_actor.run());

        let order_client = OrderClient::new(order_mirror);
        let reservation_client = ReservationClient::new(reservation_mirror);
        order_client.loaded().await.unwrap();
        reservation_client.loaded().await.unwrap();

        let auth = Arc::new(MemoryAuth::new());
        auth.set_role("admin-1", Role::Admin).await;
        auth.sign_in(Session { user_id: "admin-1".into(), email: "admin@example.com".into() }).await;
        let access = AdminGate::new(auth.clone(), auth).authorize().await.unwrap();

        AdminConsole::new(access, order_client, reservation_client)
    }

    fn ids_of(orders: &[Order]) -> Vec<&str> {
        orders.iter().map(|order| order.order_id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_filters_by_status_and_search() {
        let console = console().await;

        let all = console.list_orders(&OrderFilter::default());
        assert_eq!(ids_of(&all), vec!["ORD-CCC333", "ORD-BBB222", "ORD-AAA111"]);

        let dans = console.list_orders(&OrderFilter { status: None, search: Some("DAN".into()) });
        assert_eq!(ids_of(&dans), vec!["ORD-CCC333", "ORD-AAA111"]);

        let cancelled_dans = console.list_orders(&OrderFilter {
            status: Some(OrderStatus::Cancelled),
            search: Some("dan".into()),
        });
        assert_eq!(ids_of(&cancelled_dans), vec!["ORD-CCC333"]);

        let by_id = console.list_orders(&OrderFilter { status: None, search: Some("bbb2".into()) });
        assert_eq!(ids_of(&by_id), vec!["ORD-BBB222"]);
    }

    #[tokio::test]
    async fn test_status_update_moves_revenue() {
        let console = console().await;
        assert_eq!(console.dashboard().revenue, 42.0);

        console.set_order_status("ord-aaa111", OrderStatus::Cancelled).await.unwrap();

        let dashboard = console.dashboard();
        assert_eq!(dashboard.revenue, 12.0);
        assert_eq!(dashboard.orders.cancelled, 2);
        assert_eq!(dashboard.orders.total, 3);
    }

    #[tokio::test]
    async fn test_reservation_filter_by_date() {
        let console = console().await;
        let friday = NaiveDate::from_ymd_opt(2026, 11, 20).unwrap();
        let saturday = NaiveDate::from_ymd_opt(2026, 11, 21).unwrap();
        for (name, date) in [("Fay", friday), ("Gus", saturday)] {
            console
                .reservations
                .add_reservation(ReservationDraft {
                    customer: CustomerContact::new(name, format!("{name}@example.com"), ""),
                    guests: 2,
                    date,
                    time: NaiveTime::from_hms_opt(20, 0, 0).unwrap(),
                    special_request: None,
                })
                .await
                .unwrap();
        }

        let on_friday = console.list_reservations(&ReservationFilter { date: Some(friday), ..Default::default() });
        assert_eq!(on_friday.len(), 1);
        assert_eq!(on_friday[0].customer.name, "Fay");

        let id = on_friday[0].reservation_id.clone();
        console.set_reservation_status(&id, ReservationStatus::Rejected).await.unwrap();
        let rejected = console.list_reservations(&ReservationFilter {
            status: Some(ReservationStatus::Rejected),
            ..Default::default()
        });
        assert_eq!(rejected.len(), 1);
        assert_eq!(console.dashboard().reservations.rejected, 1);
    }
}
