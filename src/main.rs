use chrono::{Duration as ChronoDuration, Utc};
use tokio::time::Instant;
use tracing::{error, info, Instrument};

use restaurant_state::admin::OrderFilter;
use restaurant_state::app_system::{setup_tracing, Config, MemoryBackend, RestaurantSystem};
use restaurant_state::auth::{Role, Session};
use restaurant_state::checkout::CheckoutDetails;
use restaurant_state::domain::{CustomerContact, MenuItem, OrderStatus, ReservationDraft, ShippingAddress};
use restaurant_state::lookup::{id_from_query, lookup_order, lookup_reservation, LookupOutcome};
use restaurant_state::route_loader::LoaderKind;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    setup_tracing();

    info!("Starting restaurant demo");

    let backend = MemoryBackend::new();
    let system = RestaurantSystem::new(Config::from_env(), backend.backend());
    system.order_client.loaded().await?;
    system.reservation_client.loaded().await?;

    let mut loader = system.route_loader();
    loader.begin_session(Instant::now());
    loader.tick(Instant::now() + system.config().loader.splash);

    // Browse the menu and fill the cart
    if let Some(kind) = loader.navigate("/menu", Instant::now()) {
        info!(?kind, "Route loader visible");
        loader.hold().await;
        loader.route_changed();
    }
    let mut cart = system.open_cart();
    let pasta = MenuItem::new("truffle-pasta", "Truffle Pasta", 24.0, "/img/pasta.jpg", "Mains");
    let tiramisu = MenuItem::new("tiramisu", "Tiramisu", 9.5, "/img/tiramisu.jpg", "Desserts");
    cart.add_item(&pasta);
    cart.add_item(&pasta);
    cart.add_item(&tiramisu);
    info!(items = cart.total_items(), total = cart.total_price(), "Cart ready");

    // Checkout
    loader.signal(LoaderKind::Checkout, Instant::now());
    let details = CheckoutDetails {
        customer: CustomerContact::new("Alice", "alice@example.com", "555-0100"),
        shipping: ShippingAddress::new("12 Harbour Road", "Portsmouth", "PO1 2AB"),
    };
    let confirmation = system
        .checkout
        .place_order(&mut cart, details)
        .instrument(tracing::info_span!("checkout"))
        .await?;
    loader.route_changed();
    info!(order_id = %confirmation.order_id, total = confirmation.total, "Order confirmed");

    // Book a table
    let reservation_id = system
        .reservation_client
        .add_reservation(ReservationDraft {
            customer: CustomerContact::new("Alice", "alice@example.com", "555-0100"),
            guests: 4,
            date: (Utc::now() + ChronoDuration::days(3)).date_naive(),
            time: chrono::NaiveTime::from_hms_opt(19, 30, 0).ok_or("invalid time")?,
            special_request: Some("Birthday dessert".to_string()),
        })
        .instrument(tracing::info_span!("reservation"))
        .await?;

    // Track both, the way a shared link would
    let query = format!("?id={}", confirmation.order_id.to_lowercase());
    if let Some(id) = id_from_query(&query) {
        report("order", &lookup_order(&system.order_client, &id));
    }
    report("reservation", &lookup_reservation(&system.reservation_client, &reservation_id));

    // Back office
    backend.auth.set_role("staff-1", Role::Admin).await;
    backend
        .auth
        .sign_in(Session { user_id: "staff-1".to_string(), email: "chef@example.com".to_string() })
        .await;
    match system.admin_console().await {
        Ok(console) => {
            console.set_order_status(&confirmation.order_id, OrderStatus::Completed).await?;
            let preparing = console.list_orders(&OrderFilter { status: Some(OrderStatus::Preparing), search: None });
            let dashboard = console.dashboard();
            info!(
                revenue = dashboard.revenue,
                orders = dashboard.orders.total,
                completed = dashboard.orders.completed,
                still_preparing = preparing.len(),
                reservations = dashboard.reservations.total,
                "Dashboard"
            );
        }
        Err(e) => error!(error = %e, "Admin console unavailable"),
    }
    report("order", &lookup_order(&system.order_client, &confirmation.order_id));

    system.shutdown().await?;
    info!("Demo completed successfully");
    Ok(())
}

fn report<R>(what: &str, outcome: &LookupOutcome<R>) {
    let presentation = outcome.presentation();
    match outcome {
        LookupOutcome::Found { .. } => info!(what, headline = presentation.headline, "Status lookup"),
        LookupOutcome::NotFound { query, .. } => info!(what, %query, "Status lookup: not found"),
    }
}
