//! Turns the cart into an order.
//!
//! There is no payment provider: the payment step is a fixed delay, after
//! which the order is written as paid. The order id doubles as the
//! confirmation code shown to the customer.

use std::time::Duration;

use thiserror::Error;
use tracing::{error, info, instrument};

use crate::cart::CartStore;
use crate::clients::OrderClient;
use crate::domain::{round_cents, CustomerContact, OrderDraft, OrderLine, ShippingAddress};
use crate::order_store::OrderError;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CheckoutError {
    #[error("Cart is empty")]
    EmptyCart,
    #[error("Checkout validation error: {0}")]
    Validation(String),
    #[error(transparent)]
    Order(#[from] OrderError),
}

#[derive(Debug, Clone)]
pub struct CheckoutDetails {
    pub customer: CustomerContact,
    pub shipping: ShippingAddress,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutConfirmation {
    pub order_id: String,
    pub item_count: u32,
    pub subtotal: f64,
    pub tax: f64,
    pub total: f64,
}

#[derive(Clone)]
pub struct Checkout {
    orders: OrderClient,
    tax_rate: f64,
    payment_delay: Duration,
}

impl Checkout {
    pub fn new(orders: OrderClient, tax_rate: f64, payment_delay: Duration) -> Self {
        Self { orders, tax_rate, payment_delay }
    }

    /// Tax on `subtotal`, rounded to cents.
    pub fn tax_for(&self, subtotal: f64) -> f64 {
        round_cents(subtotal * self.tax_rate)
    }

    /// Places an order for everything in `cart`.
    ///
    /// The cart is cleared only once the order is stored; on any error it is
    /// left as it was.
    #[instrument(skip(self, cart, details), fields(lines = cart.lines().len()))]
    pub async fn place_order(
        &self,
        cart: &mut CartStore,
        details: CheckoutDetails,
    ) -> Result<CheckoutConfirmation, CheckoutError> {
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        validate(&details)?;

        let subtotal = round_cents(cart.total_price());
        let tax = self.tax_for(subtotal);
        let item_count = cart.total_items();
        let draft = OrderDraft {
            customer: details.customer,
            shipping: details.shipping,
            items: cart.lines().iter().map(OrderLine::from).collect(),
            subtotal,
            tax,
        };
        let total = draft.total_amount();

        info!(subtotal, tax, "Processing payment");
        tokio::time::sleep(self.payment_delay).await;

        let order_id = self.orders.add_order(draft).await.map_err(|e| {
            error!(error = %e, "Order could not be stored; cart kept");
            e
        })?;

        cart.clear_cart();
        info!(%order_id, "Checkout complete");
        Ok(CheckoutConfirmation {
            order_id,
            item_count,
            subtotal,
            tax,
            total,
        })
    }
}

fn validate(details: &CheckoutDetails) -> Result<(), CheckoutError> {
    let required = [
        ("name", &details.customer.name),
        ("email", &details.customer.email),
        ("address", &details.shipping.address),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(CheckoutError::Validation(format!("{field} is required")));
        }
    }
    if !details.customer.email.contains('@') {
        return Err(CheckoutError::Validation("email is invalid".to_string()));
    }
    Ok(())
}
