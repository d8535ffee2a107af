use serde::{Deserialize, Serialize};

/// Contact fields shared by orders and reservations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerContact {
    #[serde(rename = "customer_name")]
    pub name: String,
    #[serde(rename = "customer_email")]
    pub email: String,
    #[serde(rename = "customer_phone")]
    pub phone: String,
}

impl CustomerContact {
    pub fn new(name: impl Into<String>, email: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            phone: phone.into(),
        }
    }
}

/// Delivery fields captured at checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub address: String,
    pub city: String,
    pub postal_code: String,
}

impl ShippingAddress {
    pub fn new(address: impl Into<String>, city: impl Into<String>, postal_code: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            city: city.into(),
            postal_code: postal_code.into(),
        }
    }
}
