use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::product::{category, Product, ProductType};
use super::wire;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Paid,
    #[default]
    Pending,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 3] = [OrderStatus::Paid, OrderStatus::Pending, OrderStatus::Cancelled];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Paid => "paid",
            OrderStatus::Pending => "pending",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "paid" => Ok(OrderStatus::Paid),
            "pending" => Ok(OrderStatus::Pending),
            "cancelled" | "canceled" => Ok(OrderStatus::Cancelled),
            other => Err(format!("unknown order status: {other}")),
        }
    }
}

/// The originating product, with its stock level at time of purchase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderProductRef {
    pub id: String,
    #[serde(deserialize_with = "wire::count")]
    pub quantity: u32,
}

/// Represents a customer order.
///
/// Title, description, price and type are copied from the product when the
/// order is placed; `total` is computed once and never revalidated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "wire::decimal")]
    pub price: f64,
    #[serde(default, deserialize_with = "wire::count")]
    pub quantity: u32,
    #[serde(default, deserialize_with = "wire::decimal")]
    pub total: f64,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(
        rename = "type",
        default,
        deserialize_with = "category",
        skip_serializing_if = "Option::is_none"
    )]
    pub product_type: Option<ProductType>,
    #[serde(default, deserialize_with = "wire::timestamp", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<OrderProductRef>,
}

/// Payload for `POST /orders`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCreate {
    pub title: String,
    pub description: String,
    pub price: f64,
    pub quantity: u32,
    pub total: f64,
    pub status: OrderStatus,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub product_type: Option<ProductType>,
    pub product: OrderProductRef,
}

impl OrderCreate {
    /// A paid order for `quantity` units of `product`, denormalising the
    /// product's display fields and fixing the total at cent precision.
    pub fn paid(product: &Product, quantity: u32) -> Self {
        Self {
            title: product.title.clone(),
            description: product.description.clone(),
            price: product.price,
            quantity,
            total: order_total(product.price, quantity),
            status: OrderStatus::Paid,
            product_type: product.product_type,
            product: OrderProductRef {
                id: product.id.clone(),
                quantity: product.quantity,
            },
        }
    }
}

/// Payload for `PUT /orders/:id`. The admin screen only edits status.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OrderPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
}

impl OrderPatch {
    pub fn status(status: OrderStatus) -> Self {
        Self { status: Some(status) }
    }
}

pub fn order_total(price: f64, quantity: u32) -> f64 {
    wire::round_cents(price * f64::from(quantity))
}

#[cfg(test)]
impl Order {
    /// A paid single-unit order with the given total.
    pub fn sample(id: &str, total: f64) -> Self {
        Self {
            id: id.to_string(),
            title: format!("Order {id}"),
            description: String::new(),
            price: total,
            quantity: 1,
            total,
            status: OrderStatus::Paid,
            product_type: None,
            created_at: None,
            product: None,
        }
    }
}
