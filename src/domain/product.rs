use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::wire;

/// Stock at or below this level (and above zero) is reported as low.
pub const LOW_STOCK_THRESHOLD: u32 = 10;

/// Replenishment never lifts a product above this many units.
pub const MAX_STOCK: u32 = 100;

/// Category tag, sent as `type` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProductType {
    TShirt,
    Trousers,
}

impl ProductType {
    pub const ALL: [ProductType; 2] = [ProductType::TShirt, ProductType::Trousers];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProductType::TShirt => "t-shirt",
            ProductType::Trousers => "trousers",
        }
    }

    /// Units added by one "replenish stock" action on the manage-store screen.
    pub fn replenish_step(&self) -> u32 {
        match self {
            ProductType::TShirt => 20,
            ProductType::Trousers => 15,
        }
    }
}

impl fmt::Display for ProductType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "t-shirt" | "tshirt" => Ok(ProductType::TShirt),
            "trousers" => Ok(ProductType::Trousers),
            other => Err(format!("unknown product type: {other}")),
        }
    }
}

/// Unknown or blank tags decode as uncategorised rather than failing the row.
pub(crate) fn category<'de, D>(deserializer: D) -> Result<Option<ProductType>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|tag| tag.parse().ok()))
}

/// Represents a product in the hosted catalog.
///
/// `is_available` is stored independently of `quantity`; the two are allowed
/// to disagree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "wire::decimal")]
    pub price: f64,
    #[serde(default, deserialize_with = "wire::count")]
    pub quantity: u32,
    #[serde(default)]
    pub is_available: bool,
    #[serde(
        rename = "type",
        default,
        deserialize_with = "category",
        skip_serializing_if = "Option::is_none"
    )]
    pub product_type: Option<ProductType>,
    #[serde(default, deserialize_with = "wire::timestamp", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "wire::timestamp", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Product {
    pub fn new(id: impl Into<String>, title: impl Into<String>, price: f64, quantity: u32) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            price,
            quantity,
            is_available: quantity > 0,
            product_type: None,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn with_type(mut self, product_type: ProductType) -> Self {
        self.product_type = Some(product_type);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_availability(mut self, is_available: bool) -> Self {
        self.is_available = is_available;
        self
    }

    pub fn stock_status(&self) -> StockStatus {
        StockStatus::of(self)
    }

    /// Stock after one replenishment, or `None` for uncategorised products.
    pub fn replenished_quantity(&self) -> Option<u32> {
        let step = self.product_type?.replenish_step();
        Some(self.quantity.saturating_add(step).min(MAX_STOCK))
    }
}

/// Derived, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockStatus {
    OutOfStock,
    LowStock,
    Available,
    Unavailable,
}

impl StockStatus {
    pub fn of(product: &Product) -> Self {
        match product.quantity {
            0 => StockStatus::OutOfStock,
            q if q <= LOW_STOCK_THRESHOLD => StockStatus::LowStock,
            _ if product.is_available => StockStatus::Available,
            _ => StockStatus::Unavailable,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StockStatus::OutOfStock => "Out of Stock",
            StockStatus::LowStock => "Low Stock",
            StockStatus::Available => "Available",
            StockStatus::Unavailable => "Unavailable",
        }
    }
}

impl fmt::Display for StockStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Payload for `POST /products`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCreate {
    pub title: String,
    pub description: String,
    pub price: f64,
    pub quantity: u32,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub product_type: Option<ProductType>,
    pub is_available: bool,
}

impl ProductCreate {
    /// Availability starts out tracking the initial stock.
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        price: f64,
        quantity: u32,
        product_type: Option<ProductType>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            price,
            quantity,
            product_type,
            is_available: quantity > 0,
        }
    }
}

/// Payload for `PUT /products/:id`. Only the fields that are set are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub product_type: Option<ProductType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_available: Option<bool>,
}

impl ProductPatch {
    pub fn quantity(quantity: u32) -> Self {
        Self {
            quantity: Some(quantity),
            ..Self::default()
        }
    }

    pub fn availability(is_available: bool) -> Self {
        Self {
            is_available: Some(is_available),
            ..Self::default()
        }
    }

    /// Full-row save from the admin edit form; availability follows stock.
    pub fn from_edit(draft: &Product) -> Self {
        Self {
            title: Some(draft.title.clone()),
            description: Some(draft.description.clone()),
            price: Some(draft.price),
            quantity: Some(draft.quantity),
            product_type: draft.product_type,
            is_available: Some(draft.quantity > 0),
        }
    }
}
