//! Path routing for the storefront screens.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Catalog,
    ProductDetail(String),
    Checkout(String),
    Confirmation,
    AddProduct,
    AdminProducts,
    AdminOrders,
    ManageStore,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("No screen at {0}")]
    NotFound(String),
}

impl FromStr for Route {
    type Err = RouteError;

    fn from_str(path: &str) -> Result<Self, Self::Err> {
        let trimmed = path.trim();
        let segments: Vec<&str> = trimmed
            .split('/')
            .filter(|segment| !segment.is_empty())
            .collect();
        // Literal paths win over `/product/:id`.
        let route = match segments.as_slice() {
            [] => Route::Catalog,
            ["product", "payment-successful"] => Route::Confirmation,
            ["product", "add-product"] => Route::AddProduct,
            ["product", id] => Route::ProductDetail(id.to_string()),
            ["product", id, "checkout"] => Route::Checkout(id.to_string()),
            ["admin", "products"] => Route::AdminProducts,
            ["admin", "orders"] => Route::AdminOrders,
            ["admin", "manage-store"] => Route::ManageStore,
            _ => return Err(RouteError::NotFound(trimmed.to_string())),
        };
        Ok(route)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Catalog => f.write_str("/"),
            Route::ProductDetail(id) => write!(f, "/product/{id}"),
            Route::Checkout(id) => write!(f, "/product/{id}/checkout"),
            Route::Confirmation => f.write_str("/product/payment-successful"),
            Route::AddProduct => f.write_str("/product/add-product"),
            Route::AdminProducts => f.write_str("/admin/products"),
            Route::AdminOrders => f.write_str("/admin/orders"),
            Route::ManageStore => f.write_str("/admin/manage-store"),
        }
    }
}
