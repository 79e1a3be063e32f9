//! Storefront and admin console over a hosted REST API.
//!
//! Each REST collection is cached by its own [`actor_framework::ResourceActor`];
//! the catalog, checkout and admin services work through cloneable clients
//! and never touch the cache directly.

pub mod actor_framework;
pub mod admin;
pub mod api;
pub mod app_system;
pub mod catalog;
pub mod checkout;
pub mod clients;
pub mod domain;
pub mod order_actor;
pub mod product_actor;
pub mod routes;
pub mod screens;

#[cfg(test)]
mod mock_framework;
