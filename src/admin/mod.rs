//! Back-office operations behind the admin product, order and manage-store
//! screens.

mod edit;
mod error;
mod orders;
mod products;

pub use edit::EditSession;
pub use error::AdminError;
pub use orders::{OrderAdmin, OrdersView, StatusUpdate};
pub use products::ProductAdmin;
