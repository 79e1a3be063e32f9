#[macro_use]
mod macros;

mod order_client;
mod product_client;

pub use order_client::OrderClient;
pub use product_client::ProductClient;
