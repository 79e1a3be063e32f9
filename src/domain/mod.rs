pub mod order;
pub mod product;
pub mod wire;

pub use order::*;
pub use product::*;
