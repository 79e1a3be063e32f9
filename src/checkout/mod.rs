//! Payment-form validation and the two-step purchase flow.

mod error;
mod payment;
mod service;

pub use error::*;
pub use payment::*;
pub use service::*;
