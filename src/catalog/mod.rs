//! Client-side filtering, ordering and paging of already-fetched lists.
//!
//! Nothing here talks to the server; views recompute on every change to the
//! source list or to the filter inputs.

mod filter;
mod page;

pub use filter::*;
pub use page::*;
