//! Purchase request (SC) and purchase order (OC) domain types.
//!
//! A purchase request approves a subset of a requisition's demand for
//! sourcing; purchase orders commit quantities against its lines. Cancelled
//! orders drop out of every pending/allocation computation.

pub mod types;

pub use types::{OrderLine, OrderStatus, PurchaseOrder, RequestLine, RequestLineStatus};
