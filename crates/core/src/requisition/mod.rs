//! Requisition domain types and fulfillment status.
//!
//! A requisition is a work front's demand for materials, services,
//! equipment, or PPE. Each line tracks how much has been requested and how
//! much has arrived; the reconciliation module owns the arithmetic that
//! mutates the fulfillment cache.

pub mod types;

pub use types::{LineStatus, Requisition, RequisitionLine};
