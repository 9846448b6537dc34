//! Oldest-order-first allocation of receipts across purchase-order lines.
//!
//! This module implements the core allocation logic:
//! - Flattening order snapshots into allocatable lines
//! - The oldest-order-first allocation walk
//! - Pending quantity per OC line
//! - Error types for allocation operations

pub mod error;
pub mod resolver;

#[cfg(test)]
mod resolver_props;

pub use error::AllocationError;
pub use resolver::{
    AllocatableLine, AllocationOutcome, LineAllocation, allocate, lines_for_request,
    pending_for_line,
};
