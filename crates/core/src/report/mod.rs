//! Stock reporting over the movement ledger.
//!
//! This module implements:
//! - Stock balance aggregation (entries minus exits per item)
//! - A TTL snapshot cache so report screens do not re-scan the ledger on
//!   every render

pub mod cache;
pub mod stock;

pub use cache::ReportCache;
pub use stock::{StockBalance, stock_balances};
