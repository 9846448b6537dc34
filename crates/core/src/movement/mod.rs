//! Append-only warehouse movement ledger.
//!
//! Every entry or exit of material at the warehouse is one immutable
//! `Movement`. Corrections are new movements, never edits. The sums over
//! this ledger are the source of truth from which fulfillment and
//! allocation consumption are derived.

pub mod types;

pub use types::{Direction, Movement, MovementSource, consumed_for, received_for};
