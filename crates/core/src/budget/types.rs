//! Budget data types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use acopio_shared::types::{BudgetLineId, FrontSpecialtyId, MaterialId};

/// A budget line: allowed consumption of one material by one
/// front/specialty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetLine {
    /// Budget line ID.
    pub id: BudgetLineId,
    /// Work-front/specialty the budget belongs to.
    pub front_specialty_id: FrontSpecialtyId,
    /// Budgeted material.
    pub material_id: MaterialId,
    /// Budgeted quantity.
    pub quantity_budgeted: Decimal,
    /// Cumulative utilized quantity (monotonically increasing; updated
    /// when consuming requisition lines are persisted).
    pub quantity_utilized: Decimal,
}

/// Outcome classification of a budget check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetCheckStatus {
    /// Projected consumption stays comfortably within budget.
    Ok,
    /// Projected consumption reaches the warning threshold.
    NearLimit,
    /// Projected consumption exceeds the budget.
    OverBudget,
    /// The material has no budget line for this front/specialty.
    Unbudgeted,
}

/// Result of a budget check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetCheck {
    /// Outcome classification.
    pub status: BudgetCheckStatus,
    /// Projected utilization: utilized + pending-in-form + requested.
    pub projected: Decimal,
    /// Budgeted quantity, when a budget line exists.
    pub budgeted: Option<Decimal>,
}
