//! Budget service for projected-consumption checks.

use rust_decimal::Decimal;

use super::error::BudgetError;
use super::types::{BudgetCheck, BudgetCheckStatus, BudgetLine};

/// Fraction of the budget at which the check starts warning.
const NEAR_LIMIT_THRESHOLD: Decimal = Decimal::from_parts(90, 0, 0, false, 2);

/// Budget service for business logic.
pub struct BudgetService;

impl BudgetService {
    /// Checks projected consumption against a budget line.
    ///
    /// `projected = utilized + pending_in_form + requested`, where
    /// `pending_in_form` covers sibling lines the user has typed into the
    /// same form but not yet saved. The check is read-only: actual
    /// utilization accrues when the requisition line is persisted.
    ///
    /// A missing budget line classifies as `Unbudgeted`; whether that (or
    /// `OverBudget`) blocks the line is the caller's policy.
    ///
    /// # Errors
    ///
    /// Returns `BudgetError::NonPositiveQuantity` for a zero/negative
    /// requested quantity, `BudgetError::NegativePending` for a negative
    /// pending-in-form quantity.
    pub fn check(
        line: Option<&BudgetLine>,
        requested: Decimal,
        pending_in_form: Decimal,
    ) -> Result<BudgetCheck, BudgetError> {
        if requested <= Decimal::ZERO {
            return Err(BudgetError::NonPositiveQuantity);
        }
        if pending_in_form < Decimal::ZERO {
            return Err(BudgetError::NegativePending);
        }

        let Some(line) = line else {
            return Ok(BudgetCheck {
                status: BudgetCheckStatus::Unbudgeted,
                projected: pending_in_form + requested,
                budgeted: None,
            });
        };

        let projected = line.quantity_utilized + pending_in_form + requested;
        let budgeted = line.quantity_budgeted;

        let status = if projected > budgeted {
            BudgetCheckStatus::OverBudget
        } else if projected >= budgeted * NEAR_LIMIT_THRESHOLD {
            BudgetCheckStatus::NearLimit
        } else {
            BudgetCheckStatus::Ok
        };

        Ok(BudgetCheck {
            status,
            projected,
            budgeted: Some(budgeted),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use acopio_shared::types::{BudgetLineId, FrontSpecialtyId, MaterialId};
    use rust_decimal_macros::dec;

    fn make_line(budgeted: Decimal, utilized: Decimal) -> BudgetLine {
        BudgetLine {
            id: BudgetLineId::new(),
            front_specialty_id: FrontSpecialtyId::new(),
            material_id: MaterialId::new(),
            quantity_budgeted: budgeted,
            quantity_utilized: utilized,
        }
    }

    #[test]
    fn test_check_ok_within_budget() {
        let line = make_line(dec!(100), dec!(40));
        let check = BudgetService::check(Some(&line), dec!(10), dec!(0)).unwrap();

        assert_eq!(check.status, BudgetCheckStatus::Ok);
        assert_eq!(check.projected, dec!(50));
        assert_eq!(check.budgeted, Some(dec!(100)));
    }

    // Boundary sweep around the 90% warning threshold with budgeted 100,
    // utilized 85.
    #[rstest::rstest]
    #[case(dec!(4), BudgetCheckStatus::Ok, dec!(89))]
    #[case(dec!(5), BudgetCheckStatus::NearLimit, dec!(90))]
    #[case(dec!(6), BudgetCheckStatus::NearLimit, dec!(91))]
    #[case(dec!(15), BudgetCheckStatus::NearLimit, dec!(100))]
    #[case(dec!(20), BudgetCheckStatus::OverBudget, dec!(105))]
    fn test_check_threshold_boundaries(
        #[case] requested: Decimal,
        #[case] expected: BudgetCheckStatus,
        #[case] projected: Decimal,
    ) {
        let line = make_line(dec!(100), dec!(85));
        let check = BudgetService::check(Some(&line), requested, dec!(0)).unwrap();

        assert_eq!(check.status, expected);
        assert_eq!(check.projected, projected);
    }

    #[test]
    fn test_check_counts_pending_in_form() {
        // Lines already typed into the form count toward the projection.
        let line = make_line(dec!(100), dec!(50));
        let check = BudgetService::check(Some(&line), dec!(30), dec!(25)).unwrap();

        assert_eq!(check.status, BudgetCheckStatus::OverBudget);
        assert_eq!(check.projected, dec!(105));
    }

    #[test]
    fn test_check_unbudgeted_material() {
        let check = BudgetService::check(None, dec!(10), dec!(2)).unwrap();

        assert_eq!(check.status, BudgetCheckStatus::Unbudgeted);
        assert_eq!(check.projected, dec!(12));
        assert_eq!(check.budgeted, None);
    }

    #[test]
    fn test_check_zero_budget_is_over() {
        let line = make_line(dec!(0), dec!(0));
        let check = BudgetService::check(Some(&line), dec!(1), dec!(0)).unwrap();

        assert_eq!(check.status, BudgetCheckStatus::OverBudget);
    }

    #[test]
    fn test_check_rejects_non_positive_requested() {
        let line = make_line(dec!(100), dec!(0));
        assert!(matches!(
            BudgetService::check(Some(&line), dec!(0), dec!(0)),
            Err(BudgetError::NonPositiveQuantity)
        ));
        assert!(matches!(
            BudgetService::check(Some(&line), dec!(-5), dec!(0)),
            Err(BudgetError::NonPositiveQuantity)
        ));
    }

    #[test]
    fn test_check_rejects_negative_pending() {
        let line = make_line(dec!(100), dec!(0));
        assert!(matches!(
            BudgetService::check(Some(&line), dec!(5), dec!(-1)),
            Err(BudgetError::NegativePending)
        ));
    }

    #[test]
    fn test_fractional_quantities() {
        let line = make_line(dec!(10.5), dec!(9));
        let check = BudgetService::check(Some(&line), dec!(0.45), dec!(0)).unwrap();

        assert_eq!(check.status, BudgetCheckStatus::NearLimit);
        assert_eq!(check.projected, dec!(9.45));
    }
}
