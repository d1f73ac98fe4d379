//! Order totals
//!
//! The order-level monetary invariant: `subtotal` is the sum of the live
//! line totals and `grand_total = subtotal + shipping_cost - discount_total`.

use thiserror::Error;

use crate::prices::Price;

/// Errors raised while recomputing order totals.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TotalsError {
    /// The subtotal exceeded the representable range.
    #[error("subtotal out of range")]
    Overflow,
}

/// Recomputed order-level totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderTotals {
    pub subtotal: Price,
    pub grand_total: Price,
}

/// Recomputes order totals from the live line totals.
///
/// The grand total floors at zero when the discount exceeds the rest;
/// amounts never go negative. Pure, so recomputing twice over the same
/// items yields identical results.
///
/// # Errors
///
/// Returns [`TotalsError::Overflow`] when summation does not fit.
pub fn recalculate(
    line_totals: impl IntoIterator<Item = Price>,
    shipping_cost: Price,
    discount_total: Price,
) -> Result<OrderTotals, TotalsError> {
    let subtotal = line_totals
        .into_iter()
        .try_fold(Price::ZERO, |acc, line| acc.checked_add(line))
        .ok_or(TotalsError::Overflow)?;

    let grand_total = subtotal
        .checked_add(shipping_cost)
        .ok_or(TotalsError::Overflow)?
        .saturating_sub(discount_total);

    Ok(OrderTotals {
        subtotal,
        grand_total,
    })
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn minor(values: &[u64]) -> Vec<Price> {
        values.iter().copied().map(Price::from_minor).collect()
    }

    #[test]
    fn sums_line_totals_into_subtotal() -> TestResult {
        let totals = recalculate(minor(&[10_000, 5000]), Price::ZERO, Price::ZERO)?;

        assert_eq!(totals.subtotal, Price::from_minor(15_000));
        assert_eq!(totals.grand_total, Price::from_minor(15_000));

        Ok(())
    }

    #[test]
    fn grand_total_adds_shipping_and_subtracts_discount() -> TestResult {
        let totals = recalculate(
            minor(&[10_000]),
            Price::from_minor(500),
            Price::from_minor(1500),
        )?;

        assert_eq!(totals.subtotal, Price::from_minor(10_000));
        assert_eq!(totals.grand_total, Price::from_minor(9000));

        Ok(())
    }

    #[test]
    fn empty_orders_total_to_zero() -> TestResult {
        let totals = recalculate(minor(&[]), Price::ZERO, Price::ZERO)?;

        assert_eq!(totals.subtotal, Price::ZERO);
        assert_eq!(totals.grand_total, Price::ZERO);

        Ok(())
    }

    #[test]
    fn discount_larger_than_order_floors_at_zero() -> TestResult {
        let totals = recalculate(minor(&[1000]), Price::ZERO, Price::from_minor(5000))?;

        assert_eq!(totals.grand_total, Price::ZERO);

        Ok(())
    }

    #[test]
    fn recalculation_is_idempotent() -> TestResult {
        let items = minor(&[5000, 2500, 1999]);

        let first = recalculate(items.clone(), Price::from_minor(700), Price::from_minor(300))?;
        let second = recalculate(items, Price::from_minor(700), Price::from_minor(300))?;

        assert_eq!(first, second);

        Ok(())
    }

    #[test]
    fn add_update_remove_sequence_keeps_the_invariant() -> TestResult {
        // qty 2 of a 50.00 book.
        let totals = recalculate(minor(&[10_000]), Price::ZERO, Price::ZERO)?;
        assert_eq!(totals.subtotal, Price::from_minor(10_000));

        // qty bumped to 3.
        let totals = recalculate(minor(&[15_000]), Price::ZERO, Price::ZERO)?;
        assert_eq!(totals.subtotal, Price::from_minor(15_000));

        // item removed.
        let totals = recalculate(minor(&[]), Price::ZERO, Price::ZERO)?;
        assert_eq!(totals.subtotal, Price::ZERO);
        assert_eq!(totals.grand_total, Price::ZERO);

        Ok(())
    }

    #[test]
    fn overflowing_subtotal_is_rejected() {
        let result = recalculate(minor(&[u64::MAX, 1]), Price::ZERO, Price::ZERO);

        assert_eq!(result, Err(TotalsError::Overflow));
    }
}
