//! Price snapshots
//!
//! Freezes the monetary facts of a line item at the moment it is created
//! or its book changes, so later catalog edits never rewrite history.

use thiserror::Error;

use crate::prices::Price;

/// Errors raised while computing a line snapshot.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SnapshotError {
    /// Quantity must be at least one.
    #[error("quantity must be at least 1")]
    InvalidQuantity,

    /// The line total exceeded the representable range.
    #[error("line total out of range")]
    Overflow,
}

/// The frozen pricing facts of a single line item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineSnapshot {
    /// Catalog unit price at the time of the snapshot.
    pub unit_price: Price,

    /// Catalog title at the time of the snapshot.
    pub title_snapshot: String,

    /// `unit_price × qty`.
    pub line_total: Price,
}

/// Computes the snapshot for a resolved book at the given quantity.
///
/// Pure function of its inputs; resolving the book (and rejecting
/// tombstoned rows) is the caller's job.
///
/// # Errors
///
/// - [`SnapshotError::InvalidQuantity`] when `qty` is zero.
/// - [`SnapshotError::Overflow`] when the line total does not fit.
pub fn snapshot(unit_price: Price, title: &str, qty: u32) -> Result<LineSnapshot, SnapshotError> {
    if qty < 1 {
        return Err(SnapshotError::InvalidQuantity);
    }

    let line_total = unit_price
        .checked_mul(qty)
        .ok_or(SnapshotError::Overflow)?;

    Ok(LineSnapshot {
        unit_price,
        title_snapshot: title.to_string(),
        line_total,
    })
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn snapshots_price_title_and_line_total() -> TestResult {
        let snap = snapshot(Price::from_minor(5000), "The Name of the Rose", 2)?;

        assert_eq!(snap.unit_price, Price::from_minor(5000));
        assert_eq!(snap.title_snapshot, "The Name of the Rose");
        assert_eq!(snap.line_total, Price::from_minor(10_000));

        Ok(())
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let result = snapshot(Price::from_minor(5000), "Foucault's Pendulum", 0);

        assert_eq!(result, Err(SnapshotError::InvalidQuantity));
    }

    #[test]
    fn overflowing_line_total_is_rejected() {
        let result = snapshot(Price::from_minor(u64::MAX), "Baudolino", 2);

        assert_eq!(result, Err(SnapshotError::Overflow));
    }

    #[test]
    fn snapshot_is_independent_of_later_price_changes() -> TestResult {
        let mut catalog_price = Price::from_minor(5000);
        let snap = snapshot(catalog_price, "The Prague Cemetery", 3)?;

        // Catalog price moves; the snapshot must not.
        catalog_price = Price::from_minor(9900);

        assert_eq!(snap.unit_price, Price::from_minor(5000));
        assert_eq!(snap.line_total, Price::from_minor(15_000));
        assert_eq!(catalog_price, Price::from_minor(9900));

        Ok(())
    }
}
