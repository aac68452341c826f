//! Per-cell increment rules.
//!
//! Pure functions over in-memory fields. Nothing here touches a file, so
//! the rules can be checked against hand-built arrays.
//!
//! # Rules
//!
//! | Rule | Used for | Cell result |
//! |------|----------|-------------|
//! | [`IncrementRule::RevertNegative`] | temperature | `bkg + inc` if that is `>= 0`, else `bkg` |
//! | [`IncrementRule::Unconditional`] | salinity | `bkg + inc` |
//!
//! A reverted cell keeps its *original* background value. It is not
//! clamped to zero: the increment is simply discarded for that cell.
//! Salinity gets no such protection and may leave the physical range.

use std::fmt;

use ndarray::{ArrayD, Zip};
use thiserror::Error;

use crate::types::{Field, FieldRange};

/// Background and increment fields have different shapes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("background shape {background:?} does not match increment shape {increment:?}")]
pub struct ShapeMismatch {
    pub background: Vec<usize>,
    pub increment: Vec<usize>,
}

/// How an increment is combined with the background.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IncrementRule {
    /// Add the increment, but revert cells whose sum would be negative.
    RevertNegative,
    /// Add the increment everywhere.
    Unconditional,
}

impl IncrementRule {
    /// Apply this rule to a background field.
    pub fn apply(self, background: &Field, increment: &Field) -> Result<RuleOutput, ShapeMismatch> {
        match self {
            Self::RevertNegative => apply_masked_increment(background, increment),
            Self::Unconditional => apply_increment(background, increment),
        }
    }
}

impl fmt::Display for IncrementRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RevertNegative => write!(f, "revert-negative"),
            Self::Unconditional => write!(f, "unconditional"),
        }
    }
}

/// Summary of one rule application.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UpdateStats {
    /// Number of cells in the field
    pub cells: usize,
    /// Cells whose increment was discarded
    pub reverted: usize,
    /// Background range before the update
    pub before: Option<FieldRange>,
    /// Range after the update
    pub after: Option<FieldRange>,
}

/// Updated field plus its statistics.
#[derive(Clone, Debug)]
pub struct RuleOutput {
    pub field: Field,
    pub stats: UpdateStats,
}

fn check_shapes(background: &Field, increment: &Field) -> Result<(), ShapeMismatch> {
    if background.shape() != increment.shape() {
        return Err(ShapeMismatch {
            background: background.shape().to_vec(),
            increment: increment.shape().to_vec(),
        });
    }
    Ok(())
}

/// Cells where `background + increment < 0`.
///
/// NaN sums compare false and are never masked.
pub fn negative_sum_mask(
    background: &Field,
    increment: &Field,
) -> Result<ArrayD<bool>, ShapeMismatch> {
    check_shapes(background, increment)?;
    Ok(Zip::from(background)
        .and(increment)
        .map_collect(|&b, &i| b + i < 0.0))
}

/// Add `increment` to `background`, reverting cells whose sum is negative.
///
/// For every cell, the result is the sum when the sum is `>= 0` and the
/// original background value otherwise.
///
/// # Example
///
/// ```
/// use bkg_update::types::Field;
/// use bkg_update::update::apply_masked_increment;
/// use ndarray::IxDyn;
///
/// let bkg = Field::from_shape_vec(IxDyn(&[3]), vec![1.0, -0.5, 3.0]).unwrap();
/// let inc = Field::from_shape_vec(IxDyn(&[3]), vec![-2.0, 1.0, -1.0]).unwrap();
///
/// let out = apply_masked_increment(&bkg, &inc).unwrap();
/// assert_eq!(out.field.as_slice().unwrap(), &[1.0, 0.5, 2.0]);
/// assert_eq!(out.stats.reverted, 1);
/// ```
pub fn apply_masked_increment(
    background: &Field,
    increment: &Field,
) -> Result<RuleOutput, ShapeMismatch> {
    let mask = negative_sum_mask(background, increment)?;

    let mut field = background + increment;
    let mut reverted = 0;
    Zip::from(&mut field)
        .and(&mask)
        .and(background)
        .for_each(|sum, &masked, &original| {
            if masked {
                *sum = original;
                reverted += 1;
            }
        });

    Ok(RuleOutput {
        stats: UpdateStats {
            cells: field.len(),
            reverted,
            before: FieldRange::of(background),
            after: FieldRange::of(&field),
        },
        field,
    })
}

/// Add `increment` to `background` everywhere, regardless of sign.
pub fn apply_increment(background: &Field, increment: &Field) -> Result<RuleOutput, ShapeMismatch> {
    check_shapes(background, increment)?;

    let field = background + increment;
    Ok(RuleOutput {
        stats: UpdateStats {
            cells: field.len(),
            reverted: 0,
            before: FieldRange::of(background),
            after: FieldRange::of(&field),
        },
        field,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::IxDyn;

    fn field(values: &[f64]) -> Field {
        Field::from_shape_vec(IxDyn(&[values.len()]), values.to_vec()).unwrap()
    }

    #[test]
    fn test_masked_increment_reverts_negative_sums() {
        let bkg = field(&[1.0, -0.5, 3.0]);
        let inc = field(&[-2.0, 1.0, -1.0]);

        let mask = negative_sum_mask(&bkg, &inc).unwrap();
        assert_eq!(mask.as_slice().unwrap(), &[true, false, false]);

        let out = apply_masked_increment(&bkg, &inc).unwrap();
        assert_eq!(out.field.as_slice().unwrap(), &[1.0, 0.5, 2.0]);
        assert_eq!(out.stats.cells, 3);
        assert_eq!(out.stats.reverted, 1);
    }

    #[test]
    fn test_reverted_cell_keeps_original_not_zero() {
        // Already-negative background with a negative increment stays where it was
        let bkg = field(&[-1.8, 0.3]);
        let inc = field(&[-0.1, -0.4]);

        let out = apply_masked_increment(&bkg, &inc).unwrap();
        assert_eq!(out.field.as_slice().unwrap(), &[-1.8, 0.3]);
        assert_eq!(out.stats.reverted, 2);
    }

    #[test]
    fn test_zero_sum_is_not_masked() {
        let bkg = field(&[2.0]);
        let inc = field(&[-2.0]);

        let out = apply_masked_increment(&bkg, &inc).unwrap();
        assert_eq!(out.field[[0]], 0.0);
        assert_eq!(out.stats.reverted, 0);
    }

    #[test]
    fn test_masked_increment_exact_sum_for_non_negative() {
        let bkg = field(&[10.1, 0.0, 5.25]);
        let inc = field(&[0.2, 0.0, -5.0]);

        let out = apply_masked_increment(&bkg, &inc).unwrap();
        for i in 0..3 {
            assert_eq!(out.field[[i]], bkg[[i]] + inc[[i]]);
        }
    }

    #[test]
    fn test_nan_passes_through() {
        let bkg = field(&[f64::NAN, 1.0]);
        let inc = field(&[-5.0, 1.0]);

        let out = apply_masked_increment(&bkg, &inc).unwrap();
        assert!(out.field[[0]].is_nan());
        assert_eq!(out.field[[1]], 2.0);
        assert_eq!(out.stats.reverted, 0);
    }

    #[test]
    fn test_unconditional_increment() {
        let bkg = field(&[34.0, 35.0]);
        let inc = field(&[-1.0, 0.2]);

        let out = apply_increment(&bkg, &inc).unwrap();
        assert_eq!(out.field.as_slice().unwrap(), &[33.0, 35.0 + 0.2]);
        assert_eq!(out.stats.reverted, 0);
    }

    #[test]
    fn test_unconditional_allows_negative() {
        let bkg = field(&[0.5]);
        let inc = field(&[-3.0]);

        let out = IncrementRule::Unconditional.apply(&bkg, &inc).unwrap();
        assert_eq!(out.field[[0]], -2.5);

        let out = IncrementRule::RevertNegative.apply(&bkg, &inc).unwrap();
        assert_eq!(out.field[[0]], 0.5);
    }

    #[test]
    fn test_zero_increment_is_identity() {
        let bkg = Field::from_shape_vec(IxDyn(&[2, 2]), vec![-1.0, 0.0, 4.5, 12.0]).unwrap();
        let inc = Field::zeros(IxDyn(&[2, 2]));

        for rule in [IncrementRule::RevertNegative, IncrementRule::Unconditional] {
            let out = rule.apply(&bkg, &inc).unwrap();
            assert_eq!(out.field, bkg);
            assert_eq!(out.stats.before, out.stats.after);
        }
    }

    #[test]
    fn test_multidimensional_mask() {
        let bkg = Field::from_shape_vec(IxDyn(&[2, 1, 2]), vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let inc = Field::from_shape_vec(IxDyn(&[2, 1, 2]), vec![-1.5, 1.0, -4.0, -1.0]).unwrap();

        let out = apply_masked_increment(&bkg, &inc).unwrap();
        assert_eq!(out.field.shape(), &[2, 1, 2]);
        assert_eq!(out.field.as_slice().unwrap(), &[1.0, 3.0, 3.0, 3.0]);
        assert_eq!(out.stats.reverted, 2);
    }

    #[test]
    fn test_shape_mismatch() {
        let bkg = field(&[1.0, 2.0, 3.0]);
        let inc = Field::zeros(IxDyn(&[3, 1]));

        let err = apply_increment(&bkg, &inc).unwrap_err();
        assert_eq!(err.background, vec![3]);
        assert_eq!(err.increment, vec![3, 1]);
        assert!(apply_masked_increment(&bkg, &inc).is_err());
    }

    #[test]
    fn test_rule_display() {
        assert_eq!(IncrementRule::RevertNegative.to_string(), "revert-negative");
        assert_eq!(IncrementRule::Unconditional.to_string(), "unconditional");
    }
}
