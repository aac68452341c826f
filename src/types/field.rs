//! Whole-variable field arrays.

use std::fmt;

use ndarray::ArrayD;

/// A full gridded variable held in memory.
///
/// Values of any numeric on-disk type are widened to `f64` when read.
/// The dimensionality is whatever the variable declares (scalar, 1D
/// profile, 3D `s_rho × eta_rho × xi_rho`, 4D with time, ...).
pub type Field = ArrayD<f64>;

/// Value range of a field, ignoring NaN cells.
///
/// # Example
///
/// ```
/// use bkg_update::types::{Field, FieldRange};
/// use ndarray::{ArrayD, IxDyn};
///
/// let field: Field = ArrayD::from_shape_vec(IxDyn(&[3]), vec![1.0, f64::NAN, -2.0]).unwrap();
/// let range = FieldRange::of(&field).unwrap();
/// assert_eq!(range.min, -2.0);
/// assert_eq!(range.max, 1.0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FieldRange {
    /// Smallest non-NaN value
    pub min: f64,
    /// Largest non-NaN value
    pub max: f64,
}

impl FieldRange {
    /// Compute the range of a field.
    ///
    /// Returns `None` for empty fields and fields that are entirely NaN.
    pub fn of(field: &Field) -> Option<Self> {
        field
            .iter()
            .copied()
            .filter(|v| !v.is_nan())
            .fold(None, |acc, v| match acc {
                None => Some(Self { min: v, max: v }),
                Some(r) => Some(Self {
                    min: r.min.min(v),
                    max: r.max.max(v),
                }),
            })
    }
}

impl fmt::Display for FieldRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.min, self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::IxDyn;

    #[test]
    fn test_range_2d() {
        let field = Field::from_shape_vec(IxDyn(&[2, 2]), vec![3.0, -1.0, 7.5, 0.0]).unwrap();
        let range = FieldRange::of(&field).unwrap();
        assert_eq!(range, FieldRange { min: -1.0, max: 7.5 });
        assert_eq!(range.to_string(), "[-1, 7.5]");
    }

    #[test]
    fn test_range_empty_and_all_nan() {
        let empty = Field::zeros(IxDyn(&[0]));
        assert!(FieldRange::of(&empty).is_none());

        let nan = Field::from_elem(IxDyn(&[3]), f64::NAN);
        assert!(FieldRange::of(&nan).is_none());
    }
}
