//! Shared data types.
//!
//! Fields are plain `ndarray` arrays so the update rules can be exercised
//! without any NetCDF fixture:
//!
//! ```
//! use bkg_update::types::Field;
//! use ndarray::IxDyn;
//!
//! let temp = Field::from_shape_vec(IxDyn(&[2, 3]), vec![4.0; 6]).unwrap();
//! assert_eq!(temp.shape(), &[2, 3]);
//! ```

mod field;

pub use field::{Field, FieldRange};
