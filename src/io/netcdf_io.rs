//! NetCDF dataset handles for the increment update.
//!
//! Two handle types wrap the `netcdf` crate:
//!
//! - [`IncrementDataset`]: the analysis-increment file, opened read-only
//! - [`BackgroundDataset`]: the background file, opened for in-place update
//!
//! Variables are always read and written whole. Values are converted to and
//! from `f64` by the NetCDF library, so `float` and `double` variables are
//! handled alike. No attributes (units, `_FillValue`, scale factors) are
//! read or written.
//!
//! # Example
//!
//! ```rust,ignore
//! use bkg_update::io::{BackgroundDataset, IncrementDataset};
//!
//! let ai = IncrementDataset::open("ai.nc")?;
//! let mut bkg = BackgroundDataset::open("ocean_ini.nc")?;
//!
//! let temp = bkg.read_field("temp")?;
//! let ai_temp = ai.read_field("ai_temp")?;
//! bkg.write_field("temp", &(&temp + &ai_temp))?;
//!
//! bkg.close()?;
//! ai.close()?;
//! ```

use std::path::{Path, PathBuf};

use ndarray::IxDyn;
use thiserror::Error;

use crate::types::Field;

/// Error type for NetCDF operations.
#[derive(Debug, Error)]
pub enum NetCDFError {
    /// File could not be opened (missing, unreadable, not a NetCDF file)
    #[error("cannot open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: netcdf::Error,
    },

    /// NetCDF library error during read or write
    #[error("NetCDF error: {0}")]
    NetCDF(#[from] netcdf::Error),

    /// Invalid data
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Missing variable
    #[error("Missing variable `{name}` in {}", .path.display())]
    MissingVariable { path: PathBuf, name: String },

    /// Array shape does not match the variable on disk
    #[error("Shape mismatch for `{variable}`: expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        variable: String,
        expected: Vec<usize>,
        found: Vec<usize>,
    },
}

/// Shape of a variable as declared by its dimensions.
fn variable_shape(var: &netcdf::Variable) -> Vec<usize> {
    var.dimensions().iter().map(|d| d.len()).collect()
}

/// Read a whole variable into a field.
fn read_variable(file: &netcdf::File, path: &Path, name: &str) -> Result<Field, NetCDFError> {
    let var = file
        .variable(name)
        .ok_or_else(|| NetCDFError::MissingVariable {
            path: path.to_path_buf(),
            name: name.to_string(),
        })?;

    let shape = variable_shape(&var);
    let values: Vec<f64> = var.get_values(..)?;

    Field::from_shape_vec(IxDyn(&shape), values).map_err(|e| {
        NetCDFError::InvalidData(format!(
            "`{}` has shape {:?} but returned data does not fit: {}",
            name, shape, e
        ))
    })
}

// ============================================================================
// Increment dataset (read-only)
// ============================================================================

/// Analysis-increment dataset, opened read-only.
///
/// The file is never written through this handle.
pub struct IncrementDataset {
    path: PathBuf,
    file: netcdf::File,
}

impl IncrementDataset {
    /// Open an increment file in read-only mode.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, NetCDFError> {
        let path = path.as_ref().to_path_buf();
        let file = netcdf::open(&path).map_err(|source| NetCDFError::Open {
            path: path.clone(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "opened increment dataset (read-only)");
        Ok(Self { path, file })
    }

    /// Path this dataset was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the dataset has a variable with this name.
    pub fn has_variable(&self, name: &str) -> bool {
        self.file.variable(name).is_some()
    }

    /// Read a whole variable.
    pub fn read_field(&self, name: &str) -> Result<Field, NetCDFError> {
        read_variable(&self.file, &self.path, name)
    }

    /// Close the file, reporting any error from the library.
    ///
    /// Dropping the handle also closes it, but discards that error.
    pub fn close(self) -> Result<(), NetCDFError> {
        tracing::debug!(path = %self.path.display(), "closing increment dataset");
        self.file.close()?;
        Ok(())
    }
}

// ============================================================================
// Background dataset (read-write)
// ============================================================================

/// Background dataset, opened for in-place modification.
///
/// Writes go straight to the file. There is no staging or rollback: a
/// variable written before a later failure stays written.
pub struct BackgroundDataset {
    path: PathBuf,
    file: netcdf::FileMut,
}

impl BackgroundDataset {
    /// Open an existing background file in read-write mode.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, NetCDFError> {
        let path = path.as_ref().to_path_buf();
        let file = netcdf::append(&path).map_err(|source| NetCDFError::Open {
            path: path.clone(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "opened background dataset (read-write)");
        Ok(Self { path, file })
    }

    /// Path this dataset was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read a whole variable.
    pub fn read_field(&self, name: &str) -> Result<Field, NetCDFError> {
        read_variable(&self.file, &self.path, name)
    }

    /// Replace a whole variable with `field`.
    ///
    /// The field must have exactly the variable's shape.
    pub fn write_field(&mut self, name: &str, field: &Field) -> Result<(), NetCDFError> {
        let mut var = self
            .file
            .variable_mut(name)
            .ok_or_else(|| NetCDFError::MissingVariable {
                path: self.path.clone(),
                name: name.to_string(),
            })?;

        let expected = variable_shape(&var);
        if field.shape() != expected.as_slice() {
            return Err(NetCDFError::ShapeMismatch {
                variable: name.to_string(),
                expected,
                found: field.shape().to_vec(),
            });
        }

        // Logical (row-major) order matches the NetCDF layout
        let values: Vec<f64> = field.iter().copied().collect();
        var.put_values(&values, ..)?;
        Ok(())
    }

    /// Flush and close the file.
    ///
    /// NetCDF-4 files write buffered data and metadata here, so a failure
    /// means the written variables may not be on disk. Dropping the handle
    /// also closes it, but discards that error.
    pub fn close(self) -> Result<(), NetCDFError> {
        tracing::debug!(path = %self.path.display(), "closing background dataset");
        self.file.close()?;
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
