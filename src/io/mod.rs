//! I/O for the background and analysis-increment datasets.
//!
//! Both datasets are NetCDF files exposing named numeric variables:
//!
//! - **Increment file** (`ai_file`): `ai_temp`, `ai_salt`, read-only
//! - **Background file** (`bkgfile`): `temp`, `salt`, updated in place
//!
//! Only whole-variable reads and writes are supported; see
//! [`BackgroundDataset`] and [`IncrementDataset`].

mod netcdf_io;

pub use netcdf_io::{BackgroundDataset, IncrementDataset, NetCDFError};
