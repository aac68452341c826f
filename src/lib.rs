//! # bkg-update
//!
//! Apply analysis increments to the temperature and salinity fields of a
//! background NetCDF file (e.g. a ROMS initial-condition file).
//!
//! The crate provides:
//! - Whole-variable NetCDF access for the increment and background files
//! - Pure update rules: temperature increments are discarded for cells that
//!   would turn negative, salinity increments are always applied
//! - A [`FieldUpdater`] that runs read → transform → write over both files

pub mod io;
pub mod types;
pub mod update;

// Re-export main types for convenience
pub use io::{BackgroundDataset, IncrementDataset, NetCDFError};
pub use types::{Field, FieldRange};
pub use update::{
    FieldUpdater, IncrementRule, Stage, UpdateConfig, UpdateError, UpdateReport, UpdateStats,
    update_background,
};
