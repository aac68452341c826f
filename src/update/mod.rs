//! Background field update.
//!
//! - [`rules`]: pure per-cell rules (masked temperature, unconditional salinity)
//! - [`FieldUpdater`]: runs the rules against the two NetCDF files
//!
//! # Example
//!
//! ```rust,ignore
//! use bkg_update::update::{FieldUpdater, UpdateConfig};
//!
//! let report = FieldUpdater::new(UpdateConfig::default()).run("ai.nc", "bkg.nc")?;
//! println!("{} temp cells reverted", report.temperature.stats.reverted);
//! ```

mod config;
mod pipeline;
pub mod rules;

pub use config::{TracerPair, UpdateConfig};
pub use pipeline::{
    FieldUpdater, Stage, UpdateError, UpdateReport, VariableReport, update_background,
};
pub use rules::{
    IncrementRule, RuleOutput, ShapeMismatch, UpdateStats, apply_increment,
    apply_masked_increment, negative_sum_mask,
};
