//! Read → transform → write pipeline over the two datasets.
//!
//! The run walks a fixed sequence of stages:
//!
//! ```text
//! Start → FilesOpen → TempUpdated → SaltUpdated → FilesClosed → Done
//! ```
//!
//! Any failure stops the run where it is. Nothing is rolled back, so a
//! failure while updating salinity leaves the already-written temperature
//! in the background file. The returned error records the last stage that
//! was reached. Closing the background file flushes it; a close failure is
//! reported as an error after `SaltUpdated`, since the written fields may
//! not have reached the disk.

use std::fmt;
use std::path::Path;

use thiserror::Error;

use super::config::{TracerPair, UpdateConfig};
use super::rules::{IncrementRule, ShapeMismatch, UpdateStats};
use crate::io::{BackgroundDataset, IncrementDataset, NetCDFError};

/// Progress of an update run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Start,
    FilesOpen,
    TempUpdated,
    /// Both fields written; the background file is flushed on close.
    SaltUpdated,
    FilesClosed,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Start => "start",
            Self::FilesOpen => "files-open",
            Self::TempUpdated => "temp-updated",
            Self::SaltUpdated => "salt-updated",
            Self::FilesClosed => "files-closed",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

/// Error from an update run.
#[derive(Debug, Error)]
pub enum UpdateError {
    /// Opening, reading or writing a dataset failed
    #[error("dataset access failed after stage `{stage}`")]
    Dataset {
        stage: Stage,
        #[source]
        source: NetCDFError,
    },

    /// Background and increment variables have different shapes
    #[error("cannot add `{increment}` to `{background}` after stage `{stage}`")]
    ShapeMismatch {
        stage: Stage,
        background: String,
        increment: String,
        #[source]
        source: ShapeMismatch,
    },
}

impl UpdateError {
    /// Last stage reached before the failure.
    pub fn stage(&self) -> Stage {
        match self {
            Self::Dataset { stage, .. } | Self::ShapeMismatch { stage, .. } => *stage,
        }
    }
}

/// Result of updating one variable.
#[derive(Clone, Debug)]
pub struct VariableReport {
    /// Background variable name
    pub variable: String,
    /// Rule that was applied
    pub rule: IncrementRule,
    pub stats: UpdateStats,
}

/// Result of a full run.
#[derive(Clone, Debug)]
pub struct UpdateReport {
    pub temperature: VariableReport,
    pub salinity: VariableReport,
}

/// Applies analysis increments to a background file.
#[derive(Debug, Clone, Default)]
pub struct FieldUpdater {
    config: UpdateConfig,
}

fn enter(stage: Stage) -> Stage {
    tracing::trace!(%stage, "entering stage");
    stage
}

impl FieldUpdater {
    /// Create an updater with the given variable names.
    pub fn new(config: UpdateConfig) -> Self {
        Self { config }
    }

    /// Update the background file in place from the increment file.
    ///
    /// Temperature cells whose updated value would be negative keep their
    /// background value; salinity is always incremented.
    pub fn run(
        &self,
        increment_path: impl AsRef<Path>,
        background_path: impl AsRef<Path>,
    ) -> Result<UpdateReport, UpdateError> {
        let stage = enter(Stage::Start);
        let increment = IncrementDataset::open(increment_path)
            .map_err(|source| UpdateError::Dataset { stage, source })?;
        let mut background = BackgroundDataset::open(background_path)
            .map_err(|source| UpdateError::Dataset { stage, source })?;

        let stage = enter(Stage::FilesOpen);
        tracing::debug!(
            increment = %increment.path().display(),
            background = %background.path().display(),
            "datasets open"
        );
        let temperature = update_pair(
            stage,
            &self.config.temperature,
            IncrementRule::RevertNegative,
            &increment,
            &mut background,
        )?;

        let stage = enter(Stage::TempUpdated);
        let salinity = update_pair(
            stage,
            &self.config.salinity,
            IncrementRule::Unconditional,
            &increment,
            &mut background,
        )?;

        let stage = enter(Stage::SaltUpdated);
        background
            .close()
            .map_err(|source| UpdateError::Dataset { stage, source })?;
        increment
            .close()
            .map_err(|source| UpdateError::Dataset { stage, source })?;

        enter(Stage::FilesClosed);
        enter(Stage::Done);

        Ok(UpdateReport {
            temperature,
            salinity,
        })
    }
}

/// Read one background/increment pair, apply `rule`, write the result back.
fn update_pair(
    stage: Stage,
    pair: &TracerPair,
    rule: IncrementRule,
    increment: &IncrementDataset,
    background: &mut BackgroundDataset,
) -> Result<VariableReport, UpdateError> {
    let dataset_err = |source: NetCDFError| UpdateError::Dataset { stage, source };

    let bkg = background.read_field(&pair.background).map_err(dataset_err)?;
    let inc = increment.read_field(&pair.increment).map_err(dataset_err)?;

    let out = rule
        .apply(&bkg, &inc)
        .map_err(|source| UpdateError::ShapeMismatch {
            stage,
            background: pair.background.clone(),
            increment: pair.increment.clone(),
            source,
        })?;

    tracing::debug!(
        variable = %pair.background,
        before = ?out.stats.before,
        after = ?out.stats.after,
        "field range"
    );

    background
        .write_field(&pair.background, &out.field)
        .map_err(dataset_err)?;

    tracing::info!(
        variable = %pair.background,
        %rule,
        cells = out.stats.cells,
        reverted = out.stats.reverted,
        "applied increment"
    );

    Ok(VariableReport {
        variable: pair.background.clone(),
        rule,
        stats: out.stats,
    })
}

/// Update `temp` and `salt` in `background_path` from `ai_temp` and
/// `ai_salt` in `increment_path`.
pub fn update_background(
    increment_path: impl AsRef<Path>,
    background_path: impl AsRef<Path>,
) -> Result<UpdateReport, UpdateError> {
    FieldUpdater::default().run(increment_path, background_path)
}
