//! Variable names used by the updater.

/// A background variable and the increment variable added to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracerPair {
    /// Variable name in the background file
    pub background: String,
    /// Variable name in the increment file
    pub increment: String,
}

impl TracerPair {
    /// Create a new pair.
    pub fn new(background: impl Into<String>, increment: impl Into<String>) -> Self {
        Self {
            background: background.into(),
            increment: increment.into(),
        }
    }
}

/// Configuration for [`FieldUpdater`](super::FieldUpdater).
///
/// Temperature always uses the revert-negative rule and salinity the
/// unconditional rule; only the variable names can be changed.
///
/// # Example
///
/// ```
/// use bkg_update::update::UpdateConfig;
///
/// let config = UpdateConfig::default();
/// assert_eq!(config.temperature.background, "temp");
/// assert_eq!(config.salinity.increment, "ai_salt");
///
/// // ROMS files written with capitalised names
/// let config = UpdateConfig::default()
///     .with_temperature("Temp", "ai_temp")
///     .with_salinity("Salt", "ai_salt");
/// assert_eq!(config.temperature.background, "Temp");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateConfig {
    /// Temperature pair (masked update)
    pub temperature: TracerPair,
    /// Salinity pair (unconditional update)
    pub salinity: TracerPair,
}

impl Default for UpdateConfig {
    fn default() -> Self {
        Self {
            temperature: TracerPair::new("temp", "ai_temp"),
            salinity: TracerPair::new("salt", "ai_salt"),
        }
    }
}

impl UpdateConfig {
    /// Set the temperature variable names.
    pub fn with_temperature(
        mut self,
        background: impl Into<String>,
        increment: impl Into<String>,
    ) -> Self {
        self.temperature = TracerPair::new(background, increment);
        self
    }

    /// Set the salinity variable names.
    pub fn with_salinity(
        mut self,
        background: impl Into<String>,
        increment: impl Into<String>,
    ) -> Self {
        self.salinity = TracerPair::new(background, increment);
        self
    }
}
