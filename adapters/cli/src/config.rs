use std::{fs, path::Path};

use anyhow::{Context, Result};
use gridcaster_core::{
    ConfigError, MotionConfig, Palette, ScreenConfig, ViewConfig, WeaponConfig, WorldConfig,
};
use serde::{Deserialize, Serialize};

/// Every tunable of a Gridcaster session, loaded from a single TOML file.
///
/// Missing sections and fields fall back to the built-in defaults.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Layout, player start and actor spawns.
    pub world: WorldConfig,
    /// Ray marching, projection and shading.
    pub view: ViewConfig,
    /// Player speeds.
    pub motion: MotionConfig,
    /// Fire-rate and recoil.
    pub weapon: WeaponConfig,
    /// Frame buffer size and minimap.
    pub screen: ScreenConfig,
    /// Colors.
    pub palette: Palette,
}

impl GameConfig {
    /// Reads and validates the configuration stored at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read configuration at {}", path.display()))?;
        Self::from_toml_str(&contents)
            .with_context(|| format!("invalid configuration in {}", path.display()))
    }

    /// Parses and validates a configuration document.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents).context("failed to parse configuration toml")?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every section's scalar constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.world.validate()?;
        self.view.validate()?;
        self.motion.validate()?;
        self.screen.validate()
    }
}
