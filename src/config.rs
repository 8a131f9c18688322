use std::path::Path;

use commit_lanes_dirs::DirType;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::AppResult;
use crate::palette::{Palette, Rgb};

pub static CONFIG_FILE: &str = "config.json";

/// Settings read from `config.json` in the config directory.
///
/// Every field is optional; command-line flags win over the file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub palette: Option<Vec<Rgb>>,
    pub max_count: Option<usize>,
    pub all_branches: bool,
}

impl Config {
    /// Load from the user's config directory, or defaults when there is no file.
    #[tracing::instrument(name = "Loading configuration", level = "debug")]
    pub fn load() -> AppResult<Self> {
        match DirType::Config.existing_file(CONFIG_FILE)? {
            Some(path) => Self::from_path(&path),
            None => {
                debug!("No configuration file in {}, using defaults", DirType::Config);
                Ok(Self::default())
            }
        }
    }

    pub fn from_path(path: &Path) -> AppResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&raw)?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn palette(&self) -> AppResult<Palette> {
        match &self.palette {
            Some(colors) => Palette::new(colors.clone()),
            None => Ok(Palette::default()),
        }
    }
}
