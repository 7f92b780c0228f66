use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::dictionary::DictionarySource;
use crate::error::ConfigError;
use crate::selector::{LengthFilter, WordSelector};
use crate::speed::MeasureUnit;

/// Stored defaults. Length bounds use 0 for "no bound".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub min_length: usize,
    pub max_length: usize,
    pub amount: usize,
    pub top: usize,
    pub dictionary: Option<PathBuf>,
    pub dictionary_size: usize,
    pub measure_units: MeasureUnit,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min_length: 2,
            max_length: 0,
            amount: 25,
            top: 200,
            dictionary: None,
            dictionary_size: 20_000,
            measure_units: MeasureUnit::Wpm,
        }
    }
}

impl Config {
    /// Checks the values and produces what a run needs.
    pub fn validate(&self, seed: Option<u64>) -> Result<Settings, ConfigError> {
        if self.amount == 0 {
            return Err(ConfigError::ZeroAmount);
        }
        if self.top == 0 {
            return Err(ConfigError::ZeroTop);
        }
        if self.max_length > 0 && self.min_length > self.max_length {
            return Err(ConfigError::LengthRange {
                min: self.min_length,
                max: self.max_length,
            });
        }

        Ok(Settings {
            filter: LengthFilter::from_flags(self.min_length, self.max_length),
            top_n: self.top,
            amount: self.amount,
            dictionary: self.dictionary.clone().into(),
            dictionary_size: self.dictionary_size,
            measure_units: self.measure_units,
            seed,
        })
    }
}

/// Validated settings for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub filter: LengthFilter,
    pub top_n: usize,
    pub amount: usize,
    pub dictionary: DictionarySource,
    pub dictionary_size: usize,
    pub measure_units: MeasureUnit,
    pub seed: Option<u64>,
}

impl Settings {
    pub fn selector(&self) -> WordSelector {
        WordSelector::new(self.filter, self.top_n, self.amount)
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "typer") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("typer_config.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        let Ok(bytes) = fs::read(&self.path) else {
            debug!(path = %self.path.display(), "no config file, using defaults");
            return Config::default();
        };
        match serde_json::from_slice::<Config>(&bytes) {
            Ok(cfg) => cfg,
            Err(err) => {
                warn!(path = %self.path.display(), %err, "ignoring malformed config file");
                Config::default()
            }
        }
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)
    }
}
