//! Configuration for shoebox.
//!
//! Values are layered, later layers winning:
//!
//! 1. built-in defaults,
//! 2. a TOML, YAML or JSON file (chosen by extension),
//! 3. `SHOEBOX_` environment variables, with `__` separating nested keys
//!    (`SHOEBOX_IMPORT__ALLOW_DUPLICATES=true`).
//!
//! ```toml
//! [folder]
//! full_path = "%date/%album|%location|\"Unknown Location\""
//! date = "%Y-%m-%b"
//! location = "%city"
//!
//! [file]
//! name = "%date-%original_name-%title.%extension"
//! capitalization = "lower"
//!
//! [import]
//! allow_duplicates = false
//! ```

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::{OptionExt, ResultExt};
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};
use shoebox_template::{FileDefinition, FolderDefinition, PathGenerator};
use std::path::{Path, PathBuf};
use tracing::instrument;

const APPLICATION: &str = "shoebox";
const ENV_PREFIX: &str = "SHOEBOX_";
const LEDGER_FILE: &str = "hash.json";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub folder: FolderDefinition,
    #[serde(default)]
    pub file: FileDefinition,
    #[serde(default)]
    pub import: ImportConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportConfig {
    /// Import content even when the ledger says it was imported before.
    #[serde(default)]
    pub allow_duplicates: bool,
    /// Location of the checksum ledger; see [`Config::ledger_path`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ledger: Option<PathBuf>,
}

impl Config {
    /// Loads defaults, then the file at `path`, then the environment.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            exn::bail!(ErrorKind::Load(path.to_path_buf()));
        }
        let figment = match path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase).as_deref() {
            Some("toml") => Self::defaults().merge(Toml::file(path)),
            Some("yaml" | "yml") => Self::defaults().merge(Yaml::file(path)),
            Some("json") => Self::defaults().merge(Json::file(path)),
            _ => exn::bail!(ErrorKind::UnsupportedFormat(path.to_path_buf())),
        };
        let config = figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .or_raise(|| ErrorKind::Load(path.to_path_buf()))?;
        tracing::debug!("Loaded configuration");
        Ok(config)
    }

    /// Loads `config.toml` from the platform configuration directory when it
    /// exists, otherwise defaults overlaid with the environment.
    pub fn discover() -> Result<Self> {
        if let Some(path) = Self::project_dirs().map(|d| d.config_dir().join(CONFIG_FILE))
            && path.is_file()
        {
            return Self::load(path);
        }
        tracing::debug!("No configuration file found, using defaults");
        Self::from_env()
    }

    /// Defaults overlaid with the environment only.
    pub fn from_env() -> Result<Self> {
        Self::defaults()
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .or_raise(|| ErrorKind::Load(PathBuf::from(ENV_PREFIX)))
    }

    fn defaults() -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
    }

    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("", "", APPLICATION)
    }

    /// The configured ledger, or `hash.json` in the platform data directory.
    pub fn ledger_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.import.ledger {
            return Ok(path.clone());
        }
        Self::project_dirs()
            .map(|d| d.data_dir().join(LEDGER_FILE))
            .ok_or_raise(|| ErrorKind::NoDataDirectory)
    }

    /// Compiles the folder and file templates.
    pub fn generator(&self) -> Result<PathGenerator> {
        PathGenerator::new(&self.folder, &self.file).or_raise(|| ErrorKind::Template)
    }
}
