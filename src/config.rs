//! User configuration.
//!
//! ## Note for adding new keys
//!
//! New keys added to the config _must_ use `#[serde(default)]` to maintain compatibility with
//! older configs. These keys will be added to the user's configuration automatically.

use std::path::{Path, PathBuf};
use std::{fmt, str};

use directories::ProjectDirs;
use glstate_core::MAX_TEXTURE_UNITS;
use glstate_opengl::ContextProfile;
use log::LevelFilter;
use serde::{Deserialize, Serialize};

/// State application options.
#[derive(Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct ApplierConfig {
   /// The highest number of texture units to track. Values above the compile-time capacity are
   /// clamped.
   #[serde(default = "ApplierConfig::default_max_texture_units")]
   pub max_texture_units: usize,
}

impl ApplierConfig {
   fn default_max_texture_units() -> usize {
      MAX_TEXTURE_UNITS
   }
}

impl Default for ApplierConfig {
   fn default() -> Self {
      Self {
         max_texture_units: Self::default_max_texture_units(),
      }
   }
}

/// Which context the probe creates.
#[derive(Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ContextConfig {
   #[serde(default)]
   pub profile: ContextProfile,
}

/// The verbosity of the log.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
   Error,
   Warn,
   Info,
   Debug,
   Trace,
}

impl LogLevel {
   pub fn filter(self) -> LevelFilter {
      match self {
         Self::Error => LevelFilter::Error,
         Self::Warn => LevelFilter::Warn,
         Self::Info => LevelFilter::Info,
         Self::Debug => LevelFilter::Debug,
         Self::Trace => LevelFilter::Trace,
      }
   }
}

// fmt::Display implements to_string() for us
impl fmt::Display for LogLevel {
   fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
      write!(f, "{}", format!("{:?}", self).to_lowercase())
   }
}

impl str::FromStr for LogLevel {
   type Err = ();

   fn from_str(s: &str) -> Result<LogLevel, ()> {
      match s.to_lowercase().as_str() {
         "error" => Ok(Self::Error),
         "warn" => Ok(Self::Warn),
         "info" => Ok(Self::Info),
         "debug" => Ok(Self::Debug),
         "trace" => Ok(Self::Trace),
         _ => Err(()),
      }
   }
}

impl Default for LogLevel {
   fn default() -> Self {
      Self::Info
   }
}

/// Logging options.
#[derive(Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct LogConfig {
   #[serde(default)]
   pub level: LogLevel,
}

/// A user `config.toml` file.
#[derive(Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct UserConfig {
   #[serde(default)]
   pub applier: ApplierConfig,
   #[serde(default)]
   pub context: ContextConfig,
   #[serde(default)]
   pub log: LogConfig,
}

impl UserConfig {
   /// Returns the platform-specific configuration directory.
   pub fn config_dir() -> anyhow::Result<PathBuf> {
      let project_dirs = ProjectDirs::from("", "", "glstate")
         .ok_or_else(|| anyhow::anyhow!("cannot determine config directories"))?;
      Ok(project_dirs.config_dir().to_owned())
   }

   /// Returns the path to the default `config.toml` file.
   pub fn path() -> anyhow::Result<PathBuf> {
      Ok(Self::config_dir()?.join("config.toml"))
   }

   /// Loads the default `config.toml` file.
   ///
   /// If the `config.toml` doesn't exist, it's created with values inherited from
   /// `UserConfig::default`.
   pub fn load_or_create() -> anyhow::Result<Self> {
      Self::load_or_create_at(&Self::path()?)
   }

   /// Loads the config file at `path`, creating it (and its parent directories) with default
   /// values if it doesn't exist.
   pub fn load_or_create_at(path: &Path) -> anyhow::Result<Self> {
      if let Some(config_dir) = path.parent() {
         std::fs::create_dir_all(config_dir)?;
      }
      if !path.is_file() {
         let config = Self::default();
         config.save_at(path)?;
         Ok(config)
      } else {
         let file = std::fs::read_to_string(path)?;
         let config: Self = match toml::from_str(&file) {
            Ok(config) => config,
            Err(error) => {
               log::error!("error while deserializing config file: {}", error);
               log::error!("falling back to default config");
               return Ok(Self::default());
            }
         };
         // Preemptively save the config to the disk if any new keys have been added.
         config.save_at(path)?;
         Ok(config)
      }
   }

   /// Saves the user configuration to `path`.
   pub fn save_at(&self, path: &Path) -> anyhow::Result<()> {
      std::fs::write(path, toml::to_string(self)?)?;
      Ok(())
   }
}
