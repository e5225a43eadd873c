//! Configuration management for `partials.toml`.
//!
//! # Sections
//!
//! | Section      | Purpose                                          |
//! |--------------|--------------------------------------------------|
//! | `[build]`    | Source, output and root paths                    |
//! | `[partials]` | Partials root, generated dir, templated exts     |
//!
//! # Example
//!
//! ```toml
//! [build]
//! source = "src"
//! output = "out"
//!
//! [partials]
//! extensions = ["tpl"]
//! ```

mod build;
pub mod defaults;
mod error;
mod partials;

pub use build::BuildConfig;
pub use error::ConfigError;
pub use partials::PartialsConfig;

use crate::cli::{Cli, Commands};
use anyhow::{Result, bail};
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// Root Configuration
// ============================================================================

/// Root configuration structure representing partials.toml
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct SiteConfig {
    /// Build settings
    #[serde(default)]
    pub build: BuildConfig,

    /// Partial discovery and rendering settings
    #[serde(default)]
    pub partials: PartialsConfig,
}

impl SiteConfig {
    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: SiteConfig = toml::from_str(content).map_err(ConfigError::from)?;
        Ok(config)
    }

    /// Load configuration from file path
    pub fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        Self::from_str(&content)
    }

    /// Load configuration for a CLI invocation.
    ///
    /// A missing config file falls back to defaults; every path is then
    /// resolved against the root.
    pub fn load(cli: &Cli) -> Result<Self> {
        let root = cli.root.as_deref().unwrap_or(Path::new("./"));
        let config_path = root.join(&cli.config);

        let mut config = if config_path.exists() {
            Self::from_path(&config_path)?
        } else {
            Self::default()
        };
        config.update_with_cli(cli);
        config.validate()?;
        Ok(config)
    }

    /// Get the root directory path
    pub fn get_root(&self) -> &Path {
        self.build.root.as_deref().unwrap_or(Path::new("./"))
    }

    /// Absolute partials root: `<source>/<partials.dir>`.
    pub fn partials_root(&self) -> PathBuf {
        self.build.source.join(&self.partials.dir)
    }

    /// Directory erased after every write pass.
    pub fn generated_dir(&self) -> PathBuf {
        self.partials_root().join(&self.partials.generated)
    }

    /// Update configuration with CLI arguments
    pub fn update_with_cli(&mut self, cli: &Cli) {
        let root = cli
            .root
            .as_ref()
            .cloned()
            .unwrap_or_else(|| self.get_root().to_owned());
        let root = Self::normalize_path(&root);

        self.build.root = Some(root.clone());
        self.build.source = Self::normalize_path(&root.join(&self.build.source));
        self.build.output = Self::normalize_path(&root.join(&self.build.output));

        if let Commands::Build { clean: true } = cli.command {
            self.build.clean = true;
        }
    }

    /// Normalize a path to absolute, using canonicalize if the path exists
    fn normalize_path(path: &Path) -> PathBuf {
        path.canonicalize().unwrap_or_else(|_| {
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                std::env::current_dir()
                    .map(|cwd| cwd.join(path))
                    .unwrap_or_else(|_| path.to_path_buf())
            }
        })
    }

    /// Validate paths after they have been resolved against the root.
    pub fn validate(&self) -> Result<()> {
        if !self.build.source.is_dir() {
            bail!(ConfigError::Validation(format!(
                "[build.source] `{}` is not a directory",
                self.build.source.display()
            )));
        }

        Self::check_relative("[partials.dir]", &self.partials.dir)?;
        Self::check_relative("[partials.generated]", &self.partials.generated)?;

        if self.build.output.starts_with(&self.build.source) {
            bail!(ConfigError::Validation(
                "[build.output] must not live inside [build.source]".into()
            ));
        }

        Ok(())
    }

    /// Reject empty or absolute sub-directory settings.
    fn check_relative(field: &str, path: &Path) -> Result<()> {
        if path.as_os_str().is_empty() {
            bail!(ConfigError::Validation(format!("{field} must not be empty")));
        }
        if path.is_absolute() {
            bail!(ConfigError::Validation(format!("{field} must be a relative path")));
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
