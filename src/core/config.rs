//! Build configuration from YAML

use crate::error::BuildError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Name of the optional config file looked up in the project root
pub const CONFIG_FILE_NAME: &str = "pwakit-build.yaml";

/// Packaging configuration
///
/// Every field has a default, so an absent or empty config file yields the
/// stock Next.js + PWA Kit layout driven through npm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Installs the PWA Kit project's dependencies
    pub install_command: String,

    /// Runs the framework's production build in the project root
    pub framework_build_command: String,

    /// Runs the secondary packaging build inside the PWA Kit directory
    pub packaging_build_command: String,

    /// Kill any subprocess still running after this many seconds
    pub command_timeout_secs: Option<u64>,

    /// Environment overrides for every subprocess
    pub env: HashMap<String, String>,

    /// PWA Kit directory, relative to the root
    pub pwakit_dir: String,

    /// Framework output directory, relative to the root
    pub framework_output_dir: String,

    /// Public asset directory, relative to the root
    pub public_dir: String,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            install_command: "npm install".to_string(),
            framework_build_command: "npm run build:next".to_string(),
            packaging_build_command: "npm run build:pwakit".to_string(),
            command_timeout_secs: None,
            env: HashMap::new(),
            pwakit_dir: ".pwakit".to_string(),
            framework_output_dir: ".next".to_string(),
            public_dir: "public".to_string(),
        }
    }
}

impl BuildConfig {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, BuildError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| BuildError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::parse(&content, path)
    }

    /// Parse configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, BuildError> {
        Self::parse(yaml, Path::new(CONFIG_FILE_NAME))
    }

    /// Load `pwakit-build.yaml` from `root`, or the defaults when it is absent
    pub fn load_or_default<P: AsRef<Path>>(root: P) -> Result<Self, BuildError> {
        let path = Self::default_path(root);
        if path.is_file() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn default_path<P: AsRef<Path>>(root: P) -> PathBuf {
        root.as_ref().join(CONFIG_FILE_NAME)
    }

    fn parse(yaml: &str, origin: &Path) -> Result<Self, BuildError> {
        // An empty file deserializes as `null`
        let config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(yaml).map_err(|e| BuildError::Config {
                path: origin.to_path_buf(),
                message: e.to_string(),
            })?
        };
        config.validate(origin)?;
        Ok(config)
    }

    /// Validate the configuration
    fn validate(&self, origin: &Path) -> Result<(), BuildError> {
        let invalid = |message: String| BuildError::Config {
            path: origin.to_path_buf(),
            message,
        };

        for (name, command) in [
            ("install_command", &self.install_command),
            ("framework_build_command", &self.framework_build_command),
            ("packaging_build_command", &self.packaging_build_command),
        ] {
            if command.trim().is_empty() {
                return Err(invalid(format!("{} must not be empty", name)));
            }
        }

        for (name, dir) in [
            ("pwakit_dir", &self.pwakit_dir),
            ("framework_output_dir", &self.framework_output_dir),
            ("public_dir", &self.public_dir),
        ] {
            if dir.trim().is_empty() {
                return Err(invalid(format!("{} must not be empty", name)));
            }
            if Path::new(dir).is_absolute() {
                return Err(invalid(format!(
                    "{} must be relative to the project root, got {}",
                    name, dir
                )));
            }
        }

        if self.command_timeout_secs == Some(0) {
            return Err(invalid("command_timeout_secs must be positive".to_string()));
        }

        Ok(())
    }

    /// Watchdog duration for subprocess stages
    pub fn command_timeout(&self) -> Option<Duration> {
        self.command_timeout_secs.map(Duration::from_secs)
    }
}
