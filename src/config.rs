use crate::error::{ReleasePlanError, Result};
use crate::targets::ReleaseTarget;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// The recognized public hub hostname. Pushes here use the short login form.
pub const PUBLIC_HUB_HOST: &str = "hub.docker.com";

/// Complete configuration for release-plan.
///
/// Targets are kept as an ordered list: the first declared target whose
/// predicates accept the resolved version wins, so declaration order is
/// part of the configuration's meaning.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    /// Externally supplied build-type label matched by target predicates.
    #[serde(default = "default_build_type")]
    pub build_type: String,

    /// Where the canonical version string is persisted on a bump.
    #[serde(default)]
    pub version_file: Option<PathBuf>,

    #[serde(default = "default_targets")]
    pub targets: Vec<ReleaseTarget>,

    #[serde(default)]
    pub registry: RegistryConfig,
}

fn default_build_type() -> String {
    "release".to_string()
}

fn default_targets() -> Vec<ReleaseTarget> {
    let mut release = ReleaseTarget::new("release", r"=?v?\d+\.\d+\.\d+");
    release.artifacts = true;

    let mut snapshot = ReleaseTarget::new("snapshot", ".*");
    snapshot.artifacts = false;

    vec![release, snapshot]
}

/// Container registry coordinates and credentials.
///
/// An empty host means local-only: no login is required and no push actions
/// are planned.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct RegistryConfig {
    #[serde(default)]
    pub host: String,

    #[serde(default)]
    pub org: Option<String>,

    #[serde(default)]
    pub repo_name: String,

    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub api_token: String,
}

impl RegistryConfig {
    pub fn is_local(&self) -> bool {
        self.host.is_empty()
    }

    pub fn is_hub(&self) -> bool {
        self.host == PUBLIC_HUB_HOST
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            build_type: default_build_type(),
            version_file: None,
            targets: default_targets(),
            registry: RegistryConfig::default(),
        }
    }
}

impl Config {
    /// Validate the whole configuration eagerly, before any resolution runs.
    ///
    /// Catches bad target patterns and duplicate target names here rather
    /// than on first access mid-pipeline.
    pub fn validate(&self) -> Result<()> {
        if self.targets.is_empty() {
            return Err(ReleasePlanError::config(
                "At least one release target must be declared",
            ));
        }
        let mut seen = HashSet::new();
        for target in &self.targets {
            target.validate()?;
            if !seen.insert(target.name.as_str()) {
                return Err(ReleasePlanError::config(format!(
                    "Duplicate release target name '{}'",
                    target.name
                )));
            }
        }
        Ok(())
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `releaseplan.toml` in current directory
/// 3. `.releaseplan.toml` in the user config directory
/// 4. Default configuration if no file found
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    let config_str = if let Some(path) = config_path {
        fs::read_to_string(path)?
    } else if Path::new("./releaseplan.toml").exists() {
        fs::read_to_string("./releaseplan.toml")?
    } else if let Some(config_dir) = dirs::config_dir() {
        let config_path = config_dir.join(".releaseplan.toml");
        if config_path.exists() {
            fs::read_to_string(config_path)?
        } else {
            return Ok(Config::default());
        }
    } else {
        return Ok(Config::default());
    };

    let config: Config = toml::from_str(&config_str)
        .map_err(|e| ReleasePlanError::config(format!("Could not parse configuration: {}", e)))?;
    config.validate()?;
    Ok(config)
}
