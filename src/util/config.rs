//! Configuration file support for drydock.
//!
//! drydock reads two configuration files:
//! - Global: `~/.drydock/config.toml` - User-wide defaults
//! - Project: `.drydock/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config. Anything left unset
//! falls back to the npm defaults below.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Default directory the publishable tree is staged into.
pub const DEFAULT_PUBLISH_DIR: &str = "_publish";

/// Default registry packages are published to.
pub const DEFAULT_REGISTRY_URL: &str = "https://registry.npmjs.org";

/// Default environment variable holding the registry access token.
pub const DEFAULT_TOKEN_ENV: &str = "NPM_ACCESS_TOKEN";

pub const DEFAULT_LINT_COMMAND: &str = "npm run lint";
pub const DEFAULT_TEST_COMMAND: &str = "npm test";
pub const DEFAULT_BUILD_COMMAND: &str = "npm run build";
pub const DEFAULT_PUBLISH_COMMAND: &str = "npm publish";

/// drydock configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Deploy settings
    pub deploy: DeployConfig,
}

/// Deploy-related configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DeployConfig {
    /// Directory the build writes compiled output to
    pub build_dir: Option<PathBuf>,

    /// Directory the publishable tree is staged into
    pub publish_dir: Option<PathBuf>,

    pub lint_command: Option<String>,
    pub test_command: Option<String>,
    pub build_command: Option<String>,
    pub publish_command: Option<String>,

    /// Registry URL written to `.npmrc`, and the publish target when not the default
    pub registry_url: Option<String>,

    /// Environment variable holding the access token
    pub token_env: Option<String>,

    /// Command lines run after a step, keyed by step name or number
    pub hooks: BTreeMap<String, String>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        let (ours, theirs) = (&mut self.deploy, other.deploy);

        if theirs.build_dir.is_some() {
            ours.build_dir = theirs.build_dir;
        }
        if theirs.publish_dir.is_some() {
            ours.publish_dir = theirs.publish_dir;
        }
        if theirs.lint_command.is_some() {
            ours.lint_command = theirs.lint_command;
        }
        if theirs.test_command.is_some() {
            ours.test_command = theirs.test_command;
        }
        if theirs.build_command.is_some() {
            ours.build_command = theirs.build_command;
        }
        if theirs.publish_command.is_some() {
            ours.publish_command = theirs.publish_command;
        }
        if theirs.registry_url.is_some() {
            ours.registry_url = theirs.registry_url;
        }
        if theirs.token_env.is_some() {
            ours.token_env = theirs.token_env;
        }
        ours.hooks.extend(theirs.hooks);
    }
}

impl DeployConfig {
    pub fn publish_dir(&self) -> PathBuf {
        self.publish_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PUBLISH_DIR))
    }

    pub fn lint_command(&self) -> &str {
        self.lint_command.as_deref().unwrap_or(DEFAULT_LINT_COMMAND)
    }

    pub fn test_command(&self) -> &str {
        self.test_command.as_deref().unwrap_or(DEFAULT_TEST_COMMAND)
    }

    pub fn build_command(&self) -> &str {
        self.build_command.as_deref().unwrap_or(DEFAULT_BUILD_COMMAND)
    }

    pub fn publish_command(&self) -> &str {
        self.publish_command
            .as_deref()
            .unwrap_or(DEFAULT_PUBLISH_COMMAND)
    }

    pub fn registry_url(&self) -> &str {
        self.registry_url.as_deref().unwrap_or(DEFAULT_REGISTRY_URL)
    }

    pub fn token_env(&self) -> &str {
        self.token_env.as_deref().unwrap_or(DEFAULT_TOKEN_ENV)
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.drydock/config.toml)
/// 2. Global config (~/.drydock/config.toml)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    if let Some(global_path) = global_path {
        config.merge(Config::load_or_default(global_path));
    }

    config.merge(Config::load_or_default(project_path));

    config
}

/// Get the global drydock config directory (~/.drydock).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".drydock"))
}

/// Get the global config path (~/.drydock/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (.drydock/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".drydock").join("config.toml")
}
