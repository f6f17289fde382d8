use config::{Config, ConfigError, Environment, File};
use directories::ProjectDirs;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::model::Node;
use crate::{DEFAULT_NODE_HEIGHT, DEFAULT_NODE_WIDTH};

pub const ENV_PREFIX: &str = "MINDMAP";

/// Settings for the `mindmap` tool.
///
/// Later sources win: built-in defaults, `config.toml` in the platform
/// config directory, an explicit file, then `MINDMAP_*` variables.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MindMapConfig {
    /// Width given to nodes created without an explicit size.
    pub default_width: f64,
    /// Height given to nodes created without an explicit size.
    pub default_height: f64,
    /// Indent JSON when writing maps.
    pub pretty: bool,
}

impl Default for MindMapConfig {
    fn default() -> Self {
        Self {
            default_width: DEFAULT_NODE_WIDTH,
            default_height: DEFAULT_NODE_HEIGHT,
            pretty: true,
        }
    }
}

impl MindMapConfig {
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let mut builder = Config::builder()
            .set_default("default_width", defaults.default_width)?
            .set_default("default_height", defaults.default_height)?
            .set_default("pretty", defaults.pretty)?;

        if let Some(path) = user_config_path() {
            builder = builder.add_source(File::from(path).required(false));
        }
        if let Some(path) = explicit {
            builder = builder.add_source(File::from(path));
        }
        builder = builder.add_source(Environment::with_prefix(ENV_PREFIX));

        let config: Self = builder.build()?.try_deserialize()?;
        config.check()?;
        Ok(config)
    }

    /// Unattached node carrying the configured default size.
    pub fn node(&self, id: impl Into<String>, text: impl Into<String>) -> Node {
        Node::new(id, text).sized(self.default_width, self.default_height)
    }

    fn check(&self) -> Result<(), ConfigError> {
        for (key, value) in [
            ("default_width", self.default_width),
            ("default_height", self.default_height),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Message(format!(
                    "{key} must be a finite, non-negative number, got {value}"
                )));
            }
        }
        Ok(())
    }
}

pub fn user_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "mindmap").map(|dirs| dirs.config_dir().join("config.toml"))
}
