use crate::extract::ExtractOptions;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub fail_fast: bool,
    pub respect_gitignore: bool,
    pub exclude: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    extract: Option<RawExtract>,
}

#[derive(Debug, Deserialize)]
struct RawExtract {
    fail_fast: Option<bool>,
    respect_gitignore: Option<bool>,
    exclude: Option<Vec<String>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fail_fast: false,
            respect_gitignore: true,
            exclude: Vec::new(),
        }
    }
}

impl Config {
    /// Load `.apigate.toml` from the given tree root; a missing file means
    /// defaults.
    pub fn load(project_path: &Path) -> Result<Self, ConfigError> {
        let config_path = project_path.join(".apigate.toml");

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&config_path)?;
        let raw: RawConfig = toml::from_str(&content)?;

        let defaults = Self::default();
        let config = match raw.extract {
            Some(extract) => Self {
                fail_fast: extract.fail_fast.unwrap_or(defaults.fail_fast),
                respect_gitignore: extract
                    .respect_gitignore
                    .unwrap_or(defaults.respect_gitignore),
                exclude: extract.exclude.unwrap_or(defaults.exclude),
            },
            None => defaults,
        };
        Ok(config)
    }

    /// Extraction options for this configuration, with the CLI-level
    /// fail-fast flag layered on top.
    pub fn extract_options(&self, fail_fast_override: bool) -> ExtractOptions {
        ExtractOptions {
            fail_fast: self.fail_fast || fail_fast_override,
            respect_gitignore: self.respect_gitignore,
            exclude: self.exclude.clone(),
        }
    }
}

pub fn generate_config_template() -> String {
    r#"# apigate configuration
# https://github.com/apigate/apigate

[extract]
# Abort on the first file that fails to parse instead of collecting errors.
fail_fast = false

# Honor .gitignore files while walking the source tree.
respect_gitignore = true

# Relative-path substrings to skip (tests, generated code, ...).
exclude = []
"#
    .to_string()
}
