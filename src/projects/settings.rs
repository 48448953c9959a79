use crate::ir_frontend::compiler_errors::CompilerError;
use crate::return_config_error;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const IR_FILE_EXTENSION: &str = "ll";
pub const CONFIG_FILE_NAME: &str = "varcheck.toml";
pub const DEFAULT_PLOT_DIR: &str = "out";
pub const INTEGRATION_TESTS_PATH: &str = "tests/cases";

// Rough guess for the initial token Vec capacity, to avoid regrowing on typical files.
// Textual IR is dense, so about one token per 4 bytes of source.
pub const SRC_TO_TOKEN_RATIO: usize = 4;

/// Loaded from `varcheck.toml`. Every field is optional in the file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub name: String,
    pub check: CheckSettings,
    pub output: OutputSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CheckSettings {
    pub parallel: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputSettings {
    pub format: OutputFormat,
    pub plot_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl Config {
    pub fn from_toml_str(source: &str, path: &Path) -> Result<Self, CompilerError> {
        match toml::from_str(source) {
            Ok(config) => Ok(config),
            Err(e) => return_config_error!(path, e.to_string()),
        }
    }

    pub fn load(path: &Path) -> Result<Self, CompilerError> {
        let source = match fs::read_to_string(path) {
            Ok(source) => source,
            Err(e) => return_config_error!(path, format!("Could not read config file: {e}")),
        };

        Self::from_toml_str(&source, path)
    }

    /// Reads `varcheck.toml` from `dir` when it exists, otherwise defaults
    pub fn load_or_default(dir: &Path) -> Result<Self, CompilerError> {
        let path = dir.join(CONFIG_FILE_NAME);
        if !path.is_file() {
            return Ok(Config::default());
        }

        Self::load(&path)
    }
}

#[cfg(test)]
#[path = "tests/settings_tests.rs"]
mod settings_tests;
