use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::render::RenderContext;

const DEFAULT_CONFIG: &str = include_str!("default_config.toml");

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub output: OutputConfig,
    pub source: SourceConfig,
    pub log: LogConfig,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct OutputConfig {
    pub use_html_tags: bool,
    pub one_page: bool,
    pub title_as_filename: bool,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub snapshot_dir: PathBuf,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            snapshot_dir: PathBuf::from("snapshots"),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// The configuration bundled with the binary.
    ///
    /// `build.rs` rejects a malformed `default_config.toml`, so a parse failure
    /// here can only come from a schema mismatch and falls back to `Default`.
    pub fn compiled_default() -> Self {
        toml::from_str(DEFAULT_CONFIG).unwrap_or_default()
    }

    /// Load config from a TOML file, or return the compiled defaults if not found.
    pub fn load(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(content) => Ok(toml::from_str(&content)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Self::compiled_default()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn render_context(&self) -> RenderContext {
        RenderContext {
            use_html_tags: self.output.use_html_tags,
            one_page: self.output.one_page,
        }
    }
}
