//! Runtime configuration.
//!
//! Values come from built-in defaults, then an optional TOML file, then
//! `DOC_QUIZ_*` environment variables. Command-line flags are applied last by
//! the binary.

use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::protocol::DEFAULT_PORT;

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "doc-quiz.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid value for {key}: '{value}'")]
    InvalidEnv { key: &'static str, value: String },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerSettings,
    pub generator: GeneratorSettings,
    pub ocr: OcrSettings,
    pub client: ClientSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub bind: SocketAddr,
    /// Origin allowed by CORS, e.g. a browser front end's dev server.
    pub cors_origin: String,
    pub max_upload_bytes: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], DEFAULT_PORT)),
            cors_origin: "http://localhost:5173".to_string(),
            max_upload_bytes: 20 * 1024 * 1024,
        }
    }
}

/// How to launch the generation script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorSettings {
    pub program: String,
    /// Script passed as the first argument; omitted when `None`.
    pub script: Option<PathBuf>,
    pub working_dir: Option<PathBuf>,
    pub timeout_secs: u64,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            program: "python3".to_string(),
            script: Some(PathBuf::from("main.py")),
            working_dir: None,
            timeout_secs: 120,
        }
    }
}

impl GeneratorSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrSettings {
    pub program: String,
    pub language: String,
    pub timeout_secs: u64,
}

impl Default for OcrSettings {
    fn default() -> Self {
        Self {
            program: "tesseract".to_string(),
            language: "eng".to_string(),
            timeout_secs: 60,
        }
    }
}

impl OcrSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    pub api_url: String,
    pub log_file: PathBuf,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_url: format!("http://localhost:{}", DEFAULT_PORT),
            log_file: PathBuf::from("doc-quiz.log"),
        }
    }
}

impl Config {
    /// Load configuration.
    ///
    /// An explicit `path` must exist. Without one, `doc-quiz.toml` is read if
    /// present. Environment overrides are applied in both cases.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.exists() {
                    Self::from_file(default)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply `DOC_QUIZ_*` overrides read through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("DOC_QUIZ_BIND") {
            self.server.bind = parse_env("DOC_QUIZ_BIND", value)?;
        }
        if let Some(value) = lookup("DOC_QUIZ_CORS_ORIGIN") {
            self.server.cors_origin = value;
        }
        if let Some(value) = lookup("DOC_QUIZ_MAX_UPLOAD_BYTES") {
            self.server.max_upload_bytes = parse_env("DOC_QUIZ_MAX_UPLOAD_BYTES", value)?;
        }
        if let Some(value) = lookup("DOC_QUIZ_GENERATOR_PROGRAM") {
            self.generator.program = value;
        }
        if let Some(value) = lookup("DOC_QUIZ_GENERATOR_SCRIPT") {
            self.generator.script = (!value.is_empty()).then(|| PathBuf::from(value));
        }
        if let Some(value) = lookup("DOC_QUIZ_GENERATOR_DIR") {
            self.generator.working_dir = Some(PathBuf::from(value));
        }
        if let Some(value) = lookup("DOC_QUIZ_GENERATOR_TIMEOUT_SECS") {
            self.generator.timeout_secs = parse_env("DOC_QUIZ_GENERATOR_TIMEOUT_SECS", value)?;
        }
        if let Some(value) = lookup("DOC_QUIZ_OCR_PROGRAM") {
            self.ocr.program = value;
        }
        if let Some(value) = lookup("DOC_QUIZ_OCR_LANGUAGE") {
            self.ocr.language = value;
        }
        if let Some(value) = lookup("DOC_QUIZ_OCR_TIMEOUT_SECS") {
            self.ocr.timeout_secs = parse_env("DOC_QUIZ_OCR_TIMEOUT_SECS", value)?;
        }
        if let Some(value) = lookup("DOC_QUIZ_API_URL") {
            self.client.api_url = value;
        }
        if let Some(value) = lookup("DOC_QUIZ_LOG_FILE") {
            self.client.log_file = PathBuf::from(value);
        }
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(key: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidEnv { key, value })
}
