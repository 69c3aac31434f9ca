//! Configuration loading and resolution
//!
//! Every setting is resolved in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_DOWNLOADS_DIR: &str = "downloads";
pub const DEFAULT_EXTRACTOR: &str = "yt-dlp";
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

pub const ENV_CONFIG: &str = "ZEN_CONFIG";
pub const ENV_HOST: &str = "ZEN_HOST";
pub const ENV_PORT: &str = "ZEN_PORT";
pub const ENV_DOWNLOADS_DIR: &str = "ZEN_DOWNLOADS_DIR";
pub const ENV_EXTRACTOR: &str = "ZEN_EXTRACTOR";
pub const ENV_TIMEOUT_SECS: &str = "ZEN_TIMEOUT_SECS";

/// Contents of the TOML config file. All keys are optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub downloads_dir: Option<PathBuf>,
    #[serde(default)]
    pub extractor: ExtractorSection,
    #[serde(default)]
    pub classifier: ClassifierSection,
}

/// `[extractor]` table
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExtractorSection {
    pub program: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// `[classifier]` table
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClassifierSection {
    #[serde(default)]
    pub rules: Vec<ClassifierRuleConfig>,
}

/// One `[[classifier.rules]]` entry: any phrase matching selects `message`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClassifierRuleConfig {
    pub phrases: Vec<String>,
    pub message: String,
}

/// Values supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub downloads_dir: Option<PathBuf>,
    pub extractor: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// Fully resolved service settings
#[derive(Debug, Clone)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub downloads_dir: PathBuf,
    pub extractor_program: String,
    pub timeout: Duration,
    pub classifier_rules: Vec<ClassifierRuleConfig>,
}

impl Settings {
    /// Resolve settings from CLI overrides, the process environment and a TOML config
    pub fn resolve(cli: CliOverrides, toml: TomlConfig) -> Result<Self> {
        let host = pick(cli.host, env_value(ENV_HOST)?, toml.host, DEFAULT_HOST.to_string());
        let port = pick(cli.port, env_value(ENV_PORT)?, toml.port, DEFAULT_PORT);
        let downloads_dir = pick(
            cli.downloads_dir,
            env_value(ENV_DOWNLOADS_DIR)?,
            toml.downloads_dir,
            PathBuf::from(DEFAULT_DOWNLOADS_DIR),
        );
        let extractor_program = pick(
            cli.extractor,
            env_value(ENV_EXTRACTOR)?,
            toml.extractor.program,
            DEFAULT_EXTRACTOR.to_string(),
        );
        let timeout_secs = pick(
            cli.timeout_secs,
            env_value(ENV_TIMEOUT_SECS)?,
            toml.extractor.timeout_secs,
            DEFAULT_TIMEOUT_SECS,
        );

        if timeout_secs == 0 {
            return Err(Error::Config("Extractor timeout must be at least 1 second".to_string()));
        }
        if extractor_program.trim().is_empty() {
            return Err(Error::Config("Extractor program must not be empty".to_string()));
        }
        for rule in &toml.classifier.rules {
            if rule.phrases.iter().all(|p| p.trim().is_empty()) {
                return Err(Error::Config(format!(
                    "Classifier rule '{}' has no phrases",
                    rule.message
                )));
            }
        }

        Ok(Self {
            host,
            port,
            downloads_dir,
            extractor_program,
            timeout: Duration::from_secs(timeout_secs),
            classifier_rules: toml.classifier.rules,
        })
    }

    /// `host:port` string for binding the listener
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn pick<T>(cli: Option<T>, env: Option<T>, toml: Option<T>, default: T) -> T {
    cli.or(env).or(toml).unwrap_or(default)
}

/// Read and parse an environment variable; unset or empty means absent
fn env_value<T: FromStr>(name: &str) -> Result<Option<T>> {
    match std::env::var(name) {
        Ok(raw) if raw.trim().is_empty() => Ok(None),
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| Error::Config(format!("Invalid value for {}: {:?}", name, raw))),
        Err(_) => Ok(None),
    }
}

/// Default config file location for the platform
///
/// Linux: `~/.config/zen-downloader/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("zen-downloader").join("config.toml"))
}

/// Parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
}

/// Locate and load the config file.
///
/// An explicitly requested file (CLI or `ZEN_CONFIG`) must exist. The platform
/// default is optional: when missing, defaults apply.
pub fn load_config(explicit: Option<&Path>) -> Result<TomlConfig> {
    let env_path = std::env::var(ENV_CONFIG)
        .ok()
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from);

    if let Some(path) = explicit.map(Path::to_path_buf).or(env_path) {
        info!("Loading config file {}", path.display());
        return load_toml_config(&path);
    }

    match default_config_path() {
        Some(path) if path.exists() => {
            info!("Loading config file {}", path.display());
            load_toml_config(&path)
        }
        _ => {
            info!("No config file found, using defaults");
            Ok(TomlConfig::default())
        }
    }
}

/// Ensure the downloads directory exists
pub fn ensure_directory_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
        info!("Created downloads directory {}", path.display());
    }
    Ok(())
}
