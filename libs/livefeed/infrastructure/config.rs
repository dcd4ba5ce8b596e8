use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

use crate::engine::EngineSettings;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load config file: {0}")]
    FileError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Feed engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Only listed soccer events whose league contains this text are active
    #[serde(default)]
    pub league_filter: Option<String>,
    /// Entries kept per event in the explain log
    #[serde(default = "default_frame_log_capacity")]
    pub frame_log_capacity: usize,
    #[serde(default)]
    pub stale: StaleConfig,
    #[serde(default)]
    pub capture: CaptureConfig,
    #[serde(default)]
    pub targets: TargetsConfig,
    #[serde(default)]
    pub debug: DebugConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaleConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_remove_after_secs")]
    pub remove_after_secs: i64,
}

impl Default for StaleConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            remove_after_secs: default_remove_after_secs(),
        }
    }
}

/// Goal capture window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_goal_frames")]
    pub frames_before: usize,
    #[serde(default = "default_goal_frames")]
    pub frames_after: usize,
    #[serde(default = "default_dump_dir")]
    pub dump_dir: String,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            frames_before: default_goal_frames(),
            frames_after: default_goal_frames(),
            dump_dir: default_dump_dir(),
        }
    }
}

/// Match page targets handed to the browser layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetsConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_url_prefix")]
    pub prefix: String,
    #[serde(default = "default_url_suffix")]
    pub suffix: String,
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: i64,
    /// Default number of targets per request
    #[serde(default = "default_target_limit")]
    pub limit: usize,
}

impl Default for TargetsConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            prefix: default_url_prefix(),
            suffix: default_url_suffix(),
            cooldown_secs: default_cooldown_secs(),
            limit: default_target_limit(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebugConfig {
    /// Raw frames kept for the debug preview
    #[serde(default = "default_preview_max")]
    pub preview_max: usize,
    /// Characters kept per previewed frame
    #[serde(default = "default_preview_chars")]
    pub preview_chars: usize,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            preview_max: default_preview_max(),
            preview_chars: default_preview_chars(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_frame_log_capacity() -> usize {
    50
}

fn default_remove_after_secs() -> i64 {
    120
}

fn default_true() -> bool {
    true
}

fn default_goal_frames() -> usize {
    40
}

fn default_dump_dir() -> String {
    "goal_dumps".to_string()
}

fn default_base_url() -> String {
    "https://www.bet365.bet.br/#/IP/".to_string()
}

fn default_url_prefix() -> String {
    "EV15".to_string()
}

fn default_url_suffix() -> String {
    "2C1".to_string()
}

fn default_cooldown_secs() -> i64 {
    60
}

fn default_target_limit() -> usize {
    15
}

fn default_preview_max() -> usize {
    20
}

fn default_preview_chars() -> usize {
    4000
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            league_filter: None,
            frame_log_capacity: default_frame_log_capacity(),
            stale: StaleConfig::default(),
            capture: CaptureConfig::default(),
            targets: TargetsConfig::default(),
            debug: DebugConfig::default(),
        }
    }
}

/// Read an environment variable, `None` when unset or empty
fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Result<Option<T>> {
    match env_value(name) {
        Some(raw) => raw.trim().parse().map(Some).map_err(|_| {
            ConfigError::ValidationError(format!("{} has an invalid value: {}", name, raw))
        }),
        None => Ok(None),
    }
}

fn env_flag(name: &str) -> Option<bool> {
    env_value(name).map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
}

impl FeedConfig {
    /// Load configuration from a YAML file, `.env` and environment overrides
    pub fn load(config_path: impl AsRef<Path>) -> Result<Self> {
        let yaml_content = std::fs::read_to_string(config_path)?;
        let mut config: FeedConfig = serde_yaml::from_str(&yaml_content)?;

        // Don't fail if .env doesn't exist
        dotenv::dotenv().ok();
        config.apply_env_overrides()?;

        config.validate()?;
        Ok(config)
    }

    /// Like [`FeedConfig::load`], falling back to defaults (plus environment
    /// overrides) when the file does not exist.
    pub fn load_or_default(config_path: impl AsRef<Path>) -> Result<Self> {
        let path = config_path.as_ref();
        if path.exists() {
            return Self::load(path);
        }

        warn!("Config file {} not found, using defaults", path.display());
        dotenv::dotenv().ok();
        let mut config = FeedConfig::default();
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `FEED_*` environment variables on top of the file values
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Some(level) = env_value("FEED_LOG_LEVEL") {
            info!("Overriding log level from environment variable");
            self.log_level = level;
        }
        if let Some(enabled) = env_flag("FEED_STALE_ENABLED") {
            self.stale.enabled = enabled;
        }
        if let Some(secs) = env_parse("FEED_STALE_REMOVE_AFTER_SEC")? {
            self.stale.remove_after_secs = secs;
        }
        if let Some(frames) = env_parse("FEED_GOAL_FRAMES_BEFORE")? {
            self.capture.frames_before = frames;
        }
        if let Some(frames) = env_parse("FEED_GOAL_FRAMES_AFTER")? {
            self.capture.frames_after = frames;
        }
        if let Some(dir) = env_value("FEED_GOAL_DUMP_DIR") {
            self.capture.dump_dir = dir;
        }
        if let Some(secs) = env_parse("FEED_TARGET_COOLDOWN_SEC")? {
            self.targets.cooldown_secs = secs;
        }
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        let valid_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_levels.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "log_level must be one of: {}",
                valid_levels.join(", ")
            )));
        }

        if self.frame_log_capacity == 0 {
            return Err(ConfigError::ValidationError(
                "frame_log_capacity must be greater than 0".to_string(),
            ));
        }

        if self.stale.remove_after_secs <= 0 {
            return Err(ConfigError::ValidationError(
                "stale.remove_after_secs must be greater than 0".to_string(),
            ));
        }

        if self.capture.enabled && self.capture.frames_after == 0 {
            return Err(ConfigError::ValidationError(
                "capture.frames_after must be greater than 0".to_string(),
            ));
        }

        if self.capture.enabled && self.capture.dump_dir.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "capture.dump_dir cannot be empty".to_string(),
            ));
        }

        if self.targets.cooldown_secs < 0 {
            return Err(ConfigError::ValidationError(
                "targets.cooldown_secs cannot be negative".to_string(),
            ));
        }

        if self.targets.base_url.is_empty() {
            return Err(ConfigError::ValidationError(
                "targets.base_url cannot be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Engine tunables derived from this configuration
    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            frame_log_capacity: self.frame_log_capacity,
            capture_enabled: self.capture.enabled,
            frames_before: self.capture.frames_before,
            frames_after: self.capture.frames_after,
            stale_enabled: self.stale.enabled,
            stale_timeout_secs: self.stale.remove_after_secs,
            preview_max: self.debug.preview_max,
            preview_chars: self.debug.preview_chars,
        }
    }

    /// Log configuration summary
    pub fn log(&self) {
        info!("Configuration loaded:");
        info!("  Log level: {}", self.log_level);
        info!(
            "  League filter: {}",
            self.league_filter.as_deref().unwrap_or("(none)")
        );
        info!("  Frame log capacity: {}", self.frame_log_capacity);
        info!(
            "  Stale reaper: {} (after {} seconds)",
            if self.stale.enabled { "enabled" } else { "disabled" },
            self.stale.remove_after_secs
        );
        info!(
            "  Goal capture: {} ({} before / {} after, dir {})",
            if self.capture.enabled { "enabled" } else { "disabled" },
            self.capture.frames_before,
            self.capture.frames_after,
            self.capture.dump_dir
        );
        info!(
            "  Targets: {}{}<id>{} (cooldown {} seconds, limit {})",
            self.targets.base_url,
            self.targets.prefix,
            self.targets.suffix,
            self.targets.cooldown_secs,
            self.targets.limit
        );
    }
}
