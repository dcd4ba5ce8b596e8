//! CLI utilities for binaries
//!
//! Handles configuration loading and argument parsing
//! for all binary executables.

use std::path::PathBuf;

/// Type of configuration to load
#[derive(Debug, Clone)]
pub enum ConfigType {
    /// Feed engine configuration (feed_config.yaml)
    Feed,
    /// Custom path
    Custom(String),
}

impl ConfigType {
    /// Get the default path for this config type
    pub fn default_path(&self) -> &str {
        match self {
            ConfigType::Feed => "config/feed_config.yaml",
            ConfigType::Custom(path) => path,
        }
    }

    /// Get the environment variable name for this config type
    pub fn env_var_name(&self) -> &str {
        match self {
            ConfigType::Feed => "FEED_CONFIG_PATH",
            ConfigType::Custom(_) => "CONFIG_PATH",
        }
    }
}

/// Load configuration path from environment or use default
///
/// # Examples
/// ```
/// use live_odds_feed::bin_common::{load_config_from_env, ConfigType};
///
/// let path = load_config_from_env(ConfigType::Custom("feed.yaml".to_string()));
/// assert_eq!(path.to_str(), Some("feed.yaml"));
/// ```
pub fn load_config_from_env(config_type: ConfigType) -> PathBuf {
    if let ConfigType::Custom(path) = &config_type {
        return PathBuf::from(path);
    }
    std::env::var(config_type.env_var_name())
        .unwrap_or_else(|_| config_type.default_path().to_string())
        .into()
}

/// Parse command line arguments for a binary
///
/// Returns a vector of arguments (excluding the program name)
pub fn parse_args() -> Vec<String> {
    std::env::args().skip(1).collect()
}

/// Arguments of the replay binary:
/// `feed_replay [--event ID] [--delay-ms N] <dump>...`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplayArgs {
    pub event_id: Option<String>,
    pub delay_ms: Option<u64>,
    pub dumps: Vec<PathBuf>,
}

impl ReplayArgs {
    pub fn parse(args: &[String]) -> anyhow::Result<Self> {
        let mut parsed = ReplayArgs::default();
        let mut iter = args.iter();

        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--event" => {
                    let id = iter
                        .next()
                        .ok_or_else(|| anyhow::anyhow!("--event needs an event id"))?;
                    parsed.event_id = Some(id.clone());
                }
                "--delay-ms" => {
                    let raw = iter
                        .next()
                        .ok_or_else(|| anyhow::anyhow!("--delay-ms needs a value"))?;
                    parsed.delay_ms = Some(raw.parse().map_err(|_| {
                        anyhow::anyhow!("--delay-ms expects milliseconds, got {}", raw)
                    })?);
                }
                flag if flag.starts_with("--") => anyhow::bail!("unknown flag {}", flag),
                path => parsed.dumps.push(PathBuf::from(path)),
            }
        }

        if parsed.dumps.is_empty() {
            anyhow::bail!("usage: feed_replay [--event ID] [--delay-ms N] <dump>...");
        }
        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_config_type_paths() {
        assert_eq!(ConfigType::Feed.default_path(), "config/feed_config.yaml");

        let custom = ConfigType::Custom("custom/path.yaml".to_string());
        assert_eq!(custom.default_path(), "custom/path.yaml");
    }

    #[test]
    fn test_config_type_env_vars() {
        assert_eq!(ConfigType::Feed.env_var_name(), "FEED_CONFIG_PATH");
    }

    #[test]
    fn test_replay_args() {
        let parsed = ReplayArgs::parse(&args(&["--event", "151234567", "--delay-ms", "5", "a.txt", "b.txt"]))
            .unwrap();
        assert_eq!(parsed.event_id.as_deref(), Some("151234567"));
        assert_eq!(parsed.delay_ms, Some(5));
        assert_eq!(parsed.dumps, vec![PathBuf::from("a.txt"), PathBuf::from("b.txt")]);
    }

    #[test]
    fn test_replay_args_errors() {
        assert!(ReplayArgs::parse(&args(&[])).is_err());
        assert!(ReplayArgs::parse(&args(&["--delay-ms", "soon", "a.txt"])).is_err());
        assert!(ReplayArgs::parse(&args(&["--verbose", "a.txt"])).is_err());
        assert!(ReplayArgs::parse(&args(&["a.txt", "--event"])).is_err());
    }
}
