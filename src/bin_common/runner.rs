//! Binary runner utilities
//!
//! Provides a standardized way to run binaries with proper
//! logging, periodic stats and frame pacing.

use std::time::Duration;
use tracing::info;

/// Configuration for running a binary application
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Name of the binary (for logging)
    pub name: String,
    /// Log ingest stats every this many frames
    pub stats_every_frames: u64,
    /// Delay between replayed frames (if applicable)
    pub frame_delay_ms: Option<u64>,
}

impl RunConfig {
    /// Create a new run configuration
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stats_every_frames: 1000,
            frame_delay_ms: None,
        }
    }

    /// Set stats interval
    pub fn with_stats_every(mut self, frames: u64) -> Self {
        self.stats_every_frames = frames.max(1);
        self
    }

    /// Set frame delay
    pub fn with_frame_delay(mut self, ms: u64) -> Self {
        self.frame_delay_ms = Some(ms);
        self
    }

    /// True when stats are due after `frames` frames
    pub fn stats_due(&self, frames: u64) -> bool {
        frames > 0 && frames % self.stats_every_frames == 0
    }
}

/// Trait for binary applications
#[allow(async_fn_in_trait)]
pub trait BinaryRunner {
    /// Run the application; returns an optional closing summary
    async fn run(&mut self) -> anyhow::Result<Option<String>>;

    /// Get the run configuration
    fn config(&self) -> &RunConfig;

    /// Print startup banner
    fn print_banner(&self) {
        let config = self.config();
        info!("");
        info!("========================================");
        info!("Starting {}", config.name);
        info!("========================================");
        info!("");
    }

    /// Print shutdown banner
    fn print_shutdown(&self, stats: Option<&str>) {
        let config = self.config();
        info!("");
        info!("========================================");
        info!("{} finished", config.name);
        if let Some(stats) = stats {
            info!("{}", stats);
        }
        info!("========================================");
    }

    /// Execute the binary with proper initialization and cleanup
    async fn execute(&mut self) -> anyhow::Result<()> {
        self.print_banner();
        let summary = self.run().await?;
        self.print_shutdown(summary.as_deref());
        Ok(())
    }
}

/// Sleep between replayed frames when a delay is configured
pub async fn pace(config: &RunConfig) {
    if let Some(ms) = config.frame_delay_ms.filter(|ms| *ms > 0) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_config_builder() {
        let config = RunConfig::new("test-binary")
            .with_stats_every(50)
            .with_frame_delay(5);

        assert_eq!(config.name, "test-binary");
        assert_eq!(config.stats_every_frames, 50);
        assert_eq!(config.frame_delay_ms, Some(5));
        assert!(config.stats_due(100));
        assert!(!config.stats_due(101));
    }

    #[test]
    fn test_default_config() {
        let config = RunConfig::new("default");
        assert_eq!(config.stats_every_frames, 1000);
        assert_eq!(config.frame_delay_ms, None);
        assert!(!config.stats_due(0));
    }
}
