//! Replay raw frame dumps through the feed engine and print the resulting
//! snapshot as JSON.
//!
//! ```text
//! feed_replay [--event ID] [--delay-ms N] <dump>...
//! ```

use std::sync::Arc;

use anyhow::{Context, Result};
use live_odds_feed::bin_common::{
    load_config_from_env, pace, parse_args, BinaryRunner, ConfigType, ReplayArgs, RunConfig,
};
use live_odds_feed::livefeed::infrastructure::parse_dump_blocks;
use live_odds_feed::livefeed::{init_tracing, now_ts, FeedConfig, FeedEngine, GoalDumpWriter};
use tracing::{info, warn};

struct ReplayApp {
    run_config: RunConfig,
    args: ReplayArgs,
    engine: FeedEngine,
}

impl ReplayApp {
    fn new(config: &FeedConfig, args: ReplayArgs) -> Self {
        let mut run_config = RunConfig::new("Feed Replay").with_stats_every(500);
        if let Some(ms) = args.delay_ms {
            run_config = run_config.with_frame_delay(ms);
        }

        let mut engine = FeedEngine::new(config);
        if config.capture.enabled {
            let writer = GoalDumpWriter::spawn(&config.capture.dump_dir);
            engine = engine.with_capture_sink(Arc::new(writer));
        }

        Self {
            run_config,
            args,
            engine,
        }
    }
}

impl BinaryRunner for ReplayApp {
    async fn run(&mut self) -> Result<Option<String>> {
        let mut frames = 0u64;
        let mut last_ts = now_ts();

        for path in &self.args.dumps {
            let text = match tokio::fs::read_to_string(path).await {
                Ok(text) => text,
                Err(e) => {
                    warn!("Skipping {}: {}", path.display(), e);
                    continue;
                }
            };

            let blocks = parse_dump_blocks(&text);
            info!("Replaying {} frames from {}", blocks.len(), path.display());

            for block in blocks {
                last_ts = block.ts.unwrap_or(last_ts);
                self.engine.ingest_at(&block.raw, last_ts);
                frames += 1;

                if self.run_config.stats_due(frames) {
                    info!("[{}] {}", frames, self.engine.stats().summary());
                }
                pace(&self.run_config).await;
            }
        }

        let removed = self.engine.sweep_stale_at(last_ts);
        if removed > 0 {
            info!("Stale sweep removed {} markets", removed);
        }

        let snapshot = self
            .engine
            .query_snapshot_at(self.args.event_id.as_deref(), last_ts);
        let json = serde_json::to_string_pretty(&snapshot).context("Failed to serialize snapshot")?;
        println!("{}", json);

        Ok(Some(self.engine.stats().summary()))
    }

    fn config(&self) -> &RunConfig {
        &self.run_config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = ReplayArgs::parse(&parse_args())?;

    let config_path = load_config_from_env(ConfigType::Feed);
    let config = FeedConfig::load_or_default(&config_path)
        .with_context(|| format!("Failed to load {}", config_path.display()))?;

    init_tracing(&config.log_level);
    config.log();

    let mut app = ReplayApp::new(&config, args);
    app.execute().await
}
