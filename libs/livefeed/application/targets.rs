//! Match page targets
//!
//! Decides which active events the browser layer should (re)open and
//! remembers when each was last handed out.

use std::collections::HashMap;

use tracing::debug;

use crate::infrastructure::TargetsConfig;

#[derive(Debug, Clone)]
pub struct TargetScheduler {
    base_url: String,
    prefix: String,
    suffix: String,
    cooldown_secs: i64,
    default_limit: usize,
    last_sent: HashMap<String, i64>,
}

impl TargetScheduler {
    pub fn new(config: &TargetsConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            prefix: config.prefix.clone(),
            suffix: config.suffix.clone(),
            cooldown_secs: config.cooldown_secs,
            default_limit: config.limit,
            last_sent: HashMap::new(),
        }
    }

    /// Page URL of an event: `base + prefix + id + suffix`
    pub fn match_url(&self, event_id: &str) -> String {
        format!("{}{}{}{}", self.base_url, self.prefix, event_id.trim(), self.suffix)
    }

    /// True when the event was never sent or its cooldown has elapsed.
    pub fn should_visit(&self, event_id: &str, now: i64) -> bool {
        match self.last_sent.get(event_id) {
            None => true,
            Some(last) => now - last >= self.cooldown_secs,
        }
    }

    /// Up to `limit` URLs of due events (in `active` order), recorded as sent.
    pub fn next_targets(&mut self, active: &[String], limit: Option<usize>, now: i64) -> Vec<String> {
        let limit = limit.unwrap_or(self.default_limit);
        let mut urls = Vec::new();

        for event_id in active {
            if urls.len() >= limit {
                break;
            }
            let event_id = event_id.trim();
            if event_id.is_empty() || !self.should_visit(event_id, now) {
                continue;
            }
            urls.push(self.match_url(event_id));
            self.last_sent.insert(event_id.to_string(), now);
        }

        debug!(count = urls.len(), limit, "Handing out match targets");
        urls
    }

    /// Change the cooldown at runtime. Negative values are ignored.
    pub fn set_cooldown(&mut self, secs: i64) {
        if secs >= 0 {
            self.cooldown_secs = secs;
        }
    }

    pub fn cooldown_secs(&self) -> i64 {
        self.cooldown_secs
    }
}
