use serde::Serialize;

/// Running counters of the ingestion path
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestStats {
    pub frames: u64,
    pub records: u64,
    /// Items the tokenizer could not split
    pub malformed: u64,
    /// Deltas that could not be mapped to any event
    pub unresolvable: u64,
    /// Update records that matched neither a listed item nor a selection key
    pub unrouted: u64,
    pub deltas_applied: u64,
    pub header_patches: u64,
    /// Markets/selections fabricated for deltas with no known target
    pub provisional: u64,
    pub segments_applied: u64,
    pub segments_ignored: u64,
    pub full_resyncs: u64,
    pub deletes: u64,
    pub goals: u64,
    pub captures: u64,
    pub stale_markets_removed: u64,
}

impl IngestStats {
    /// One-line summary for heartbeat logging
    pub fn summary(&self) -> String {
        format!(
            "frames={} records={} malformed={} unresolvable={} deltas={} provisional={} segments={} goals={}",
            self.frames,
            self.records,
            self.malformed,
            self.unresolvable,
            self.deltas_applied,
            self.provisional,
            self.segments_applied,
            self.goals
        )
    }
}
