//! Raw frame dump reader
//!
//! Dumps hold frames separated by `--- ts=<ts> ---` header lines. Banner lines
//! are skipped, every non-empty block is one frame.

/// A frame recovered from a dump
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpFrame {
    /// Timestamp from the block header, when it had one
    pub ts: Option<i64>,
    pub raw: String,
}

fn header_ts(line: &str) -> Option<i64> {
    line.trim()
        .strip_prefix("--- ts=")?
        .trim_end_matches('-')
        .trim()
        .parse()
        .ok()
}

fn is_banner(line: &str) -> bool {
    line.starts_with("== GOAL DETECTED ==") || line.starts_with("===== ")
}

/// Split dump text into frames, in file order.
pub fn parse_dump_blocks(text: &str) -> Vec<DumpFrame> {
    let mut frames = Vec::new();
    let mut ts = None;
    let mut block: Vec<&str> = Vec::new();

    let mut flush = |ts: Option<i64>, block: &mut Vec<&str>| {
        let raw = block.join("\n");
        if !raw.trim().is_empty() {
            frames.push(DumpFrame {
                ts,
                raw: raw.trim_matches('\n').to_string(),
            });
        }
        block.clear();
    };

    for line in text.lines() {
        if line.starts_with("--- ts=") {
            flush(ts, &mut block);
            ts = header_ts(line);
            continue;
        }
        if is_banner(line) {
            continue;
        }
        block.push(line);
    }
    flush(ts, &mut block);

    frames
}
