//! Goal dump writer
//!
//! Captures are handed over an unbounded channel to a dedicated writer
//! thread, so the ingestion path never waits on the filesystem. Write failures
//! are logged and dropped.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::thread::JoinHandle;

use crossbeam_channel::{unbounded, Receiver, Sender};
use tracing::{debug, info, warn};

use crate::engine::GoalCapture;

/// Receives completed goal windows. Must not block.
pub trait CaptureSink: Send + Sync {
    fn submit(&self, capture: GoalCapture);
}

/// File name of a dump: `goal_<event>_<before>_<after>_<ts>.txt`
pub fn dump_file_name(capture: &GoalCapture) -> String {
    format!(
        "goal_{}_{}_{}_{}.txt",
        capture.event_id,
        capture.score_before.replace(':', "-"),
        capture.score_after.replace(':', "-"),
        capture.ts
    )
}

/// Dump body: a header line, then one `--- ts=<ts> ---` block per frame.
pub fn render_dump(capture: &GoalCapture) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "===== goal event={} before={} after={} ts={} frames={} =====",
        capture.event_id,
        capture.score_before,
        capture.score_after,
        capture.ts,
        capture.frames.len()
    );
    for (ts, raw) in &capture.frames {
        let _ = writeln!(out, "--- ts={} ---", ts);
        out.push_str(raw);
        out.push('\n');
    }
    out
}

fn write_dump(dir: &Path, capture: &GoalCapture) -> std::io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(dump_file_name(capture));
    fs::write(&path, render_dump(capture))?;
    Ok(path)
}

/// [`CaptureSink`] writing each capture to its own file
pub struct GoalDumpWriter {
    tx: Option<Sender<GoalCapture>>,
    handle: Option<JoinHandle<()>>,
}

impl GoalDumpWriter {
    /// Spawn the writer thread for `dir`.
    pub fn spawn(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let (tx, rx): (Sender<GoalCapture>, Receiver<GoalCapture>) = unbounded();

        let handle = std::thread::Builder::new()
            .name("goal-dump-writer".to_string())
            .spawn(move || {
                for capture in rx.iter() {
                    match write_dump(&dir, &capture) {
                        Ok(path) => info!(
                            event_id = %capture.event_id,
                            path = %path.display(),
                            "Goal dump written"
                        ),
                        Err(e) => warn!(
                            event_id = %capture.event_id,
                            error = %e,
                            "Failed to write goal dump"
                        ),
                    }
                }
                debug!("Goal dump writer stopped");
            });

        let handle = match handle {
            Ok(handle) => Some(handle),
            Err(e) => {
                warn!(error = %e, "Failed to spawn goal dump writer, captures will be dropped");
                None
            }
        };

        Self {
            tx: Some(tx),
            handle,
        }
    }

    /// Close the channel and wait for pending dumps to be written.
    pub fn shutdown(mut self) {
        self.close();
    }

    fn close(&mut self) {
        self.tx.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("Goal dump writer thread panicked");
            }
        }
    }
}

impl CaptureSink for GoalDumpWriter {
    fn submit(&self, capture: GoalCapture) {
        let Some(tx) = &self.tx else {
            return;
        };
        if tx.send(capture).is_err() {
            warn!("Goal dump writer is gone, capture dropped");
        }
    }
}

impl Drop for GoalDumpWriter {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capture() -> GoalCapture {
        GoalCapture {
            event_id: "E1".to_string(),
            score_before: "1:1".to_string(),
            score_after: "2:1".to_string(),
            ts: 1700,
            frames: vec![(1698, "frame-a".to_string()), (1701, "frame-b".to_string())],
        }
    }

    #[test]
    fn test_dump_file_name() {
        assert_eq!(dump_file_name(&capture()), "goal_E1_1-1_2-1_1700.txt");
    }

    #[test]
    fn test_writer_persists_capture() {
        let dir = tempfile::tempdir().unwrap();
        let writer = GoalDumpWriter::spawn(dir.path().join("dumps"));
        writer.submit(capture());
        writer.shutdown();

        let path = dir.path().join("dumps").join("goal_E1_1-1_2-1_1700.txt");
        let body = std::fs::read_to_string(path).unwrap();
        assert!(body.starts_with("===== goal event=E1"));
        assert!(body.contains("--- ts=1698 ---\nframe-a\n"));
        assert!(body.contains("--- ts=1701 ---\nframe-b\n"));
    }
}
