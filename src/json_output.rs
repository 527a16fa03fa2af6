//! JSON output for scripting
//!
//! When --json-progress is enabled, every per-file outcome and stage summary
//! is emitted as one JSON object per line on stdout, and all other output is
//! suppressed.

use serde::Serialize;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::image_processing::{ColorMode, Stage, StageSummary};

/// Last progress emission timestamp (milliseconds since epoch)
/// Used for throttling progress updates to ~25 per second
static LAST_PROGRESS_MS: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JsonMessage {
    /// A stage found files and is about to process them
    StageStarted { stage: Stage, total: usize },
    /// Progress update
    Progress {
        stage: Stage,
        current: usize,
        total: usize,
    },
    /// File written
    FileCompleted {
        stage: Stage,
        input_path: String,
        output_path: String,
        color_mode: ColorMode,
        width: u32,
        height: u32,
        processing_time_ms: u128,
    },
    /// File left alone
    FileSkipped {
        stage: Stage,
        input_path: String,
        output_path: String,
        reason: String,
    },
    /// File processing failed
    FileFailed {
        stage: Stage,
        input_path: String,
        error: String,
    },
    /// Per-stage summary
    Summary {
        stage: Stage,
        total_files: usize,
        processed: usize,
        skipped: usize,
        failed: usize,
        duration_secs: f64,
    },
}

impl JsonMessage {
    pub fn to_line(&self) -> Option<String> {
        serde_json::to_string(self).ok()
    }

    /// Emit JSON message to stdout
    pub fn emit(&self) {
        if let Some(json) = self.to_line() {
            println!("{}", json);
        }
    }

    /// Emit a progress message, throttled to one every 40ms.
    /// The final update (current == total) is always emitted.
    pub fn progress(stage: Stage, current: usize, total: usize) {
        let now_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);

        let last_ms = LAST_PROGRESS_MS.load(Ordering::Relaxed);

        if now_ms.saturating_sub(last_ms) >= 40 || current == total {
            LAST_PROGRESS_MS.store(now_ms, Ordering::Relaxed);
            Self::Progress {
                stage,
                current,
                total,
            }
            .emit();
        }
    }

    pub fn file_completed(
        stage: Stage,
        input_path: &Path,
        output_path: &Path,
        color_mode: ColorMode,
        dimensions: (u32, u32),
        processing_time_ms: u128,
    ) -> Self {
        Self::FileCompleted {
            stage,
            input_path: input_path.display().to_string(),
            output_path: output_path.display().to_string(),
            color_mode,
            width: dimensions.0,
            height: dimensions.1,
            processing_time_ms,
        }
    }

    pub fn file_skipped(
        stage: Stage,
        input_path: &Path,
        output_path: &Path,
        reason: impl Into<String>,
    ) -> Self {
        Self::FileSkipped {
            stage,
            input_path: input_path.display().to_string(),
            output_path: output_path.display().to_string(),
            reason: reason.into(),
        }
    }

    pub fn file_failed(stage: Stage, input_path: &Path, error: impl Into<String>) -> Self {
        Self::FileFailed {
            stage,
            input_path: input_path.display().to_string(),
            error: error.into(),
        }
    }

    pub fn summary(summary: &StageSummary) -> Self {
        Self::Summary {
            stage: summary.stage,
            total_files: summary.total_files,
            processed: summary.processed,
            skipped: summary.skipped,
            failed: summary.failed,
            duration_secs: summary.duration.as_secs_f64(),
        }
    }
}
