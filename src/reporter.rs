use console::style;
use indicatif::ProgressBar;

use crate::image_processing::batch::BatchProgress;
use crate::image_processing::capability::Capabilities;
use crate::image_processing::{
    EncodeSettings, FileOutcome, FileResult, ProcessingConfig, SkipReason, Stage, StageSummary,
};
use crate::json_output::JsonMessage;
use crate::utils::{create_progress_bar, display_name, format_duration, verbose_println};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Colored status lines with a progress bar
    Console,
    /// One JSON object per line
    Json,
}

/// Per-file status lines and stage summaries for both output modes
#[derive(Debug, Clone)]
pub struct Reporter {
    mode: OutputMode,
    verbose: bool,
}

impl Reporter {
    pub fn new(mode: OutputMode, verbose: bool) -> Self {
        Self { mode, verbose }
    }

    pub fn verbose(&self, message: &str) {
        if self.mode == OutputMode::Console {
            verbose_println(self.verbose, message);
        }
    }

    pub fn no_files(&self, stage: Stage) {
        match self.mode {
            OutputMode::Console => println!("{}", style(no_files_message(stage)).yellow()),
            OutputMode::Json => JsonMessage::summary(&StageSummary {
                stage,
                total_files: 0,
                processed: 0,
                skipped: 0,
                failed: 0,
                duration: Default::default(),
            })
            .emit(),
        }
    }

    /// Start a stage and hand back the progress bar its files report into
    pub fn begin_stage(&self, stage: Stage, total: usize) -> ProgressBar {
        match self.mode {
            OutputMode::Console => {
                println!(
                    "{}",
                    style(format!("{} ({} file(s))", stage_title(stage), total))
                        .bold()
                        .blue()
                );
                let pb = create_progress_bar(total as u64);
                pb.set_message(stage.to_string());
                pb
            }
            OutputMode::Json => {
                JsonMessage::StageStarted { stage, total }.emit();
                ProgressBar::hidden()
            }
        }
    }

    pub fn file_finished(
        &self,
        stage: Stage,
        pb: &ProgressBar,
        result: &FileResult,
        progress: BatchProgress,
    ) {
        match self.mode {
            OutputMode::Console => {
                pb.println(status_line(stage, result));
                if self.verbose {
                    let eta = progress
                        .eta
                        .map(|eta| format!(", {} remaining", format_duration(eta)))
                        .unwrap_or_default();
                    pb.println(format!(
                        "{} {} took {} ({}/{}{})",
                        style("[VERBOSE]").dim(),
                        display_name(&result.input_path),
                        format_duration(result.processing_time),
                        progress.completed,
                        progress.total,
                        eta
                    ));
                }
                pb.inc(1);
            }
            OutputMode::Json => {
                json_message(stage, result).emit();
                JsonMessage::progress(stage, progress.completed, progress.total);
            }
        }
    }

    pub fn finish_stage(&self, pb: &ProgressBar, summary: &StageSummary) {
        match self.mode {
            OutputMode::Console => {
                pb.finish_and_clear();
                for line in summary_lines(summary) {
                    println!("{}", line);
                }
                verbose_println(
                    self.verbose,
                    &format!("{} stage took {}", summary.stage, format_duration(summary.duration)),
                );
                println!();
            }
            OutputMode::Json => JsonMessage::summary(summary).emit(),
        }
    }
}

fn stage_title(stage: Stage) -> &'static str {
    match stage {
        Stage::Convert => "Converting images to WebP",
        Stage::Square => "Normalizing WebP images to a square canvas",
    }
}

pub fn no_files_message(stage: Stage) -> &'static str {
    match stage {
        Stage::Convert => "No .png, .jpg or .jpeg files found in the current directory.",
        Stage::Square => "No .webp files found to normalize.",
    }
}

pub fn skip_reason_text(reason: &SkipReason) -> String {
    match reason {
        SkipReason::OutputExists => "already exists".to_string(),
        SkipReason::AlreadySquare(size) => format!("already {}x{}", size, size),
        SkipReason::SharedOutput(owner) => format!("same output as {}", display_name(owner)),
    }
}

/// One status line for a finished file
pub fn status_line(stage: Stage, result: &FileResult) -> String {
    let input_name = display_name(&result.input_path);

    match &result.outcome {
        Ok(FileOutcome::Converted {
            output_path,
            dimensions,
            ..
        }) => match stage {
            Stage::Convert => format!(
                "{} {} → {}",
                style("✓").green().bold(),
                input_name,
                display_name(output_path)
            ),
            Stage::Square => format!(
                "{} Resized: {} → {}x{}",
                style("↻").cyan().bold(),
                input_name,
                dimensions.0,
                dimensions.1
            ),
        },
        Ok(FileOutcome::Skipped {
            output_path,
            reason,
        }) => format!(
            "{} Skipping ({}): {}",
            style("⚠").yellow().bold(),
            skip_reason_text(reason),
            display_name(output_path)
        ),
        Err(e) => format!(
            "{} Error processing {}: {:#}",
            style("✗").red().bold(),
            style(&input_name).bold(),
            e
        ),
    }
}

/// Final lines printed after a stage
pub fn summary_lines(summary: &StageSummary) -> Vec<String> {
    let mut lines = Vec::new();

    let headline = match summary.stage {
        Stage::Convert => format!("Done. {} file(s) converted.", summary.processed),
        Stage::Square => format!(
            "Square normalization done. {} file(s) resized.",
            summary.processed
        ),
    };
    lines.push(style(headline).bold().green().to_string());

    if summary.skipped > 0 {
        lines.push(format!("  Skipped: {}", style(summary.skipped).bold().yellow()));
    }
    if summary.failed > 0 {
        lines.push(format!("  Failed: {}", style(summary.failed).bold().red()));
    }

    lines
}

/// Verbose configuration dump printed before the first stage
pub fn config_lines(
    config: &ProcessingConfig,
    capabilities: &Capabilities,
    square: bool,
) -> Vec<String> {
    let bound = |value: Option<u32>| value.map_or_else(|| "-".to_string(), |v| v.to_string());

    let mut lines = vec![
        format!("Decoders: {}", capabilities.decoders.join(", ")),
        format!(
            "WebP self-test: {} byte(s) round-tripped",
            capabilities.self_test_bytes
        ),
        match config.encode {
            EncodeSettings::Lossless => "Encoding: lossless".to_string(),
            EncodeSettings::Lossy { quality } => format!("Encoding: lossy (quality {})", quality),
        },
        format!(
            "Max size: {} x {}",
            bound(config.max_width),
            bound(config.max_height)
        ),
        format!("Overwrite existing: {}", config.overwrite),
    ];

    if square {
        lines.push(format!(
            "Square canvas: {}x{} (rewrite exact size: {})",
            config.square_size, config.square_size, config.square_overwrite
        ));
    } else {
        lines.push("Square canvas: disabled".to_string());
    }
    lines.push(format!("Parallel jobs: {}", config.parallel_jobs));

    lines
}

fn json_message(stage: Stage, result: &FileResult) -> JsonMessage {
    match &result.outcome {
        Ok(FileOutcome::Converted {
            output_path,
            color_mode,
            dimensions,
        }) => JsonMessage::file_completed(
            stage,
            &result.input_path,
            output_path,
            *color_mode,
            *dimensions,
            result.processing_time.as_millis(),
        ),
        Ok(FileOutcome::Skipped {
            output_path,
            reason,
        }) => JsonMessage::file_skipped(
            stage,
            &result.input_path,
            output_path,
            skip_reason_text(reason),
        ),
        Err(e) => JsonMessage::file_failed(stage, &result.input_path, format!("{:#}", e)),
    }
}
