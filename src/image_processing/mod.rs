pub mod batch;
pub mod capability;
pub mod color_mode;
pub mod convert;
pub mod encode;
pub mod resize;
pub mod square;

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use strum_macros::Display;
use walkdir::WalkDir;

use crate::reporter::Reporter;
use crate::utils::{derive_output_path, display_name, has_valid_extension};

pub use color_mode::ColorMode;
pub use encode::EncodeSettings;

/// Extensions picked up by the convert stage (compared lowercase)
pub const SOURCE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// Extension of every file the tool writes
pub const TARGET_EXTENSION: &str = "webp";

pub const DEFAULT_SQUARE_SIZE: u32 = 1200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    #[strum(serialize = "convert")]
    Convert,
    #[strum(serialize = "square")]
    Square,
}

impl Stage {
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Stage::Convert => SOURCE_EXTENSIONS,
            Stage::Square => &[TARGET_EXTENSION],
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProcessingConfig {
    /// Replace existing `.webp` outputs in the convert stage
    pub overwrite: bool,
    pub encode: EncodeSettings,
    pub max_width: Option<u32>,
    pub max_height: Option<u32>,
    pub square_size: u32,
    /// When false, the square stage leaves files that are already the right size alone
    pub square_overwrite: bool,
    pub parallel_jobs: usize,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            overwrite: false,
            encode: EncodeSettings::Lossless,
            max_width: None,
            max_height: None,
            square_size: DEFAULT_SQUARE_SIZE,
            square_overwrite: true,
            parallel_jobs: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The `.webp` next to the source already exists
    OutputExists,
    /// The file is already `size`x`size`
    AlreadySquare(u32),
    /// An earlier source in the same directory maps to the same `.webp`
    SharedOutput(PathBuf),
}

/// What happened to a file that did not fail
#[derive(Debug)]
pub enum FileOutcome {
    Converted {
        output_path: PathBuf,
        color_mode: ColorMode,
        dimensions: (u32, u32),
    },
    Skipped {
        output_path: PathBuf,
        reason: SkipReason,
    },
}

#[derive(Debug)]
pub struct FileResult {
    pub input_path: PathBuf,
    pub outcome: Result<FileOutcome>,
    pub processing_time: Duration,
}

impl FileResult {
    pub fn is_converted(&self) -> bool {
        matches!(self.outcome, Ok(FileOutcome::Converted { .. }))
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self.outcome, Ok(FileOutcome::Skipped { .. }))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StageSummary {
    pub stage: Stage,
    pub total_files: usize,
    pub processed: usize,
    pub skipped: usize,
    pub failed: usize,
    pub duration: Duration,
}

impl StageSummary {
    pub fn from_results(stage: Stage, results: &[FileResult], duration: Duration) -> Self {
        let processed = results.iter().filter(|r| r.is_converted()).count();
        let skipped = results.iter().filter(|r| r.is_skipped()).count();

        Self {
            stage,
            total_files: results.len(),
            processed,
            skipped,
            failed: results.len() - processed - skipped,
            duration,
        }
    }
}

/// Everything a stage produced, in discovery order
#[derive(Debug)]
pub struct StageOutcome {
    pub summary: StageSummary,
    pub results: Vec<FileResult>,
}

pub struct ProcessingEngine {
    config: ProcessingConfig,
    reporter: Reporter,
}

impl ProcessingEngine {
    pub fn new(config: ProcessingConfig, reporter: Reporter) -> Self {
        Self { config, reporter }
    }

    /// List regular files directly inside `directory` whose extension matches
    pub fn discover(&self, directory: &Path, extensions: &[&str]) -> Result<Vec<PathBuf>> {
        self.reporter
            .verbose(&format!("Scanning directory: {}", directory.display()));

        let mut files = Vec::new();
        let walker = WalkDir::new(directory)
            .min_depth(1)
            .max_depth(1)
            .follow_links(false);

        for entry in walker {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            if entry.file_type().is_file() && has_valid_extension(path, extensions) {
                files.push(path.to_path_buf());
            }
        }

        // Sort for consistent processing order
        files.sort();

        self.reporter
            .verbose(&format!("Found {} file(s) matching {:?}", files.len(), extensions));
        Ok(files)
    }

    /// Convert every PNG/JPEG in `directory` to WebP
    pub fn convert_directory(&self, directory: &Path) -> Result<StageOutcome> {
        self.run_stage(Stage::Convert, directory, convert::convert_file)
    }

    /// Normalize every WebP in `directory` onto a square canvas
    pub fn square_directory(&self, directory: &Path) -> Result<StageOutcome> {
        self.run_stage(Stage::Square, directory, square::square_file)
    }

    /// Sources whose output is already claimed by an earlier source, mapped to
    /// that earlier source. `a.jpg` and `a.png` both write `a.webp`; only the
    /// first in sorted order is converted.
    pub fn output_conflicts(files: &[PathBuf]) -> HashMap<PathBuf, PathBuf> {
        let mut owners: HashMap<PathBuf, &PathBuf> = HashMap::new();
        let mut conflicts = HashMap::new();

        for file in files {
            let output = derive_output_path(file);
            match owners.get(&output) {
                Some(owner) => {
                    conflicts.insert(file.clone(), (*owner).clone());
                }
                None => {
                    owners.insert(output, file);
                }
            }
        }

        conflicts
    }

    fn run_stage<F>(&self, stage: Stage, directory: &Path, process: F) -> Result<StageOutcome>
    where
        F: Fn(&Path, &ProcessingConfig) -> Result<FileOutcome> + Send + Sync,
    {
        let start_time = Instant::now();
        let files = self.discover(directory, stage.extensions())?;

        if files.is_empty() {
            self.reporter.no_files(stage);
            let summary = StageSummary::from_results(stage, &[], start_time.elapsed());
            return Ok(StageOutcome {
                summary,
                results: Vec::new(),
            });
        }

        let conflicts = match stage {
            Stage::Convert => Self::output_conflicts(&files),
            Stage::Square => HashMap::new(),
        };
        for (file, owner) in &conflicts {
            self.reporter.verbose(&format!(
                "{} and {} share the same output, keeping {}",
                display_name(owner),
                display_name(file),
                display_name(owner)
            ));
        }

        let progress = self.reporter.begin_stage(stage, files.len());

        let results = batch::process_files(
            &files,
            self.config.parallel_jobs,
            |path| {
                let started = Instant::now();
                let outcome = match conflicts.get(path) {
                    Some(owner) => Ok(FileOutcome::Skipped {
                        output_path: derive_output_path(path),
                        reason: SkipReason::SharedOutput(owner.clone()),
                    }),
                    None => process(path, &self.config),
                };
                FileResult {
                    input_path: path.to_path_buf(),
                    outcome,
                    processing_time: started.elapsed(),
                }
            },
            |result, batch_progress| {
                self.reporter
                    .file_finished(stage, &progress, result, batch_progress)
            },
        )?;

        let summary = StageSummary::from_results(stage, &results, start_time.elapsed());
        self.reporter.finish_stage(&progress, &summary);

        Ok(StageOutcome { summary, results })
    }
}
