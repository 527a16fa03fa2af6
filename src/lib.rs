// Library exports shared by the binary and the tests
pub mod cli;
pub mod image_processing;
pub mod json_output;
pub mod report;
pub mod reporter;
pub mod utils;

// Re-export commonly used types
pub use image_processing::{
    ColorMode, EncodeSettings, FileOutcome, FileResult, ProcessingConfig, ProcessingEngine,
    SkipReason, Stage, StageOutcome, StageSummary,
};
pub use json_output::JsonMessage;
pub use reporter::{OutputMode, Reporter};
