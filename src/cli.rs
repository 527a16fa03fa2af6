use clap::Parser;

use crate::image_processing::{EncodeSettings, ProcessingConfig, DEFAULT_SQUARE_SIZE};

#[derive(Parser, Debug)]
#[command(
    name = "webp-square",
    version,
    about = "Convert all .png, .jpg and .jpeg files in the current directory to .webp and pad them to a square",
    long_about = "
WebP Square - batch WebP converter

Runs two passes over the current directory:

  1. Every .png/.jpg/.jpeg file (any letter case) is converted to a .webp file
     with the same name. Transparency is kept. Existing .webp files are left
     alone unless --overwrite is given.
  2. Every .webp file is scaled to fit a square canvas (1200x1200 by default),
     centered on a white background and rewritten in place.

Example Usage:
  # Lossless conversion + 1200x1200 squares
  webp-square

  # Lossy output at quality 85, downscale sources to at most 2000px wide
  webp-square --lossy -q 85 --max-width 2000

  # 800x800 squares, leave files that are already 800x800 untouched
  webp-square --square-size 800 --skip-square

  # Only convert, no square canvas, using 4 worker threads
  webp-square --no-square -j 4"
)]
pub struct Args {
    /// Overwrite existing .webp files when converting
    #[arg(short = 'o', long = "overwrite")]
    pub overwrite: bool,

    /// Save lossy instead of lossless
    #[arg(long = "lossy")]
    pub lossy: bool,

    /// Quality 0-100 (only used with --lossy, default 80)
    #[arg(
        short = 'q',
        long = "quality",
        value_name = "0-100",
        value_parser = clap::value_parser!(u8).range(0..=100)
    )]
    pub quality: Option<u8>,

    /// Maximum width before saving (downscale only)
    #[arg(long = "max-width", value_name = "PIXELS")]
    pub max_width: Option<u32>,

    /// Maximum height before saving (downscale only)
    #[arg(long = "max-height", value_name = "PIXELS")]
    pub max_height: Option<u32>,

    /// Edge length of the square canvas
    #[arg(long = "square-size", default_value_t = DEFAULT_SQUARE_SIZE, value_name = "PIXELS")]
    pub square_size: u32,

    /// Leave .webp files that already have the exact square size untouched
    #[arg(long = "skip-square")]
    pub skip_square: bool,

    /// Only convert, do not pad to a square canvas
    #[arg(long = "no-square")]
    pub no_square: bool,

    /// Number of parallel processing jobs (0 = auto-detect CPU cores)
    #[arg(short = 'j', long = "jobs", default_value = "1", value_name = "N")]
    pub jobs: usize,

    /// Emit progress and results as JSON lines instead of text
    #[arg(long = "json-progress")]
    pub json_progress: bool,

    /// Display a table with the outcome of every file after each pass
    #[arg(long = "report")]
    pub report: bool,

    /// Enable verbose output with detailed progress information
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

impl Args {
    pub fn encode_settings(&self) -> EncodeSettings {
        EncodeSettings::from_flags(self.lossy, self.quality)
    }

    pub fn parallel_jobs(&self) -> usize {
        if self.jobs == 0 {
            num_cpus::get()
        } else {
            self.jobs
        }
    }

    pub fn processing_config(&self) -> ProcessingConfig {
        ProcessingConfig {
            overwrite: self.overwrite,
            encode: self.encode_settings(),
            max_width: self.max_width,
            max_height: self.max_height,
            square_size: self.square_size,
            square_overwrite: !self.skip_square,
            parallel_jobs: self.parallel_jobs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        let mut argv = vec!["webp-square"];
        argv.extend_from_slice(args);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults() {
        let args = parse(&[]);

        assert!(!args.overwrite);
        assert_eq!(args.square_size, 1200);
        assert_eq!(args.encode_settings(), EncodeSettings::Lossless);

        let config = args.processing_config();
        assert!(config.square_overwrite);
        assert_eq!(config.parallel_jobs, 1);
        assert_eq!(config.max_width, None);
    }

    #[test]
    fn test_lossy_quality() {
        let args = parse(&["--lossy", "-q", "70"]);
        assert_eq!(args.encode_settings(), EncodeSettings::Lossy { quality: 70 });

        // Quality alone does not switch to lossy
        let args = parse(&["--quality", "70"]);
        assert_eq!(args.encode_settings(), EncodeSettings::Lossless);
    }

    #[test]
    fn test_quality_range() {
        let mut argv = vec!["webp-square", "--lossy", "-q", "101"];
        assert!(Args::try_parse_from(&argv).is_err());

        argv[3] = "0";
        assert!(Args::try_parse_from(&argv).is_ok());
    }

    #[test]
    fn test_square_flags() {
        let args = parse(&["--square-size", "800", "--skip-square", "-o"]);
        let config = args.processing_config();

        assert_eq!(config.square_size, 800);
        assert!(!config.square_overwrite);
        assert!(config.overwrite);
    }

    #[test]
    fn test_max_dimensions() {
        let args = parse(&["--max-width", "1920", "--max-height", "1080"]);
        let config = args.processing_config();

        assert_eq!(config.max_width, Some(1920));
        assert_eq!(config.max_height, Some(1080));
    }

    #[test]
    fn test_jobs_auto_detect() {
        let args = parse(&["-j", "0"]);
        assert!(args.parallel_jobs() >= 1);
    }
}
