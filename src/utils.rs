use anyhow::Result;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cli::Args;
use crate::image_processing::TARGET_EXTENSION;

/// Largest width or height a WebP image can have
pub const MAX_WEBP_DIMENSION: u32 = 16383;

/// Create a styled progress bar
pub fn create_progress_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.blue} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} {msg} ({eta})",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-"),
    );
    pb
}

/// Format duration in a human-readable way
pub fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs();
    let millis = duration.subsec_millis();

    if total_secs >= 60 {
        let mins = total_secs / 60;
        let secs = total_secs % 60;
        format!("{}m {}s", mins, secs)
    } else if total_secs > 0 {
        format!("{}.{:03}s", total_secs, millis)
    } else {
        format!("{}ms", duration.as_millis())
    }
}

/// Validate command line arguments
pub fn validate_inputs(args: &Args) -> Result<()> {
    if args.square_size == 0 || args.square_size > MAX_WEBP_DIMENSION {
        return Err(anyhow::anyhow!(
            "Square size must be between 1 and {} pixels, got: {}",
            MAX_WEBP_DIMENSION,
            args.square_size
        ));
    }

    for (name, value) in [("width", args.max_width), ("height", args.max_height)] {
        if value == Some(0) {
            return Err(anyhow::anyhow!("Maximum {} must be greater than 0", name));
        }
    }

    // Validate job count
    if args.jobs > 32 {
        return Err(anyhow::anyhow!(
            "Job count too high (max 32), got: {}",
            args.jobs
        ));
    }

    if args.quality.is_some() && !args.lossy {
        warn_println("--quality has no effect without --lossy");
    }

    Ok(())
}

/// Get file extension in lowercase
pub fn get_file_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
}

/// Check if a file has one of the specified (lowercase) extensions
pub fn has_valid_extension(path: &Path, extensions: &[&str]) -> bool {
    match get_file_extension(path) {
        Some(ext) => extensions.contains(&ext.as_str()),
        None => false,
    }
}

/// Path of the WebP file produced for `input_path`: same directory and stem
pub fn derive_output_path(input_path: &Path) -> PathBuf {
    input_path.with_extension(TARGET_EXTENSION)
}

/// File name for status output, falling back to the full path
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Print verbose information if verbose mode is enabled
pub fn verbose_println(verbose: bool, message: &str) {
    if verbose {
        println!("{} {}", style("[VERBOSE]").dim(), message);
    }
}

/// Print warning message
pub fn warn_println(message: &str) {
    eprintln!("{} {}", style("[WARNING]").yellow().bold(), message);
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(500)), "500ms");
        assert_eq!(format_duration(Duration::from_secs(1)), "1.000s");
        assert_eq!(format_duration(Duration::from_secs(65)), "1m 5s");
    }

    #[test]
    fn test_has_valid_extension() {
        let extensions = ["png", "jpg", "jpeg"];

        assert!(has_valid_extension(Path::new("a.png"), &extensions));
        assert!(has_valid_extension(Path::new("b.JPG"), &extensions));
        assert!(has_valid_extension(Path::new("dir/c.JpEg"), &extensions));

        assert!(!has_valid_extension(Path::new("d.webp"), &extensions));
        assert!(!has_valid_extension(Path::new("png"), &extensions));
        assert!(!has_valid_extension(Path::new("e.png.bak"), &extensions));
    }

    #[test]
    fn test_derive_output_path() {
        assert_eq!(derive_output_path(Path::new("photo.png")), PathBuf::from("photo.webp"));
        assert_eq!(
            derive_output_path(Path::new("./shots/IMG_0001.JPEG")),
            PathBuf::from("./shots/IMG_0001.webp")
        );
        // Only the last extension is replaced
        assert_eq!(
            derive_output_path(Path::new("archive.v2.jpg")),
            PathBuf::from("archive.v2.webp")
        );
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name(Path::new("./dir/photo.png")), "photo.png");
    }

    #[test]
    fn test_validate_inputs() {
        let args = Args::try_parse_from(["webp-square"]).unwrap();
        assert!(validate_inputs(&args).is_ok());

        let args = Args::try_parse_from(["webp-square", "--square-size", "0"]).unwrap();
        assert!(validate_inputs(&args).is_err());

        let args = Args::try_parse_from(["webp-square", "--square-size", "20000"]).unwrap();
        assert!(validate_inputs(&args).is_err());

        let args = Args::try_parse_from(["webp-square", "--max-width", "0"]).unwrap();
        assert!(validate_inputs(&args).is_err());

        let args = Args::try_parse_from(["webp-square", "-j", "64"]).unwrap();
        assert!(validate_inputs(&args).is_err());
    }
}
