use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use std::path::Path;
use std::time::Instant;

use webp_square::cli::Args;
use webp_square::image_processing::{capability, ProcessingEngine};
use webp_square::report::print_stage_report;
use webp_square::reporter::{config_lines, OutputMode, Reporter};
use webp_square::utils::{format_duration, validate_inputs, verbose_println};

fn main() -> Result<()> {
    let start_time = Instant::now();
    let args = Args::parse();

    let mode = if args.json_progress {
        OutputMode::Json
    } else {
        OutputMode::Console
    };
    let console = mode == OutputMode::Console;

    if console {
        println!("{}", style("WebP Square - batch WebP converter").bold().blue());
        println!();
    }

    validate_inputs(&args)?;

    // Fail before touching any file if the codecs are unusable
    let capabilities = capability::probe().context(
        "WebP support is not available: the image codecs failed their startup self-test",
    )?;

    let config = args.processing_config();

    if console && args.verbose {
        println!("{}", style("Configuration:").bold());
        for line in config_lines(&config, &capabilities, !args.no_square) {
            println!("  {}", line);
        }
        println!();
    }

    let engine = ProcessingEngine::new(config, Reporter::new(mode, args.verbose));
    let directory = Path::new(".");

    let converted = engine
        .convert_directory(directory)
        .context("Conversion pass failed")?;
    if args.report && console {
        print_stage_report(&converted);
    }

    if !args.no_square {
        let squared = engine
            .square_directory(directory)
            .context("Square normalization pass failed")?;
        if args.report && console {
            print_stage_report(&squared);
        }
    }

    if console {
        verbose_println(
            args.verbose,
            &format!("Total time: {}", format_duration(start_time.elapsed())),
        );
    }

    Ok(())
}
