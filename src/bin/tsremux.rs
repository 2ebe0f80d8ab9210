use std::{io::BufRead, path::Path, sync::Arc, time::Duration};

use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;
use tracing_subscriber::{EnvFilter, filter::LevelFilter};
use tsremux::{
    DEFAULT_BITSTREAM_FILTER, DEFAULT_DIAGNOSTIC_PACKETS, DEFAULT_OUTPUT_FORMAT, FfmpegLogLevel,
    ProgressCallback, ProgressInfo, RemuxOptions, RemuxReport, Remuxer,
};

const DEFAULT_INPUT: &str = "ts.h264";
const DEFAULT_OUTPUT: &str = "264.ts";

const CLI_AFTER_HELP: &str = "Examples:\n  tsremux\n  tsremux input.ts output.ts --overwrite --progress\n  tsremux input.ts output.ts --json --log-level error\n  tsremux --completions zsh > _tsremux";

#[derive(Debug, Parser)]
#[command(
    name = "tsremux",
    version,
    about = "Copy the first video and audio stream of a transport stream into a new container",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    /// Input media path.
    #[arg(default_value = DEFAULT_INPUT)]
    input: String,

    /// Output media path.
    #[arg(default_value = DEFAULT_OUTPUT)]
    output: String,

    /// Output container format (FFmpeg short name).
    #[arg(long, default_value = DEFAULT_OUTPUT_FORMAT)]
    format: String,

    /// Bitstream filter initialized for the video stream.
    #[arg(long, default_value = DEFAULT_BITSTREAM_FILTER)]
    bsf: String,

    /// Number of leading packets logged at debug level.
    #[arg(long, default_value_t = DEFAULT_DIAGNOSTIC_PACKETS)]
    diagnostic_packets: u32,

    /// Allow overwriting an existing output file (implied when both paths are defaults).
    #[arg(long)]
    overwrite: bool,

    /// Show a progress spinner.
    #[arg(long)]
    progress: bool,

    /// Print the run report as machine-readable JSON.
    #[arg(long)]
    json: bool,

    /// Show additional logging output.
    #[arg(long)]
    verbose: bool,

    /// FFmpeg log level (quiet, panic, fatal, error, warning, info, verbose, debug, trace).
    #[arg(long)]
    log_level: Option<FfmpegLogLevel>,

    /// Wait for Enter before exiting.
    #[arg(long)]
    wait: bool,

    /// Print a shell completion script and exit.
    #[arg(long, value_enum, value_name = "SHELL")]
    completions: Option<Shell>,
}

impl Cli {
    /// Argument-free runs replace the previous `264.ts`.
    fn allows_overwrite(&self) -> bool {
        self.overwrite || (self.input == DEFAULT_INPUT && self.output == DEFAULT_OUTPUT)
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(default_level.into())
                .from_env_lossy(),
        )
        .with_target(verbose)
        .with_writer(std::io::stderr)
        .try_init();
}

fn ensure_writable_path(path: &Path, overwrite: bool) -> Result<(), Box<dyn std::error::Error>> {
    if path.exists() {
        if overwrite {
            eprintln!(
                "{} {}",
                "warning:".yellow().bold(),
                format!("overwriting {}", path.display()).yellow()
            );
        } else {
            return Err(format!(
                "output already exists: {} (use --overwrite to replace)",
                path.display()
            )
            .into());
        }
    }
    Ok(())
}

struct SpinnerProgress {
    spinner: ProgressBar,
}

impl SpinnerProgress {
    fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] {msg}",
        )?);
        spinner.enable_steady_tick(Duration::from_millis(100));
        Ok(Self { spinner })
    }

    fn finish(&self) {
        self.spinner.finish_and_clear();
    }
}

impl ProgressCallback for SpinnerProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        let message = match info.percentage {
            Some(percentage) => format!(
                "{} packets, {:.1}s ({percentage:.1}%)",
                info.packets,
                info.position.as_secs_f64()
            ),
            None => format!("{} packets, {:.1}s", info.packets, info.position.as_secs_f64()),
        };
        self.spinner.set_message(message);
    }
}

fn report_json(cli: &Cli, report: &RemuxReport) -> serde_json::Value {
    json!({
        "input": cli.input,
        "output": cli.output,
        "format": cli.format,
        "video_stream": report.video_stream,
        "audio_stream": report.audio_stream,
        "output_streams": report.output_streams,
        "packets_read": report.outcome.packets_read,
        "packets_submitted": report.outcome.packets_submitted,
        "packets_written": report.outcome.packets_written,
        "write_failures": report.outcome.write_failures,
        "last_segment_time": report.outcome.last_segment_time,
        "termination": report.outcome.termination.to_string(),
        "complete": report.is_complete(),
        "elapsed_seconds": report.elapsed.as_secs_f64(),
    })
}

fn wait_for_enter() -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("{}", "Press Enter to exit".dimmed());
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(())
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if let Some(shell) = cli.completions {
        let mut command = Cli::command();
        clap_complete::generate(shell, &mut command, "tsremux", &mut std::io::stdout());
        return Ok(());
    }

    init_logging(cli.verbose);
    if let Some(level) = cli.log_level {
        tsremux::set_ffmpeg_log_level(level);
    }

    ensure_writable_path(Path::new(&cli.output), cli.allows_overwrite())?;

    let mut options = RemuxOptions::new()
        .with_output_format(cli.format.as_str())
        .with_bitstream_filter(cli.bsf.as_str())
        .with_diagnostic_packets(cli.diagnostic_packets);

    let spinner = if cli.progress {
        let spinner = Arc::new(SpinnerProgress::new()?);
        options = options.with_progress(spinner.clone()).with_batch_size(100);
        Some(spinner)
    } else {
        None
    };

    let result = Remuxer::new(&cli.input, &cli.output)
        .and_then(|remuxer| remuxer.with_options(options).run());

    if let Some(spinner) = &spinner {
        spinner.finish();
    }
    let report = result?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report_json(&cli, &report))?);
    } else {
        let status = if report.is_complete() {
            "remuxed".green().bold()
        } else {
            "remuxed with errors".yellow().bold()
        };
        println!("{status} {} -> {}", cli.input, cli.output);
        if cli.verbose {
            print!("{report}");
        } else {
            println!(
                "{} packets written in {:.2}s",
                report.outcome.packets_written,
                report.elapsed.as_secs_f64()
            );
        }
    }

    if cli.wait {
        wait_for_enter()?;
    }

    Ok(())
}

fn main() {
    if let Err(error) = run() {
        eprintln!("{} {error}", "error:".red().bold());
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use tsremux::FfmpegLogLevel;

    use super::Cli;

    #[test]
    fn no_arguments_uses_fixed_paths() {
        let cli = Cli::try_parse_from(["tsremux"]).unwrap();
        assert_eq!(cli.input, "ts.h264");
        assert_eq!(cli.output, "264.ts");
        assert_eq!(cli.format, "mpegts");
        assert_eq!(cli.bsf, "h264_mp4toannexb");
        assert_eq!(cli.diagnostic_packets, 20);
        assert!(!cli.wait);
        assert!(cli.log_level.is_none());
    }

    #[test]
    fn parses_flags() {
        let cli = Cli::try_parse_from([
            "tsremux",
            "in.ts",
            "out.mkv",
            "--format",
            "matroska",
            "--diagnostic-packets",
            "0",
            "--log-level",
            "WARN",
            "--overwrite",
            "--json",
            "--wait",
        ])
        .unwrap();
        assert_eq!(cli.input, "in.ts");
        assert_eq!(cli.output, "out.mkv");
        assert_eq!(cli.format, "matroska");
        assert_eq!(cli.diagnostic_packets, 0);
        assert_eq!(cli.log_level, Some(FfmpegLogLevel::Warning));
        assert!(cli.overwrite && cli.json && cli.wait);
    }

    #[test]
    fn default_paths_overwrite_the_previous_output() {
        let cli = Cli::try_parse_from(["tsremux"]).unwrap();
        assert!(!cli.overwrite);
        assert!(cli.allows_overwrite());

        let cli = Cli::try_parse_from(["tsremux", "in.ts", "264.ts"]).unwrap();
        assert!(!cli.allows_overwrite());

        let cli = Cli::try_parse_from(["tsremux", "in.ts", "out.ts", "--overwrite"]).unwrap();
        assert!(cli.allows_overwrite());
    }

    #[test]
    fn rejects_unknown_log_level() {
        assert!(Cli::try_parse_from(["tsremux", "--log-level", "loud"]).is_err());
    }

    #[test]
    fn log_level_names_round_trip_through_display() {
        for name in [
            "quiet", "panic", "fatal", "error", "warning", "info", "verbose", "debug", "trace",
        ] {
            let level: FfmpegLogLevel = name.parse().unwrap();
            assert_eq!(level.to_string(), name);
        }
    }
}
