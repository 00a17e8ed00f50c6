// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{info, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};

use videodoc::app_config::{self, Config};
use videodoc::Controller;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Extract narration from a composition file or directory (default command)
    Extract(ExtractArgs),

    /// Plan the voiceover track for a narration JSON file
    Plan(PlanArgs),

    /// Generate shell completions for videodoc
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug, Clone)]
struct ExtractFlags {
    /// Frame rate used for the second-based timings (positive integer)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    fps: Option<u32>,

    /// Tag of the timing blocks (default: Sequence)
    #[arg(long)]
    block_tag: Option<String>,

    /// Attribute carrying the narration text (default: text)
    #[arg(long)]
    caption_attribute: Option<String>,

    /// Force overwrite of existing narration files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Extract and preview without writing anything
    #[arg(long)]
    dry_run: bool,
}

#[derive(Parser, Debug)]
struct ExtractArgs {
    /// Composition file or directory to process
    #[arg(value_name = "INPUT_PATH")]
    input_path: PathBuf,

    #[command(flatten)]
    flags: ExtractFlags,
}

#[derive(Parser, Debug)]
struct PlanArgs {
    /// Narration JSON produced by `extract`
    #[arg(value_name = "NARRATION_JSON")]
    narration_path: PathBuf,

    /// Voice name recorded in the manifest
    #[arg(long)]
    voice: Option<String>,

    /// Directory the voiceover track will be written to
    #[arg(short, long)]
    output_dir: Option<String>,

    /// Speaking rate (0.25-4.0)
    #[arg(long)]
    rate: Option<f64>,

    /// Pitch in semitones (-20.0-20.0)
    #[arg(long, allow_negative_numbers = true)]
    pitch: Option<f64>,

    /// Volume gain in dB (-96.0-16.0)
    #[arg(long, allow_negative_numbers = true)]
    volume: Option<f64>,

    /// Write the sync manifest next to the planned audio path
    #[arg(long)]
    write_manifest: bool,
}

/// videodoc - narration extraction for product walkthrough videos
///
/// Reads video composition templates, recovers every caption placed inside a
/// timed <Sequence> block, and writes the narration JSON used for voiceover.
#[derive(Parser, Debug)]
#[command(name = "videodoc")]
#[command(version)]
#[command(about = "Extract time-aligned narration from composition templates")]
#[command(arg_required_else_help = true)]
#[command(long_about = "videodoc extracts caption text and Sequence timing from composition
templates.

EXAMPLES:
    videodoc compositions/Onboarding.jsx               # Write Onboarding.narration.json
    videodoc extract --fps 60 compositions/Demo.tsx    # Use a different frame rate
    videodoc extract --dry-run compositions/           # Preview every composition in a folder
    videodoc plan compositions/Onboarding.narration.json --write-manifest
    videodoc completions bash > videodoc.bash          # Generate bash completions

CONFIGURATION:
    Configuration is stored in videodoc.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, default_value = "videodoc.json", global = true)]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum, global = true)]
    log_level: Option<CliLogLevel>,
}

// @const: Subcommand names, including clap's generated `help`
const SUBCOMMANDS: [&str; 4] = ["extract", "plan", "completions", "help"];

// @const: Options whose next argument is their value
const VALUE_OPTIONS: [&str; 7] = [
    "-c",
    "--config-path",
    "-l",
    "--log-level",
    "--fps",
    "--block-tag",
    "--caption-attribute",
];

/// Routes `videodoc [OPTIONS] <INPUT_PATH>` to the `extract` subcommand.
///
/// `extract` is inserted after the program name when the first positional
/// argument is not a subcommand name. Arguments without any positional are
/// left to clap (help, version, usage errors).
fn with_default_subcommand<I: IntoIterator<Item = OsString>>(args: I) -> Vec<OsString> {
    let mut args: Vec<OsString> = args.into_iter().collect();
    let mut i = 1;

    while i < args.len() {
        let arg = args[i].to_string_lossy().into_owned();
        if arg == "--" {
            break;
        }
        if arg.starts_with('-') && arg.len() > 1 {
            i += if VALUE_OPTIONS.contains(&arg.as_str()) { 2 } else { 1 };
            continue;
        }
        if SUBCOMMANDS.contains(&arg.as_str()) {
            return args;
        }
        break;
    }

    if i < args.len() {
        args.insert(1, OsString::from("extract"));
    }
    args
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color and marker for a level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("\x1B[1;31m", "❌ "),
            Level::Warn => ("\x1B[1;33m", "🚧 "),
            Level::Info => ("\x1B[1;32m", " "),
            Level::Debug => ("\x1B[1;36m", "🔍 "),
            Level::Trace => ("\x1B[1;35m", "📋 "),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (color, marker) = Self::style_for_level(record.level());
            let _ = writeln!(
                std::io::stderr(),
                "{}{} {} {}\x1B[0m",
                color, now, marker, record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn main() -> Result<()> {
    // The logger accepts everything; log::set_max_level does the filtering
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse_from(with_default_subcommand(std::env::args_os()));

    if let Some(level) = cli.log_level {
        log::set_max_level(app_config::LogLevel::from(level).into());
    }

    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(*shell, &mut cmd, "videodoc", &mut std::io::stdout());
        return Ok(());
    }

    let mut config = Config::load_or_create(&cli.config_path)?;
    match cli.log_level {
        Some(level) => config.log_level = level.into(),
        None => log::set_max_level(config.log_level.into()),
    }

    match cli.command {
        Commands::Extract(args) => run_extract(config, &args.input_path, &args.flags),
        Commands::Plan(args) => run_plan(config, args),
        Commands::Completions { .. } => Ok(()),
    }
}

fn run_extract(mut config: Config, input_path: &Path, flags: &ExtractFlags) -> Result<()> {
    // Override config with CLI options if provided
    if let Some(fps) = flags.fps {
        config.fps = fps;
    }
    if let Some(tag) = &flags.block_tag {
        config.block_tag = tag.clone();
    }
    if let Some(attribute) = &flags.caption_attribute {
        config.caption_attribute = attribute.clone();
    }

    let controller = Controller::with_config(config)?;

    if input_path.is_file() {
        controller.extract(input_path, flags.force_overwrite, flags.dry_run)?;
    } else if input_path.is_dir() {
        let summary = controller.extract_folder(input_path, flags.force_overwrite, flags.dry_run)?;
        if summary.failed > 0 {
            return Err(anyhow!("{} composition(s) failed", summary.failed));
        }
    } else {
        return Err(anyhow!("Composition file not found: {}", input_path.display()));
    }

    Ok(())
}

fn run_plan(mut config: Config, args: PlanArgs) -> Result<()> {
    if let Some(voice) = args.voice {
        config.voiceover.voice_name = voice;
    }
    if let Some(output_dir) = args.output_dir {
        config.voiceover.output_dir = output_dir;
    }
    if let Some(rate) = args.rate {
        config.voiceover.speaking_rate = rate;
    }
    if let Some(pitch) = args.pitch {
        config.voiceover.pitch = pitch;
    }
    if let Some(volume) = args.volume {
        config.voiceover.volume_gain_db = volume;
    }

    let controller = Controller::with_config(config)?;
    let plan = controller.plan(&args.narration_path)?;

    let json = serde_json::to_string_pretty(&plan).context("Failed to serialize voiceover plan")?;
    println!("{}", json);

    if args.write_manifest {
        let manifest_path = controller.write_manifest(&plan)?;
        info!("Sync manifest written to {}", manifest_path.display());
    }

    Ok(())
}
