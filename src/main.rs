use std::io::{self, IsTerminal};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use tracing::info;

use pc2monarch::config::paths::{DEFAULT_CONFIG_FILE, DEFAULT_INPUT_DIR, DEFAULT_OUTPUT_DIR};
use pc2monarch::config::{ConverterPaths, Settings};
use pc2monarch::display::format_summary;
use pc2monarch::export::write_run_report;
use pc2monarch::logging::{init_logging, LogConfig};
use pc2monarch::models::ConversionStats;
use pc2monarch::services::ConvertService;

/// Every file converted
const EXIT_SUCCESS: i32 = 0;
/// Configuration or directory error, nothing converted
const EXIT_FATAL: i32 = 1;
/// Some files were skipped because of errors
const EXIT_PARTIAL: i32 = 2;

#[derive(Parser)]
#[command(
    name = "pc2monarch",
    author = "Kaylee Beyene",
    version,
    about = "Convert Personal Capital transaction exports to Monarch Money CSV imports",
    long_about = "pc2monarch converts every Personal Capital CSV export in the input \
                  directory into a <name>-monarch.csv file that Monarch Money's \
                  transaction upload accepts, remapping categories through the \
                  table in config.yaml."
)]
struct Cli {
    /// Directory containing Personal Capital CSV exports
    #[arg(short, long, value_name = "DIR", default_value = DEFAULT_INPUT_DIR)]
    input: PathBuf,

    /// Directory for converted files (created if missing)
    #[arg(short, long, value_name = "DIR", default_value = DEFAULT_OUTPUT_DIR)]
    output: PathBuf,

    /// Category mapping configuration
    #[arg(
        short,
        long,
        value_name = "FILE",
        env = "PC2MONARCH_CONFIG",
        default_value = DEFAULT_CONFIG_FILE
    )]
    config: PathBuf,

    /// Detect and convert without writing output files
    #[arg(long)]
    dry_run: bool,

    /// Write a JSON summary of the run
    #[arg(long, value_name = "FILE")]
    report: Option<PathBuf>,

    /// Exit successfully even if some files could not be converted
    #[arg(long)]
    allow_partial: bool,

    /// Write the default configuration to the config path and exit
    #[arg(long)]
    init_config: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

fn main() {
    let cli = Cli::parse();

    let log_config = LogConfig::from_verbosity(cli.verbose, cli.quiet)
        .with_ansi(io::stderr().is_terminal());
    if let Err(e) = init_logging(&log_config) {
        eprintln!("Error: failed to initialize logging: {}", e);
        std::process::exit(EXIT_FATAL);
    }

    let exit_code = match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            EXIT_FATAL
        }
    };
    std::process::exit(exit_code);
}

fn run(cli: &Cli) -> Result<i32> {
    if cli.init_config {
        Settings::write_default(&cli.config)?;
        println!("Wrote default configuration to {}", cli.config.display());
        return Ok(EXIT_SUCCESS);
    }

    let paths = ConverterPaths::new(&cli.input, &cli.output, &cli.config);

    let settings = Settings::load(paths.config_file())?;
    let mapping = settings.category_mapping()?;
    info!(
        rules = mapping.len(),
        case_sensitive = mapping.is_case_sensitive(),
        "Loaded category mappings from {}",
        paths.config_file().display()
    );

    let service = ConvertService::new(&mapping).with_dry_run(cli.dry_run);
    let stats = service.run(&paths)?;

    print!("{}", format_summary(&stats, paths.output_dir(), service.is_dry_run()));

    if let Some(report) = &cli.report {
        write_run_report(&stats, service.is_dry_run(), report)
            .with_context(|| format!("Could not write run report {}", report.display()))?;
        info!(report = %report.display(), "Wrote run report");
    }

    Ok(exit_code(&stats, cli.allow_partial))
}

fn exit_code(stats: &ConversionStats, allow_partial: bool) -> i32 {
    if stats.has_failures() && !allow_partial {
        EXIT_PARTIAL
    } else {
        EXIT_SUCCESS
    }
}
