use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::{error, info};
use simple_logger::SimpleLogger;

use hostbench::core::config::BenchConfig;
use hostbench::core::outcome::Category;
use hostbench::core::profile;
use hostbench::core::registry::SuiteRegistry;
use hostbench::core::runner::Runner;
use hostbench::reporters::json::JsonReporter;
use hostbench::reporters::logfile;
use hostbench::reporters::text::TextReporter;
use hostbench::reporters::Reporter;
use hostbench::workloads;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Console output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Destination for the JSON report (stdout if omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Directory receiving the per-category log files
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Config file (TOML or JSON) overriding benchmark parameters
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(short, long)]
    verbose: bool,

    #[arg(short, long)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the CPU benchmark suite
    Cpu,
    /// Run the memory benchmark suite
    Memory,
    /// Run the storage benchmark suite
    Storage,
    /// Run the network benchmark suite
    Network {
        /// Network interface to benchmark (auto-detected if omitted)
        #[arg(long)]
        interface: Option<String>,
    },
    /// Run the accelerator benchmark suite
    Accelerator,
    /// Run the ML benchmark suite
    Ml,
    /// Print the host profile and exit
    Host,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    SimpleLogger::new()
        .with_level(log_level)
        .init()
        .context("Failed to initialize logger")?;

    info!("hostbench v{}", env!("CARGO_PKG_VERSION"));

    let mut config = match &cli.config {
        Some(path) => match BenchConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                error!("{}", e);
                process::exit(2);
            }
        },
        None => BenchConfig::default(),
    };
    if let Some(dir) = &cli.log_dir {
        config.log_dir = dir.clone();
    }

    let category = match &cli.command {
        Commands::Cpu => Category::Cpu,
        Commands::Memory => Category::Memory,
        Commands::Storage => Category::Storage,
        Commands::Network { interface } => {
            if interface.is_some() {
                config.interface = interface.clone();
            }
            Category::Network
        }
        Commands::Accelerator => Category::Accelerator,
        Commands::Ml => Category::Ml,
        Commands::Host => return print_host_profile(),
    };

    // suite construction failures (unusable interface, duplicate names) are
    // startup errors: nothing has run, nothing is logged
    let registry = match build_suite(category, &config) {
        Ok(registry) => registry,
        Err(e) => {
            error!("{}", e);
            process::exit(2);
        }
    };

    let reporter: Box<dyn Reporter> = match cli.format {
        OutputFormat::Text => Box::new(TextReporter::new(cli.verbose, cli.quiet)),
        OutputFormat::Json => Box::new(JsonReporter::new(cli.output.clone())),
    };

    let host_profile = profile::snapshot(category);
    let runner = Runner::new(&config, reporter.as_ref());

    let report = match runner.execute(&registry, host_profile) {
        Ok(report) => report,
        Err(e) => {
            error!("{}", e);
            process::exit(2);
        }
    };

    let log_path = config.log_path(category);
    let block = logfile::render(&report);
    logfile::append(&log_path, &block)
        .with_context(|| format!("failed to append report to {}", log_path.display()))?;

    reporter.info(&format!(
        "Benchmark results saved to: {}",
        log_path.display()
    ));

    // skips and failures are data, not a process failure
    Ok(())
}

fn build_suite(
    category: Category,
    config: &BenchConfig,
) -> hostbench::core::error::Result<SuiteRegistry> {
    match category {
        Category::Cpu => workloads::cpu::suite(),
        Category::Memory => workloads::memory::suite(),
        Category::Storage => workloads::storage::suite(),
        Category::Network => workloads::network::suite(config),
        Category::Accelerator => workloads::accelerator::suite(),
        Category::Ml => workloads::ml::suite(),
    }
}

fn print_host_profile() -> Result<()> {
    let host_profile = profile::snapshot_full();
    println!("Host Profile");
    println!("============");
    for (key, value) in host_profile.facts() {
        println!("{}: {}", key, value);
    }
    Ok(())
}
