use anyhow::{bail, Context, Result};
use chrono::Local;
use clap::{ArgAction, Parser, Subcommand};
use cleaner_ingest::{
    classify, Aggregator, Converter, LogLayout, Passthrough, SofficeConverter, SourceKind,
};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::{fmt, EnvFilter};

mod config;
mod output;
mod state;

use config::Config;

const LONG_VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("CLEANER_BUILD_SHA"), ")");

#[derive(Parser, Debug)]
#[command(
    name = "cleaner",
    version,
    long_version = LONG_VERSION,
    about = "Normalize bank and credit card statement exports into one transaction table"
)]
struct Cli {
    /// More logging (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Config file (default: ~/.cleaner/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse every statement and write one combined CSV sorted by date
    Merge {
        /// Statement files (BofA, USAA, purchase log CSV; Santander spreadsheet)
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Output CSV (default: transactions-<today>.csv in the configured output dir)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Skip detection and parse every file as this type
        #[arg(short = 't', long)]
        kind: Option<SourceKind>,

        /// Purchase logs use the old amount layout with a currency suffix (12.50$)
        #[arg(long)]
        legacy_log: bool,

        /// Never call the spreadsheet converter; only .csv inputs are accepted
        #[arg(long)]
        no_convert: bool,
    },

    /// Print the detected statement type of each file
    Detect {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Manage ~/.cleaner/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default config file if none exists
    Init,
    /// Print the effective configuration
    Show,
    /// Print the config file location
    Path,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Merge {
            files,
            output,
            kind,
            legacy_log,
            no_convert,
        } => {
            let cfg = config::load_config(cli.config.as_deref())?;
            merge(&cfg, &files, output, kind, legacy_log, no_convert)?;
        }

        Command::Detect { files } => detect(&files)?,

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => {
                let cfg = config::load_config(cli.config.as_deref())?;
                print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
            }
            ConfigCommand::Path => println!("{}", config::config_path()?.display()),
        },
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn merge(
    cfg: &Config,
    files: &[PathBuf],
    output: Option<PathBuf>,
    kind: Option<SourceKind>,
    legacy_log: bool,
    no_convert: bool,
) -> Result<()> {
    let soffice = SofficeConverter::new(cfg.convert.command.clone(), cfg.convert.timeout());
    let converter: &dyn Converter = if no_convert { &Passthrough } else { &soffice };

    let layout = if legacy_log || cfg.log.legacy_currency_suffix {
        LogLayout::LegacyCurrencySuffix
    } else {
        LogLayout::Current
    };

    let mut aggregator = Aggregator::new(converter).log_layout(layout);
    if let Some(kind) = kind {
        debug!(%kind, "statement type forced");
        aggregator = aggregator.force_kind(kind);
    }

    let txns = aggregator
        .run(files)
        .context("no output written")?;

    let out = output.unwrap_or_else(|| {
        cfg.output
            .dir
            .join(output::default_output_name(Local::now().date_naive()))
    });
    output::write_transactions(&out, &txns)
        .with_context(|| format!("writing {}", out.display()))?;

    info!(files = files.len(), rows = txns.len(), "merge complete");
    println!(
        "successfully written {} transactions to {}",
        txns.len(),
        out.display()
    );
    Ok(())
}

fn detect(files: &[PathBuf]) -> Result<()> {
    let mut unrecognized: Vec<&Path> = Vec::new();
    for path in files {
        let kind = classify(path).with_context(|| format!("reading {}", path.display()))?;
        println!("{}: {}", path.display(), kind);
        if kind == SourceKind::Unrecognized {
            unrecognized.push(path);
        }
    }

    if !unrecognized.is_empty() {
        bail!(
            "unrecognized file type: {}",
            unrecognized
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }
    Ok(())
}
