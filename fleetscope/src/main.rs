//! Sweep report and lookup tool
//!
//! This tool turns a collected sweep document into the per-interface port
//! view, enriched with hardware vendors and normalized elapsed times, and
//! renders it as JSON or Markdown. Vendor lookups and time normalization are
//! also available on their own.

mod input;
mod report;

use clap::{Args, Parser, Subcommand, ValueEnum};
use fleetscope_core::vendor::source::{DEFAULT_CACHE_PATH, DEFAULT_VENDOR_URL, OfflineFetcher};
use fleetscope_core::vendor::{VendorFetcher, load_vendor_database};
use fleetscope_core::{
    NoopProgress, ProgressReporter, Result, TaskProgress, TimeNormalizer, VendorResolver,
    VendorSource, ViewBuilder, init_json_logging, init_logging,
};
use report::{DEFAULT_PAGE_SIZE, MarkdownReport, ViewDocument};
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Command-line interface for the report tool
#[derive(Parser)]
#[command(name = "fleetscope")]
#[command(about = "Port view, vendor lookup and report generator for FleetScope sweeps")]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Build the port view of a sweep document
    View {
        /// Sweep document (.json or .json.zst)
        #[arg(short, long)]
        input: PathBuf,

        #[command(flatten)]
        vendors: VendorArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Markdown)]
        format: OutputFormat,

        /// Output file path (stdout if omitted)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// Rows per Markdown page
        #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
        page_size: usize,

        /// Stop after this many Markdown pages
        #[arg(long)]
        max_pages: Option<usize>,
    },
    /// Resolve hardware addresses to vendors, or search vendors by name
    Vendor {
        /// Addresses in any common notation
        #[arg(required_unless_present = "search")]
        addresses: Vec<String>,

        /// List prefixes whose vendor name contains this text
        #[arg(long, conflicts_with = "addresses")]
        search: Option<String>,

        #[command(flatten)]
        vendors: VendorArgs,
    },
    /// Normalize device elapsed-time strings
    Elapsed {
        /// Strings such as 00:01:02, 3d04h, 2w1d, 1y13w or never
        #[arg(required = true)]
        values: Vec<String>,
    },
}

/// Vendor table options
#[derive(Args, Debug, Clone)]
pub struct VendorArgs {
    /// Vendor table cache file
    #[arg(long, default_value = DEFAULT_CACHE_PATH)]
    pub vendor_cache: PathBuf,

    /// Vendor table download URL, used when the cache is missing
    #[arg(long, default_value = DEFAULT_VENDOR_URL)]
    pub vendor_url: String,

    /// Never download the vendor table
    #[arg(long)]
    pub offline: bool,
}

/// Available output formats
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Markdown report
    Markdown,
    /// JSON structured output
    Json,
}

#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Increase verbosity
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.global.json_logs {
        init_json_logging(cli.global.verbose, cli.global.quiet)?;
    } else {
        init_logging(cli.global.verbose, cli.global.quiet)?;
    }

    run(&cli).await.map_err(|e| {
        error!("{}", e);
        e
    })
}

async fn run(cli: &Cli) -> Result<()> {
    match &cli.command {
        Commands::View {
            input,
            vendors,
            format,
            output,
            page_size,
            max_pages,
        } => {
            let resolver = load_resolver(vendors).await?;
            let result = input::load_sweep(input).await?;

            let mut progress: Box<dyn ProgressReporter> = if cli.global.quiet {
                Box::new(NoopProgress)
            } else {
                Box::new(TaskProgress::stderr())
            };
            let rows = ViewBuilder::new(resolver.clone(), TimeNormalizer::new())
                .build(&result.records, progress.as_mut());
            let document = ViewDocument::new(&result, rows);

            let text = match format {
                OutputFormat::Json => document.to_json()?,
                OutputFormat::Markdown => {
                    MarkdownReport::new(&document, &resolver, *page_size, *max_pages)?
                        .to_markdown()?
                }
            };
            write_output(&text, output.as_deref()).await
        }
        Commands::Vendor {
            addresses,
            search,
            vendors,
        } => {
            let resolver = load_resolver(vendors).await?;
            match search {
                Some(needle) => {
                    for (prefix, vendor) in resolver.list_prefixes_by_vendor(needle) {
                        println!("{}\t{}", prefix, vendor);
                    }
                }
                None => {
                    for address in addresses {
                        let vendor = resolver.resolve(address).unwrap_or_default();
                        let full_name = resolver.resolve_full_name(address).unwrap_or_default();
                        println!("{}\t{}\t{}", address, vendor, full_name);
                    }
                }
            }
            Ok(())
        }
        Commands::Elapsed { values } => {
            let normalizer = TimeNormalizer::new();
            for value in values {
                println!("{}\t{}", value, normalizer.normalize(value));
            }
            Ok(())
        }
    }
}

async fn load_resolver(args: &VendorArgs) -> Result<VendorResolver> {
    let source = VendorSource::new(args.vendor_cache.clone(), args.vendor_url.clone());
    let fetcher: Box<dyn VendorFetcher> = if args.offline {
        Box::new(OfflineFetcher)
    } else {
        fleetscope_core::vendor::source::default_fetcher()
    };
    let database = load_vendor_database(&source, fetcher.as_ref()).await?;
    info!("Vendor table holds {} prefixes", database.len());
    Ok(VendorResolver::new(database))
}

async fn write_output(text: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            tokio::fs::write(path, text).await.map_err(|e| {
                fleetscope_core::error::FleetError::io(
                    format!("Failed to write to {}", path.display()),
                    e,
                )
            })?;
            info!("✓ Report saved to {}", path.display());
            Ok(())
        }
        None => {
            print!("{}", text);
            Ok(())
        }
    }
}
