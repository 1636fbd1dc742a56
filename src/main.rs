//! promoter-crawler - Promoter directory crawler with per-country workbook export

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dialoguer::Input;
use promoter_crawler::commands::{CrawlCommand, PromoterCommand, RegionsCommand};
use promoter_crawler::config::{Config, OutputFormat};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "promoter-crawler",
    version,
    about = "Crawl a promoter directory and export contacts per country",
    long_about = "Walks country, city, and promoter listings, keeps promoters with past events, \
                  and writes their contact details to a dated sheet per country."
)]
struct Cli {
    /// Directory site root
    #[arg(long, global = true, env = "PROMO_BASE_URL")]
    base_url: Option<String>,

    /// Proxy URL (e.g., socks5://host:port)
    #[arg(long, global = true, env = "PROMO_PROXY")]
    proxy: Option<String>,

    /// Delay between requests in milliseconds
    #[arg(long, global = true, env = "PROMO_DELAY")]
    delay: Option<u64>,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true)]
    format: Option<OutputFormat>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl all regions and export one sheet per region
    #[command(alias = "c")]
    Crawl {
        /// Stop after this many records (0 means all)
        #[arg(short, long, env = "PROMO_MAX_RECORDS")]
        max: Option<usize>,

        /// Ask for the record limit before starting (overrides --max)
        #[arg(short, long)]
        interactive: bool,

        /// Only crawl these regions (repeatable, case-insensitive)
        #[arg(short, long = "region")]
        regions: Vec<String>,

        /// Workbook file name, without extension
        #[arg(short, long)]
        workbook: Option<String>,

        /// Directory to write the workbook to
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Entities checked at once
        #[arg(long, env = "PROMO_CONCURRENCY")]
        concurrency: Option<usize>,
    },

    /// Extract the contact record of one or more promoter links
    #[command(alias = "p")]
    Promoter {
        /// Promoter link(s), relative to the site root or absolute
        #[arg(required = true)]
        links: Vec<String>,
    },

    /// List the directory's top-level regions
    Regions,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new(Level::DEBUG.to_string())
    } else {
        EnvFilter::from_default_env().add_directive(Level::INFO.into())
    };

    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();

    // Load config with layered overrides
    let mut config = Config::load(cli.config.as_deref())?.with_env();

    // Apply CLI overrides
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }
    if let Some(proxy) = cli.proxy {
        config.proxy = Some(proxy);
    }
    if let Some(delay) = cli.delay {
        config.delay_ms = delay;
    }
    if let Some(format) = cli.format {
        config.format = format;
    }

    match cli.command {
        Commands::Crawl { max, interactive, regions, workbook, output_dir, concurrency } => {
            if interactive {
                let max: usize = Input::new()
                    .with_prompt("Records to pull (0 means all)")
                    .default(0)
                    .interact_text()
                    .context("Failed to read record limit")?;
                config.set_max_records(max);
            } else if let Some(max) = max {
                config.set_max_records(max);
            }

            if !regions.is_empty() {
                config.regions = regions;
            }
            if let Some(workbook) = workbook {
                config.workbook = workbook;
            }
            if let Some(output_dir) = output_dir {
                config.output_dir = output_dir;
            }
            if let Some(concurrency) = concurrency {
                config.concurrency = concurrency;
            }

            let workbook_path = config.workbook_path();
            let cmd = CrawlCommand::new(config);
            let output = cmd.execute().await?;
            println!("{}", output);
            println!("\nWorkbook: {}", workbook_path.display());
        }

        Commands::Promoter { links } => {
            let cmd = PromoterCommand::new(config);

            let output = if links.len() == 1 {
                cmd.execute(&links[0]).await?
            } else {
                cmd.execute_batch(&links).await?
            };

            println!("{}", output);
        }

        Commands::Regions => {
            let cmd = RegionsCommand::new(config);
            let output = cmd.execute().await?;
            println!("{}", output);
        }
    }

    Ok(())
}
