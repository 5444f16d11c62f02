//! Link-Sweep main entry point
//!
//! This is the command-line interface for the Link-Sweep link crawler.

use anyhow::Context;
use clap::Parser;
use link_sweep::config::{apply_hosting_config, load_config_with_hash, validate, Config};
use link_sweep::server::{HandlerChain, NotFound, Redirects, StaticFiles};
use link_sweep::Crawler;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Link-Sweep: a link-integrity crawler for built static sites
///
/// Link-Sweep serves a built site from disk in-process, follows every
/// same-origin link starting at `/`, and reports dead links, broken
/// redirects, and pages without a `<body>`.
#[derive(Parser, Debug)]
#[command(name = "link-sweep")]
#[command(version)]
#[command(about = "A link-integrity crawler for static sites", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Directory containing the built site (overrides the config)
    #[arg(long, value_name = "DIR")]
    public: Option<PathBuf>,

    /// Serve `/page` from `page.html`
    #[arg(long)]
    clean_urls: bool,

    /// Write a JSON report to this path
    #[arg(long, value_name = "PATH")]
    json: Option<PathBuf>,

    /// Pretty-print the JSON report
    #[arg(long)]
    pretty: bool,

    /// Re-check pages every time they are linked
    #[arg(long)]
    allow_duplicate_urls: bool,

    /// Treat `/foo` and `/foo/` as different pages
    #[arg(long)]
    no_normalize_trailing_slash: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    match run(cli).await {
        Ok(0) => ExitCode::SUCCESS,
        Ok(_) => ExitCode::from(1),
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::from(2)
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("link_sweep=info,warn"),
            1 => EnvFilter::new("link_sweep=debug,info"),
            2 => EnvFilter::new("link_sweep=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Loads configuration, crawls the site, and reports
///
/// Returns the number of link errors found.
async fn run(cli: Cli) -> anyhow::Result<usize> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    let working_dir = std::env::current_dir().context("failed to read working directory")?;
    if let Some(hosting) = apply_hosting_config(&mut config, &working_dir)? {
        tracing::info!(
            "Applied hosting config from {} (disable with detect-hosting-config = false)",
            hosting.display()
        );
    }

    apply_overrides(&mut config, &cli);
    validate(&config)?;

    if !config.site.public.is_dir() {
        anyhow::bail!("site directory {} does not exist", config.site.public.display());
    }

    tracing::info!(
        "Crawling {} ({} redirect rules, clean URLs: {})",
        config.site.public.display(),
        config.redirects.len(),
        config.site.clean_urls
    );

    let mut chain = HandlerChain::default();
    chain.push(Redirects::new(config.redirects.clone()));
    chain.push(StaticFiles::new(config.site.public.clone()).clean_urls(config.site.clean_urls));
    chain.push(NotFound);

    let crawler = Crawler::with_options(chain, config.crawler.crawl_options());
    let result = crawler.run().await?;

    if !cli.quiet {
        result.summary_to_console()?;
    }

    if let Some(path) = &config.output.json_path {
        result
            .write_json(path, config.output.pretty)
            .with_context(|| format!("failed to write {}", path.display()))?;
        tracing::info!("Report written to {}", path.display());
    }

    Ok(result.error_count())
}

/// Applies command-line flags on top of the loaded configuration
fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(public) = &cli.public {
        config.site.public = public.clone();
    }
    if cli.clean_urls {
        config.site.clean_urls = true;
    }
    if cli.allow_duplicate_urls {
        config.crawler.disable_duplicate_urls = false;
    }
    if cli.no_normalize_trailing_slash {
        config.crawler.normalize_trailing_slash = false;
    }
    if let Some(json) = &cli.json {
        config.output.json_path = Some(json.clone());
    }
    if cli.pretty {
        config.output.pretty = true;
    }
}
