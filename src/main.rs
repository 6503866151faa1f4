use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use fetchlist::config::{Config, DEFAULT_CONFIG_FILE};
use fetchlist::pipeline;

#[derive(Parser, Debug)]
#[command(
    name = "fetchlist",
    version,
    about = "Flatten a YAML feed list into a tab-separated fetch manifest"
)]
struct Args {
    /// YAML feed list to read [default: list.yml]
    #[arg(short, long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Manifest file to write [default: fetch-list.txt]
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Also write an OPML export with feed titles and tags
    #[arg(long, value_name = "FILE")]
    opml: Option<PathBuf>,

    /// Config file (optional; missing file means defaults)
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Skip the warning pass over feed URLs
    #[arg(long)]
    no_check_urls: bool,
}

impl Args {
    /// CLI flags take precedence over the config file.
    fn apply(self, mut config: Config) -> Config {
        if let Some(input) = self.input {
            config.input = input;
        }
        if let Some(output) = self.output {
            config.output = output;
        }
        if let Some(opml) = self.opml {
            config.opml = Some(opml);
        }
        if self.no_check_urls {
            config.check_urls = false;
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Diagnostics go to stderr; stdout stays empty
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = Config::load(&args.config)
        .with_context(|| format!("Failed to load config '{}'", args.config.display()))?;
    let config = args.apply(config);
    tracing::debug!(config = ?config, "Resolved configuration");

    let summary = pipeline::run(&config).await?;

    tracing::info!(
        records = summary.records,
        output = %summary.output.display(),
        "Done"
    );
    Ok(())
}
