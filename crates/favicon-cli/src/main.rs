use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use favicon_core::OverrideTable;
use favicon_resolver::{FaviconResolver, ResolveOptions, ResolverSettings, TouchIconPolicy};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "favicon-cli")]
#[command(about = "Resolve the best icon for a website")]
struct Cli {
    /// Try Apple touch icons before any other candidate.
    #[arg(long, global = true)]
    prefer_touch_icons: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the icon URL (or a sentinel data URI).
    Text {
        query: String,
        /// Return the top-ranked candidate without validating it.
        #[arg(long)]
        fast: bool,
    },
    /// Download the icon to a file.
    Image {
        query: String,
        #[arg(short, long)]
        output: PathBuf,
        #[arg(long)]
        fast: bool,
    },
    /// Print every candidate URL in validation order.
    List { query: String },
    /// Print the resolution trace as JSON.
    Debug { query: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = favicon_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let mut settings = ResolverSettings::from_app_config(&config);
    if cli.prefer_touch_icons {
        settings.touch_icon_policy = TouchIconPolicy::Preferred;
    }
    let overrides = OverrideTable::from_app_config(&config)?;
    let resolver = FaviconResolver::new(settings, overrides)?;

    match cli.command {
        Commands::Text { query, fast } => {
            let resolution = resolver.resolve(&query, ResolveOptions { fast }).await;
            println!("{}", resolution.into_text());
        }
        Commands::Image {
            query,
            output,
            fast,
        } => {
            let image = resolver
                .resolve_image(&query, ResolveOptions { fast })
                .await;
            tokio::fs::write(&output, &image.bytes)
                .await
                .with_context(|| format!("failed to write {}", output.display()))?;
            println!(
                "wrote {} bytes ({}) to {}",
                image.bytes.len(),
                image.mime_type,
                output.display()
            );
        }
        Commands::List { query } => {
            for url in resolver.list_candidates(&query).await {
                println!("{url}");
            }
        }
        Commands::Debug { query } => {
            let diagnostics = resolver.debug(&query).await;
            println!("{}", serde_json::to_string_pretty(&diagnostics)?);
        }
    }

    Ok(())
}
