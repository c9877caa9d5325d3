// Binary entry point for the WordPress to Contentful import.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use contentful_client::ContentfulClient;
use wp_import::{
    BuildOutcome, Config, ContentfulStore, ExportDocument, Gateway, MarkdownRichText, Pipeline,
    RetryPolicy,
};

#[derive(Parser, Debug)]
#[command(name = "wp-import", about = "Import a WordPress export into Contentful")]
struct Args {
    /// Path to the pre-parsed WordPress export (JSON)
    data: PathBuf,

    /// Minimum milliseconds between remote API calls
    #[arg(long, default_value_t = 100)]
    min_spacing_ms: u64,

    /// Retry attempts for create/publish/process calls
    #[arg(long, default_value_t = 5)]
    max_attempts: u32,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,wp_import=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let config = Config::from_env().context("Failed to load configuration")?;

    let raw = std::fs::read_to_string(&args.data)
        .with_context(|| format!("Failed to read {}", args.data.display()))?;
    let document: ExportDocument =
        serde_json::from_str(&raw).context("Failed to parse export document")?;

    let client = ContentfulClient::new(config.management_token.clone());
    let space = client
        .get_space(&config.space_id)
        .await
        .context("Failed to fetch Contentful space")?;
    tracing::info!(
        space = %space.sys.id,
        name = space.name.as_deref().unwrap_or_default(),
        "Connected to Contentful space"
    );

    let environment = client
        .get_environment(&config.space_id, &config.environment_id)
        .await
        .context("Failed to fetch Contentful environment")?;

    let store = Gateway::new(
        ContentfulStore::new(environment),
        Duration::from_millis(args.min_spacing_ms),
    );
    let pipeline = Pipeline::new(store, MarkdownRichText::new()).with_policy(RetryPolicy {
        max_attempts: args.max_attempts,
        ..RetryPolicy::default()
    });

    let ctx = pipeline.run(&document).await?;

    let pages: Vec<_> = ctx.pages.iter().filter_map(BuildOutcome::entry).collect();
    println!("{}", serde_json::to_string_pretty(&pages)?);

    Ok(())
}
