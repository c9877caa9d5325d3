use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;

/// Importer configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub management_token: String,
    pub space_id: String,
    pub environment_id: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            management_token: env::var("CONTENTFUL_CONTENT_MANAGEMENT_TOKEN")
                .context("CONTENTFUL_CONTENT_MANAGEMENT_TOKEN must be set")?,
            space_id: env::var("CONTENTFUL_SPACE_ID")
                .context("CONTENTFUL_SPACE_ID must be set")?,
            environment_id: env::var("CONTENTFUL_ENVIRONMENT_ID")
                .unwrap_or_else(|_| "master".to_string()),
        })
    }
}
