//! Pure Contentful Content Management API client.
//!
//! A minimal client for the pieces of the management API an import needs:
//! space/environment lookup, assets (get, create-with-id, process) and
//! entries (get, create-with-id, publish).
//!
//! # Example
//!
//! ```rust,ignore
//! use contentful_client::ContentfulClient;
//!
//! let client = ContentfulClient::new("your-management-token".into());
//! let environment = client.get_environment("space-id", "master").await?;
//!
//! let entry = environment.get_entry("2f2e8a9c1b").await?;
//! println!("{}", entry.sys.id);
//! ```

pub mod error;
pub mod types;

pub use error::{ContentfulError, Result};
pub use types::{Asset, Entry, EnvironmentData, Link, Space, Sys};

use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;

const BASE_URL: &str = "https://api.contentful.com";

/// Content type the management API expects on write requests.
const MANAGEMENT_CONTENT_TYPE: &str = "application/vnd.contentful.management.v1+json";

pub struct ContentfulClient {
    client: reqwest::Client,
    token: String,
    base_url: String,
}

impl ContentfulClient {
    pub fn new(token: String) -> Self {
        Self::with_base_url(token, BASE_URL.to_string())
    }

    /// Point the client at a different API host (e.g. a test server).
    pub fn with_base_url(token: String, base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            token,
            base_url,
        }
    }

    /// Fetch a space by ID.
    pub async fn get_space(&self, space_id: &str) -> Result<Space> {
        let url = format!("{}/spaces/{}", self.base_url, space_id);
        send_json(self.client.get(&url).bearer_auth(&self.token)).await
    }

    /// Fetch an environment and return a handle scoped to it.
    pub async fn get_environment(
        &self,
        space_id: &str,
        environment_id: &str,
    ) -> Result<Environment> {
        let base = format!(
            "{}/spaces/{}/environments/{}",
            self.base_url, space_id, environment_id
        );
        let data: EnvironmentData =
            send_json(self.client.get(&base).bearer_auth(&self.token)).await?;

        tracing::info!(environment = %data.sys.id, "Resolved Contentful environment");

        Ok(Environment {
            client: self.client.clone(),
            token: self.token.clone(),
            base,
            data,
        })
    }
}

/// Handle for one space environment. All asset and entry operations are
/// scoped to the environment's URL prefix.
#[derive(Clone)]
pub struct Environment {
    client: reqwest::Client,
    token: String,
    base: String,
    data: EnvironmentData,
}

impl Environment {
    pub fn data(&self) -> &EnvironmentData {
        &self.data
    }

    /// Fetch an asset by ID. A missing asset surfaces as an `Api` error
    /// with status 404 (check with [`ContentfulError::is_not_found`]).
    pub async fn get_asset(&self, asset_id: &str) -> Result<Asset> {
        let url = format!("{}/assets/{}", self.base, asset_id);
        send_json(self.client.get(&url).bearer_auth(&self.token)).await
    }

    /// Create an asset under a caller-chosen ID.
    pub async fn create_asset_with_id(
        &self,
        asset_id: &str,
        fields: &serde_json::Value,
    ) -> Result<Asset> {
        let url = format!("{}/assets/{}", self.base, asset_id);
        let body = serde_json::json!({ "fields": fields });
        tracing::debug!(asset_id, "Creating asset");
        send_json(
            self.client
                .put(&url)
                .bearer_auth(&self.token)
                .header(reqwest::header::CONTENT_TYPE, MANAGEMENT_CONTENT_TYPE)
                .json(&body),
        )
        .await
    }

    /// Kick off file processing for every locale present on the asset's
    /// `file` field. Processing is asynchronous on Contentful's side.
    pub async fn process_asset_for_all_locales(&self, asset: &Asset) -> Result<()> {
        let version = asset.sys.version.ok_or(ContentfulError::MissingVersion {
            id: asset.sys.id.clone(),
        })?;

        let locales: Vec<String> = asset
            .fields
            .get("file")
            .and_then(|file| file.as_object())
            .map(|map| map.keys().cloned().collect())
            .unwrap_or_default();

        for locale in locales {
            let url = format!(
                "{}/assets/{}/files/{}/process",
                self.base, asset.sys.id, locale
            );
            let resp = self
                .client
                .put(&url)
                .bearer_auth(&self.token)
                .header("X-Contentful-Version", version)
                .send()
                .await?;

            let status = resp.status();
            if !status.is_success() {
                let body = resp.text().await.unwrap_or_default();
                return Err(ContentfulError::Api {
                    status: status.as_u16(),
                    message: body,
                });
            }
            tracing::debug!(asset_id = %asset.sys.id, %locale, "Asset processing triggered");
        }

        Ok(())
    }

    /// Fetch an entry by ID. Missing entries surface as 404 `Api` errors.
    pub async fn get_entry(&self, entry_id: &str) -> Result<Entry> {
        let url = format!("{}/entries/{}", self.base, entry_id);
        send_json(self.client.get(&url).bearer_auth(&self.token)).await
    }

    /// Create an entry of the given content type under a caller-chosen ID.
    pub async fn create_entry_with_id(
        &self,
        content_type_id: &str,
        entry_id: &str,
        data: &serde_json::Value,
    ) -> Result<Entry> {
        let url = format!("{}/entries/{}", self.base, entry_id);
        tracing::debug!(entry_id, content_type_id, "Creating entry");
        send_json(
            self.client
                .put(&url)
                .bearer_auth(&self.token)
                .header(reqwest::header::CONTENT_TYPE, MANAGEMENT_CONTENT_TYPE)
                .header("X-Contentful-Content-Type", content_type_id)
                .json(data),
        )
        .await
    }

    /// Publish a draft entry.
    pub async fn publish_entry(&self, entry: &Entry) -> Result<Entry> {
        let version = entry.sys.version.ok_or(ContentfulError::MissingVersion {
            id: entry.sys.id.clone(),
        })?;
        let url = format!("{}/entries/{}/published", self.base, entry.sys.id);
        tracing::debug!(entry_id = %entry.sys.id, version, "Publishing entry");
        send_json(
            self.client
                .put(&url)
                .bearer_auth(&self.token)
                .header("X-Contentful-Version", version),
        )
        .await
    }
}

async fn send_json<T: DeserializeOwned>(req: RequestBuilder) -> Result<T> {
    let resp = req.send().await?;
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(ContentfulError::Api {
            status: status.as_u16(),
            message: body,
        });
    }
    Ok(resp.json().await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_is_distinguishable() {
        let err = ContentfulError::Api {
            status: 404,
            message: "The resource could not be found.".to_string(),
        };
        assert!(err.is_not_found());

        let err = ContentfulError::Api {
            status: 500,
            message: "boom".to_string(),
        };
        assert!(!err.is_not_found());
        assert_eq!(err.status(), Some(500));
    }
}
