//! Show catalog client.

use std::future::Future;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::CatalogConfig;
use crate::error::CatalogError;
use crate::model::{ShowPreview, ShowRecord};

/// Asynchronous lookup of show data.  Implementations resolve or fail; they
/// never hang past their own timeout.
pub trait ShowCatalog: Send + Sync + 'static {
    fn fetch_show(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<ShowRecord, CatalogError>> + Send;

    fn fetch_previews(&self) -> impl Future<Output = Result<Vec<ShowPreview>, CatalogError>> + Send;
}

/// Catalog backed by the podcast HTTP API.
pub struct HttpCatalog {
    client: Client,
    base_url: String,
}

impl HttpCatalog {
    pub fn new(config: &CatalogConfig) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .user_agent(concat!("podshelf/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn previews_url(&self) -> String {
        format!("{}/", self.base_url)
    }

    pub fn show_url(&self, id: &str) -> String {
        format!("{}/id/{}", self.base_url, id.trim())
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, CatalogError> {
        debug!("catalog: GET {}", url);
        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| CatalogError::Decode(e.to_string()))
    }
}

impl ShowCatalog for HttpCatalog {
    async fn fetch_show(&self, id: &str) -> Result<ShowRecord, CatalogError> {
        let url = self.show_url(id);
        match self.get_json::<ShowRecord>(&url).await {
            Err(CatalogError::Status { status, .. }) if status == StatusCode::NOT_FOUND.as_u16() => {
                Err(CatalogError::NotFound(id.to_string()))
            }
            other => other,
        }
    }

    async fn fetch_previews(&self) -> Result<Vec<ShowPreview>, CatalogError> {
        let url = self.previews_url();
        self.get_json(&url).await
    }
}
