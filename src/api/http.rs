use anyhow::{anyhow, Result};
use reqwest::Client;

use crate::api::Backend;
use crate::config::Config;
use crate::history::{BackendHealth, ClearReceipt, HistoryPage};

/// HTTP client for the prediction backend. No timeouts and no retries:
/// in-flight requests are allowed to resolve late and the event loop treats
/// whatever arrives last as authoritative.
pub struct HttpBackend {
    client: Client,
    base: String,
}

impl HttpBackend {
    pub fn new(cfg: &Config) -> Self {
        Self {
            client: Client::new(),
            base: cfg.base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn fetch_csv(&self, url: String) -> Result<Vec<u8>> {
        let resp = self.client.get(&url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(anyhow!("download failed: {}", status));
        }
        Ok(resp.bytes().await?.to_vec())
    }
}

#[async_trait::async_trait]
impl Backend for HttpBackend {
    async fn fetch_history(&self) -> Result<HistoryPage> {
        let url = format!("{}/get_predictions_history", self.base);
        let resp = self.client.get(&url).send().await?;
        Ok(resp.json().await?)
    }

    async fn download_prediction(&self, id: &str) -> Result<Vec<u8>> {
        self.fetch_csv(format!("{}/download_predictions/{}", self.base, id))
            .await
    }

    async fn download_all(&self) -> Result<Vec<u8>> {
        self.fetch_csv(format!("{}/download_all_predictions", self.base))
            .await
    }

    async fn clear_history(&self) -> Result<ClearReceipt> {
        let url = format!("{}/clear_predictions_history", self.base);
        let resp = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .send()
            .await?;
        Ok(resp.json().await?)
    }

    async fn health(&self) -> Result<BackendHealth> {
        let url = format!("{}/health", self.base);
        let resp = self.client.get(&url).send().await?;
        Ok(resp.json().await?)
    }
}
