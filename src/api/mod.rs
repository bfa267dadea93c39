use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

use crate::config::Config;
use crate::history::{BackendHealth, ClearReceipt, HistoryPage};

pub mod http;

/// Seam between the dashboard and the prediction backend. The HTTP
/// implementation lives in [`http`]; tests drive the dashboard through an
/// in-memory stub.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn fetch_history(&self) -> Result<HistoryPage>;
    async fn download_prediction(&self, id: &str) -> Result<Vec<u8>>;
    async fn download_all(&self) -> Result<Vec<u8>>;
    async fn clear_history(&self) -> Result<ClearReceipt>;
    async fn health(&self) -> Result<BackendHealth>;
}

pub fn build(cfg: &Config) -> Arc<dyn Backend> {
    Arc::new(http::HttpBackend::new(cfg))
}
