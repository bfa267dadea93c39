//! End-to-end dashboard flows against an in-memory backend stub.
//!
//! These cover the loop-level behavior the unit tests cannot: load, clear
//! then reload, detail lookup through a refetch, and download outcomes.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::path::Path;
use std::sync::Mutex;

use riskdash::api::Backend;
use riskdash::download;
use riskdash::history::{BackendHealth, ClearReceipt, HistoryPage, PredictionRecord};
use riskdash::session::Dashboard;

struct StubBackend {
    records: Mutex<Vec<PredictionRecord>>,
    fail_downloads: bool,
}

impl StubBackend {
    fn with_records(records: Vec<PredictionRecord>) -> Self {
        Self {
            records: Mutex::new(records),
            fail_downloads: false,
        }
    }

    fn failing_downloads() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            fail_downloads: true,
        }
    }
}

#[async_trait]
impl Backend for StubBackend {
    async fn fetch_history(&self) -> Result<HistoryPage> {
        let records = self.records.lock().unwrap().clone();
        Ok(HistoryPage {
            success: true,
            total_count: records.len() as u64,
            history: records,
            error: None,
        })
    }

    async fn download_prediction(&self, id: &str) -> Result<Vec<u8>> {
        if self.fail_downloads {
            return Err(anyhow!("download failed: 500 Internal Server Error"));
        }
        Ok(format!("id,probability\n{},0.5\n", id).into_bytes())
    }

    async fn download_all(&self) -> Result<Vec<u8>> {
        if self.fail_downloads {
            return Err(anyhow!("download failed: 500 Internal Server Error"));
        }
        Ok(b"id,probability\n".to_vec())
    }

    async fn clear_history(&self) -> Result<ClearReceipt> {
        self.records.lock().unwrap().clear();
        Ok(ClearReceipt {
            success: true,
            message: Some("History cleared".to_string()),
            error: None,
        })
    }

    async fn health(&self) -> Result<BackendHealth> {
        Ok(BackendHealth {
            status: Some("healthy".to_string()),
            model_loaded: true,
            scaler_loaded: true,
            timestamp: None,
        })
    }
}

fn single(id: &str) -> PredictionRecord {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "timestamp": "2025-08-01 10:00:00",
        "type": "single",
        "model_used": "logistic_v1",
        "input_data": {"Glucose": 148, "BMI": 33.6, "Age": 50},
        "predictions": [{"probability": 72.5, "risk_level": "High"}],
    }))
    .unwrap()
}

fn batch(id: &str, entries: usize) -> PredictionRecord {
    let preds: Vec<_> = (0..entries)
        .map(|i| {
            serde_json::json!({
                "Glucose": 100 + i, "BMI": 25.0, "Age": 40,
                "Risk_Level": if i % 4 == 0 { "High" } else { "Low" },
                "Probability": i as f64 / 100.0,
            })
        })
        .collect();
    serde_json::from_value(serde_json::json!({
        "id": id,
        "timestamp": "2025-08-01 11:00:00",
        "type": "batch",
        "model_used": "logistic_v1",
        "predictions": preds,
        "statistics": {
            "total_records": entries,
            "high_risk": entries.div_ceil(4),
            "low_risk": entries - entries.div_ceil(4),
            "high_risk_percentage": 25.0,
        },
    }))
    .unwrap()
}

fn files_in(dir: &Path) -> usize {
    std::fs::read_dir(dir).map(|rd| rd.count()).unwrap_or(0)
}

#[tokio::test]
async fn load_renders_one_row_per_record() {
    let backend = StubBackend::with_records(vec![single("a1"), batch("b1", 3)]);
    let mut dash = Dashboard::new();

    dash.apply_history(backend.fetch_history().await.unwrap());
    assert_eq!(dash.total(), 2);
    assert_eq!(dash.records().len(), 2);
    let screen = dash.render();
    assert!(screen.contains("2 predictions"));
    assert!(screen.contains("a1"));
    assert!(screen.contains("b1"));
    assert!(!screen.contains("(no predictions yet)"));
}

#[tokio::test]
async fn clear_then_reload_renders_placeholder() {
    let backend = StubBackend::with_records(vec![single("a1")]);
    let mut dash = Dashboard::new();

    dash.apply_history(backend.fetch_history().await.unwrap());
    assert!(dash.render().contains("a1"));

    let receipt = backend.clear_history().await.unwrap();
    assert!(receipt.success);
    dash.notices.success(receipt.message.unwrap());

    // The reload after a successful clear is expected to come back empty.
    dash.apply_history(backend.fetch_history().await.unwrap());
    let screen = dash.render();
    assert!(screen.contains("[ok] History cleared"));
    assert!(screen.contains("(no predictions yet)"));
    assert!(screen.contains("0 predictions"));
}

#[tokio::test]
async fn failed_download_writes_no_file() {
    let backend = StubBackend::failing_downloads();
    let mut dash = Dashboard::new();
    let dir = tempfile::tempdir().unwrap();

    let name = download::prediction_filename("a1");
    let result = backend
        .download_prediction("a1")
        .await
        .and_then(|bytes| download::save(dir.path(), &name, &bytes));
    assert!(result.is_err());
    dash.notices.error("Failed to download predictions");

    assert_eq!(files_in(dir.path()), 0);
    assert!(dash.render().contains("[error] Failed to download predictions"));
}

#[tokio::test]
async fn successful_download_saves_csv() {
    let backend = StubBackend::with_records(vec![single("a1")]);
    let dir = tempfile::tempdir().unwrap();

    let name = download::prediction_filename("a1");
    let path = backend
        .download_prediction("a1")
        .await
        .and_then(|bytes| download::save(dir.path(), &name, &bytes))
        .unwrap();
    assert!(path.ends_with("prediction_a1.csv"));
    let body = std::fs::read_to_string(&path).unwrap();
    assert!(body.starts_with("id,probability"));
}

#[tokio::test]
async fn batch_detail_is_found_through_refetch() {
    let backend = StubBackend::with_records(vec![single("a1"), batch("b1", 25)]);
    let mut dash = Dashboard::new();

    // The viewer re-fetches the collection rather than reusing the table.
    let page = backend.fetch_history().await.unwrap();
    dash.apply_detail("b1", page);

    let screen = dash.render();
    assert!(screen.contains("Batch Details"));
    assert!(screen.contains("Total Records: 25"));
    assert!(screen.contains("... and 15 more records"));
}

#[tokio::test]
async fn unmatched_detail_id_is_silent() {
    let backend = StubBackend::with_records(vec![single("a1")]);
    let mut dash = Dashboard::new();

    let page = backend.fetch_history().await.unwrap();
    dash.apply_detail("no-such-id", page);

    let screen = dash.render();
    assert!(!screen.contains("Batch Details"));
    assert!(dash.notices.is_empty());
}

#[tokio::test]
async fn health_probe_feeds_header() {
    let backend = StubBackend::with_records(vec![]);
    let mut dash = Dashboard::new();

    dash.set_health(backend.health().await.ok());
    assert!(dash.render().contains("backend: healthy (model+scaler loaded)"));

    dash.set_health(None);
    assert!(dash.render().contains("backend: unreachable"));
}
