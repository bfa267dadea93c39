//! Wire types for the prediction-history API.
//!
//! Everything except the record id is optional at the wire level: a missing
//! field degrades display, it never fails deserialization. Batch preview
//! entries arrive with capitalized CSV-derived keys (`Risk_Level`,
//! `Probability`) while single-prediction entries use lowercase keys; both
//! spellings map onto one entry type.

use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

/// Response of `GET /get_predictions_history`.
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryPage {
    pub success: bool,
    #[serde(default)]
    pub history: Vec<PredictionRecord>,
    #[serde(default)]
    pub total_count: u64,
    #[serde(default)]
    pub error: Option<String>,
}

/// One stored prediction, single or batch.
#[derive(Debug, Clone, Deserialize)]
pub struct PredictionRecord {
    pub id: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub model_used: Option<String>,
    #[serde(default)]
    pub input_data: HashMap<String, Value>,
    #[serde(default)]
    pub predictions: Vec<PredictionEntry>,
    #[serde(default)]
    pub statistics: Option<BatchStats>,
}

impl PredictionRecord {
    /// Anything that is not explicitly `single` is treated as a batch.
    pub fn is_batch(&self) -> bool {
        self.kind.as_deref() != Some("single")
    }

    /// Id truncated for table display.
    pub fn short_id(&self) -> String {
        self.id.chars().take(6).collect()
    }

    /// Record count for badges: server statistics win, entry count is the
    /// fallback.
    pub fn record_count(&self) -> u64 {
        self.statistics
            .as_ref()
            .and_then(|s| s.total_records)
            .unwrap_or(self.predictions.len() as u64)
    }

    pub fn first_outcome(&self) -> Option<&PredictionEntry> {
        self.predictions.first()
    }
}

/// Per-record inference result. Single predictions carry only probability
/// and risk level; batch entries also echo the original feature values.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PredictionEntry {
    #[serde(default, alias = "Probability")]
    pub probability: Option<f64>,
    #[serde(default, alias = "Risk_Level")]
    pub risk_level: Option<String>,
    #[serde(default, rename = "Glucose")]
    pub glucose: Option<f64>,
    #[serde(default, rename = "BMI")]
    pub bmi: Option<f64>,
    #[serde(default, rename = "Age")]
    pub age: Option<f64>,
}

impl PredictionEntry {
    pub fn is_high_risk(&self) -> bool {
        self.risk_level.as_deref() == Some("High")
    }
}

/// Aggregate counts attached to batch records.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct BatchStats {
    #[serde(default)]
    pub total_records: Option<u64>,
    #[serde(default)]
    pub high_risk: Option<u64>,
    #[serde(default)]
    pub low_risk: Option<u64>,
    #[serde(default)]
    pub high_risk_percentage: Option<f64>,
}

/// Response of `POST /clear_predictions_history`.
#[derive(Debug, Clone, Deserialize)]
pub struct ClearReceipt {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Response of `GET /health` (backend status probe).
#[derive(Debug, Clone, Deserialize)]
pub struct BackendHealth {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub model_loaded: bool,
    #[serde(default)]
    pub scaler_loaded: bool,
    #[serde(default)]
    pub timestamp: Option<String>,
}
