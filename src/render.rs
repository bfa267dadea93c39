//! Text templating for the history table and the batch detail view.
//!
//! Rendering is wholesale: every redraw rebuilds the full table from the
//! latest page, there is no row diffing. Absent fields degrade to `N/A`,
//! they never fail a render.

use serde_json::Value;

use crate::history::{PredictionEntry, PredictionRecord};

/// Detail previews are capped at the first 10 entries.
pub const PREVIEW_ROWS: usize = 10;

const ID_W: usize = 8;
const TS_W: usize = 21;
const TYPE_W: usize = 8;
const FEAT_W: usize = 34;
const RISK_W: usize = 18;
const PRED_W: usize = 20;

/// Render the history collection as an aligned table. An empty collection
/// renders the placeholder row.
pub fn history_table(records: &[PredictionRecord]) -> String {
    let mut out = String::new();
    push_row(
        &mut out,
        ["ID", "TIMESTAMP", "TYPE", "FEATURES", "RISK", "PREDICTION", "ACTIONS"],
    );
    out.push_str(&"-".repeat(ID_W + TS_W + TYPE_W + FEAT_W + RISK_W + PRED_W + 18));
    out.push('\n');

    if records.is_empty() {
        out.push_str("(no predictions yet)\n");
        return out;
    }

    for rec in records {
        let (features, risk, prediction) = summary_cells(rec);
        let actions = if rec.is_batch() {
            "[d]ownload [v]iew"
        } else {
            "[d]ownload"
        };
        push_row(
            &mut out,
            [
                &rec.short_id(),
                rec.timestamp.as_deref().unwrap_or("N/A"),
                if rec.is_batch() { "batch" } else { "single" },
                &features,
                &risk,
                &prediction,
                actions,
            ],
        );
    }
    out
}

/// Render the two-panel batch summary plus a bounded preview table.
pub fn batch_detail(rec: &PredictionRecord) -> String {
    let mut out = String::new();
    out.push_str("=== Batch Details ");
    out.push_str(&"=".repeat(60));
    out.push('\n');

    let stats = rec.statistics.unwrap_or_default();
    let left = [
        format!("ID:        {}", rec.id),
        format!("Timestamp: {}", rec.timestamp.as_deref().unwrap_or("N/A")),
        format!("Model:     {}", rec.model_used.as_deref().unwrap_or("N/A")),
        format!("Type:      {}", rec.kind.as_deref().unwrap_or("N/A")),
    ];
    let right = [
        format!("Total Records: {}", rec.record_count()),
        format!("High Risk:     {}", fmt_opt_u64(stats.high_risk)),
        format!("Low Risk:      {}", fmt_opt_u64(stats.low_risk)),
        format!("High Risk %:   {}%", fmt_opt_f64(stats.high_risk_percentage)),
    ];
    out.push_str(&format!("{:<44}{}\n", "Batch Information", "Statistics"));
    for (l, r) in left.iter().zip(right.iter()) {
        out.push_str(&format!("  {:<42}  {}\n", l, r));
    }
    out.push('\n');

    out.push_str(&format!("Sample Predictions (first {})\n", PREVIEW_ROWS));
    out.push_str(&format!(
        "  {:>3}  {:>8}  {:>6}  {:>4}  {:<12}  {}\n",
        "#", "Glucose", "BMI", "Age", "Prediction", "Probability"
    ));
    for (index, entry) in rec.predictions.iter().take(PREVIEW_ROWS).enumerate() {
        out.push_str(&format!(
            "  {:>3}  {:>8}  {:>6}  {:>4}  {:<12}  {}\n",
            index + 1,
            fmt_opt_f64(entry.glucose),
            fmt_opt_f64(entry.bmi),
            fmt_opt_f64(entry.age),
            risk_badge(entry),
            fmt_opt_f64(entry.probability),
        ));
    }
    if rec.predictions.len() > PREVIEW_ROWS {
        out.push_str(&format!(
            "  ... and {} more records\n",
            rec.predictions.len() - PREVIEW_ROWS
        ));
    }
    out.push('\n');
    out.push_str("[d] download this batch   [x] close\n");
    out
}

/// Features / risk / prediction cells for one table row.
fn summary_cells(rec: &PredictionRecord) -> (String, String, String) {
    if rec.is_batch() {
        let stats = rec.statistics.unwrap_or_default();
        let features = format!("Batch: {} records", rec.record_count());
        let risk = format!("{}% High Risk", fmt_opt_f64(stats.high_risk_percentage));
        let prediction = format!(
            "{} High, {} Low",
            stats.high_risk.unwrap_or(0),
            stats.low_risk.unwrap_or(0)
        );
        (features, risk, prediction)
    } else {
        let features = format!(
            "Glucose {} / BMI {} / Age {}",
            fmt_feature(rec.input_data.get("Glucose")),
            fmt_feature(rec.input_data.get("BMI")),
            fmt_feature(rec.input_data.get("Age")),
        );
        match rec.first_outcome() {
            Some(entry) => (
                features,
                format!("{}%", fmt_opt_f64(entry.probability)),
                risk_badge(entry).to_string(),
            ),
            None => (features, "N/A".to_string(), "N/A".to_string()),
        }
    }
}

fn risk_badge(entry: &PredictionEntry) -> &'static str {
    if entry.is_high_risk() {
        "[HIGH RISK]"
    } else {
        "[LOW RISK]"
    }
}

/// Input features arrive as arbitrary JSON scalars.
fn fmt_feature(value: Option<&Value>) -> String {
    match value {
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::String(s)) => s.clone(),
        _ => "N/A".to_string(),
    }
}

fn fmt_opt_f64(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{}", v),
        None => "N/A".to_string(),
    }
}

fn fmt_opt_u64(value: Option<u64>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "N/A".to_string(),
    }
}

fn push_row(out: &mut String, cells: [&str; 7]) {
    let [id, ts, kind, features, risk, prediction, actions] = cells;
    out.push_str(&format!(
        "{:<id_w$}{:<ts_w$}{:<type_w$}{:<feat_w$}{:<risk_w$}{:<pred_w$}{}\n",
        id,
        ts,
        kind,
        features,
        risk,
        prediction,
        actions,
        id_w = ID_W,
        ts_w = TS_W,
        type_w = TYPE_W,
        feat_w = FEAT_W,
        risk_w = RISK_W,
        pred_w = PRED_W,
    ));
}
