//! Report generator: fetches the prediction history once and writes a
//! self-contained HTML snapshot (embedded template, no external assets).
//!
//! Output: out/report/index.html

use anyhow::Result;
use serde_json::Value;
use std::fs;

use riskdash::api;
use riskdash::config::Config;
use riskdash::history::PredictionRecord;
use riskdash::render::PREVIEW_ROWS;

fn esc(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

fn fmt_opt(v: Option<f64>) -> String {
    v.map(|v| format!("{}", v)).unwrap_or_else(|| "N/A".to_string())
}

fn feature(rec: &PredictionRecord, key: &str) -> String {
    match rec.input_data.get(key) {
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::String(s)) => esc(s),
        _ => "N/A".to_string(),
    }
}

fn row_html(rec: &PredictionRecord) -> String {
    let (type_badge, features, risk, prediction) = if rec.is_batch() {
        let stats = rec.statistics.unwrap_or_default();
        (
            r#"<span class="badge type-batch">batch</span>"#.to_string(),
            format!("Batch: {} records", rec.record_count()),
            format!("{}% High Risk", fmt_opt(stats.high_risk_percentage)),
            format!(
                "{} High, {} Low",
                stats.high_risk.unwrap_or(0),
                stats.low_risk.unwrap_or(0)
            ),
        )
    } else {
        let features = format!(
            "Glucose {} / BMI {} / Age {}",
            feature(rec, "Glucose"),
            feature(rec, "BMI"),
            feature(rec, "Age")
        );
        let (risk, prediction) = match rec.first_outcome() {
            Some(entry) => (
                format!("{}%", fmt_opt(entry.probability)),
                if entry.is_high_risk() {
                    r#"<span class="badge risk-high">High Risk</span>"#.to_string()
                } else {
                    r#"<span class="badge risk-low">Low Risk</span>"#.to_string()
                },
            ),
            None => ("N/A".to_string(), "N/A".to_string()),
        };
        (
            r#"<span class="badge type-single">single</span>"#.to_string(),
            features,
            risk,
            prediction,
        )
    };

    let mut out = format!(
        "<tr><td><code>{}</code></td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
        esc(&rec.short_id()),
        esc(rec.timestamp.as_deref().unwrap_or("N/A")),
        type_badge,
        features,
        risk,
        prediction,
    );
    if rec.is_batch() && !rec.predictions.is_empty() {
        out.push_str(&format!(
            "<tr class=\"detail-row\"><td colspan=\"6\">{}</td></tr>\n",
            detail_html(rec)
        ));
    }
    out
}

/// Collapsible per-batch preview, capped like the interactive detail view.
fn detail_html(rec: &PredictionRecord) -> String {
    let mut rows = String::new();
    for (index, entry) in rec.predictions.iter().take(PREVIEW_ROWS).enumerate() {
        rows.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            index + 1,
            fmt_opt(entry.glucose),
            fmt_opt(entry.bmi),
            fmt_opt(entry.age),
            entry.risk_level.as_deref().map(esc).unwrap_or_else(|| "N/A".to_string()),
            fmt_opt(entry.probability),
        ));
    }
    let more = if rec.predictions.len() > PREVIEW_ROWS {
        format!(
            r#"<tr><td colspan="6" class="muted">... and {} more records</td></tr>"#,
            rec.predictions.len() - PREVIEW_ROWS
        )
    } else {
        String::new()
    };
    format!(
        "<details><summary>Sample predictions (first {})</summary>\
         <table><thead><tr><th>#</th><th>Glucose</th><th>BMI</th><th>Age</th>\
         <th>Prediction</th><th>Probability</th></tr></thead><tbody>{}{}</tbody></table></details>",
        PREVIEW_ROWS, rows, more
    )
}

#[tokio::main]
async fn main() -> Result<()> {
    println!("=== riskdash report generator ===");

    let cfg = Config::from_env();
    let backend = api::build(&cfg);

    let page = backend.fetch_history().await?;
    if !page.success {
        anyhow::bail!(
            "history fetch reported failure: {}",
            page.error.unwrap_or_else(|| "unknown error".to_string())
        );
    }
    let backend_line = match backend.health().await {
        Ok(h) => format!(
            "{} (model loaded: {})",
            h.status.as_deref().unwrap_or("unknown"),
            h.model_loaded
        ),
        Err(_) => "unreachable".to_string(),
    };

    println!("  records: {}", page.history.len());
    println!("  backend: {}", backend_line);

    let mut rows = String::new();
    if page.history.is_empty() {
        rows.push_str(r#"<tr><td colspan="6" class="muted">no predictions yet</td></tr>"#);
    }
    for rec in &page.history {
        rows.push_str(&row_html(rec));
    }

    let html = TEMPLATE
        .replace("__GENERATED__", &chrono::Utc::now().to_rfc3339())
        .replace("__COUNT__", &page.total_count.to_string())
        .replace("__BACKEND__", &esc(&backend_line))
        .replace("__ROWS__", &rows);

    fs::create_dir_all("out/report")?;
    fs::write("out/report/index.html", &html)?;
    println!(
        "  out/report/index.html written ({:.1} KB)",
        html.len() as f64 / 1024.0
    );
    Ok(())
}

const TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>riskdash report</title>
  <style>
    :root {
      --bg: #0d1117; --bg-raised: #161b22;
      --fg: #c9d1d9; --fg-muted: #8b949e; --fg-bright: #f0f6fc;
      --accent: #58a6ff;
      --green: #3fb950; --green-muted: #0d2818;
      --red: #f85149; --red-muted: #2d0000;
      --border: #30363d;
      --mono: 'JetBrains Mono', 'SF Mono', monospace;
      --sans: -apple-system, BlinkMacSystemFont, 'Segoe UI', Helvetica, Arial, sans-serif;
    }
    * { box-sizing: border-box; margin: 0; padding: 0; }
    body { font-family: var(--sans); background: var(--bg); color: var(--fg); line-height: 1.6; }
    main { max-width: 1080px; margin: 0 auto; padding: 1.5rem; }
    h1 { color: var(--fg-bright); font-size: 1.3rem; margin-bottom: 0.2rem; }
    .sub { color: var(--fg-muted); font-size: 0.8rem; font-family: var(--mono); margin-bottom: 1.5rem; }
    table { width: 100%; border-collapse: collapse; background: var(--bg-raised);
            border: 1px solid var(--border); border-radius: 6px; }
    th, td { text-align: left; padding: 0.45rem 0.7rem; border-bottom: 1px solid var(--border);
             font-size: 0.82rem; }
    th { color: var(--fg-muted); font-weight: 600; text-transform: uppercase; font-size: 0.68rem; }
    code { font-family: var(--mono); color: var(--accent); }
    .badge { display: inline-block; padding: 0.05rem 0.45rem; border-radius: 10px;
             font-size: 0.72rem; font-weight: 600; }
    .type-single { background: var(--green-muted); color: var(--green); }
    .type-batch { background: #1a3050; color: var(--accent); }
    .risk-high { background: var(--red-muted); color: var(--red); }
    .risk-low { background: var(--green-muted); color: var(--green); }
    .muted { color: var(--fg-muted); font-style: italic; }
    .detail-row td { background: var(--bg); }
    details summary { cursor: pointer; color: var(--fg-muted); font-size: 0.78rem; }
    details table { margin-top: 0.5rem; }
  </style>
</head>
<body>
<main>
  <h1>Prediction history</h1>
  <div class="sub">generated __GENERATED__ &middot; __COUNT__ predictions &middot; backend: __BACKEND__</div>
  <table>
    <thead>
      <tr><th>ID</th><th>Timestamp</th><th>Type</th><th>Features</th><th>Risk</th><th>Prediction</th></tr>
    </thead>
    <tbody>
__ROWS__
    </tbody>
  </table>
</main>
</body>
</html>
"##;
