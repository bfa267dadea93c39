//! Dashboard state and screen composition.
//!
//! The loop applies fetch outcomes here and asks for a full redraw string.
//! Renders are last-writer-wins: whichever history page was applied most
//! recently is what the next redraw shows.

use crate::history::{BackendHealth, HistoryPage, PredictionRecord};
use crate::logging::{log, obj, v_num, v_str, Domain, Level};
use crate::notify::NoticeBoard;
use crate::render;

pub struct Dashboard {
    records: Vec<PredictionRecord>,
    total: u64,
    pub notices: NoticeBoard,
    health: Option<BackendHealth>,
    viewing: Option<String>,
    detail: Option<PredictionRecord>,
}

impl Dashboard {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            total: 0,
            notices: NoticeBoard::new(),
            health: None,
            viewing: None,
            detail: None,
        }
    }

    /// Outcome of a history fetch. A logical failure surfaces a notice and
    /// leaves the previously rendered table untouched.
    pub fn apply_history(&mut self, page: HistoryPage) {
        if page.success {
            self.total = page.total_count;
            self.records = page.history;
            log(
                Level::Debug,
                Domain::History,
                "page_applied",
                obj(&[("records", v_num(self.records.len() as f64))]),
            );
        } else {
            let why = page.error.unwrap_or_else(|| "unknown error".to_string());
            self.notices.error(format!("Failed to load history: {}", why));
        }
    }

    /// Transport failure on a history fetch.
    pub fn history_unreachable(&mut self, err: &anyhow::Error) {
        log(
            Level::Error,
            Domain::Api,
            "history_fetch_failed",
            obj(&[("error", v_str(&format!("{:#}", err)))]),
        );
        self.notices.error("Failed to load predictions history");
    }

    pub fn request_detail(&mut self, id: &str) {
        self.viewing = Some(id.to_string());
    }

    /// Outcome of a detail fetch: linear search of the refetched page. An
    /// unmatched id is silent toward the user, diagnostic log only.
    pub fn apply_detail(&mut self, id: &str, page: HistoryPage) {
        if !page.success {
            return;
        }
        match page.history.into_iter().find(|r| r.id == id) {
            Some(rec) => {
                self.viewing = Some(id.to_string());
                self.detail = Some(rec);
            }
            None => {
                log(
                    Level::Warn,
                    Domain::History,
                    "detail_miss",
                    obj(&[("id", v_str(id))]),
                );
            }
        }
    }

    pub fn close_detail(&mut self) {
        self.viewing = None;
        self.detail = None;
    }

    pub fn open_detail_id(&self) -> Option<&str> {
        self.viewing.as_deref()
    }

    pub fn set_health(&mut self, health: Option<BackendHealth>) {
        self.health = health;
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn records(&self) -> &[PredictionRecord] {
        &self.records
    }

    /// Compose the full screen: header, notices, table, open detail view.
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str("riskdash - prediction history\n");
        out.push_str(&format!(
            "backend: {}   |   {} predictions\n",
            self.health_line(),
            self.total
        ));
        out.push_str("[r]efresh  [v <id>] details  [d <id>] download  [D]ownload all  [c]lear  [s]tatus  [q]uit\n\n");

        if !self.notices.is_empty() {
            self.notices.render_into(&mut out);
            out.push('\n');
        }

        out.push_str(&render::history_table(&self.records));

        if let Some(detail) = &self.detail {
            out.push('\n');
            out.push_str(&render::batch_detail(detail));
        }

        log(
            Level::Debug,
            Domain::Render,
            "redraw",
            obj(&[("rows", v_num(self.records.len() as f64))]),
        );
        out
    }

    fn health_line(&self) -> String {
        match &self.health {
            Some(h) => {
                let status = h.status.as_deref().unwrap_or("unknown");
                if h.model_loaded && h.scaler_loaded {
                    format!("{} (model+scaler loaded)", status)
                } else {
                    format!("{} (model artifacts missing)", status)
                }
            }
            None => "unreachable".to_string(),
        }
    }
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    fn page(records: Vec<PredictionRecord>) -> HistoryPage {
        HistoryPage {
            success: true,
            total_count: records.len() as u64,
            history: records,
            error: None,
        }
    }

    fn record(id: &str, kind: &str) -> PredictionRecord {
        serde_json::from_value(serde_json::json!({"id": id, "type": kind})).unwrap()
    }

    #[test]
    fn test_empty_page_shows_placeholder_and_zero_counter() {
        let mut dash = Dashboard::new();
        dash.apply_history(page(vec![]));
        let screen = dash.render();
        assert!(screen.contains("(no predictions yet)"));
        assert!(screen.contains("0 predictions"));
    }

    #[test]
    fn test_logical_failure_keeps_previous_table() {
        let mut dash = Dashboard::new();
        dash.apply_history(page(vec![record("keepme", "single")]));
        dash.apply_history(HistoryPage {
            success: false,
            history: vec![],
            total_count: 0,
            error: Some("storage offline".to_string()),
        });
        let screen = dash.render();
        assert!(screen.contains("keepme"));
        assert!(screen.contains("Failed to load history: storage offline"));
    }

    #[test]
    fn test_transport_failure_notice() {
        let mut dash = Dashboard::new();
        dash.history_unreachable(&anyhow!("connection refused"));
        let screen = dash.render();
        assert!(screen.contains("Failed to load predictions history"));
    }

    #[test]
    fn test_detail_miss_is_silent() {
        let mut dash = Dashboard::new();
        dash.apply_detail("ghost", page(vec![record("other", "batch")]));
        let screen = dash.render();
        assert!(!screen.contains("Batch Details"));
        assert!(dash.notices.is_empty());
    }

    #[test]
    fn test_detail_found_opens_view() {
        let mut dash = Dashboard::new();
        dash.apply_detail("b1", page(vec![record("b1", "batch")]));
        let screen = dash.render();
        assert!(screen.contains("Batch Details"));
        dash.close_detail();
        assert!(!dash.render().contains("Batch Details"));
    }

    #[test]
    fn test_last_writer_wins() {
        let mut dash = Dashboard::new();
        dash.apply_history(page(vec![record("first", "single")]));
        dash.apply_history(page(vec![record("second", "single")]));
        let screen = dash.render();
        assert!(!screen.contains("first"));
        assert!(screen.contains("second"));
    }
}
