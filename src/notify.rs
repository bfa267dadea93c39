//! Transient notices rendered above the history table.
//!
//! Success notices live 3 seconds, errors 5. Concurrent notices stack in
//! arrival order; there is no dedup and no queue cap.

use std::time::{Duration, Instant};

use crate::logging::{log, obj, v_str, Domain, Level};

const SUCCESS_TTL: Duration = Duration::from_secs(3);
const ERROR_TTL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

impl NoticeKind {
    fn ttl(&self) -> Duration {
        match self {
            NoticeKind::Success => SUCCESS_TTL,
            NoticeKind::Error => ERROR_TTL,
        }
    }

    fn tag(&self) -> &'static str {
        match self {
            NoticeKind::Success => "ok",
            NoticeKind::Error => "error",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    expires_at: Instant,
}

#[derive(Debug, Default)]
pub struct NoticeBoard {
    notices: Vec<Notice>,
}

impl NoticeBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(NoticeKind::Success, message.into(), Instant::now());
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(NoticeKind::Error, message.into(), Instant::now());
    }

    fn push(&mut self, kind: NoticeKind, message: String, now: Instant) {
        log(
            Level::Debug,
            Domain::Notify,
            "notice",
            obj(&[("kind", v_str(kind.tag())), ("message", v_str(&message))]),
        );
        self.notices.push(Notice {
            kind,
            message,
            expires_at: now + kind.ttl(),
        });
    }

    /// Drop expired notices. Returns true when anything was removed, so the
    /// caller knows a redraw is due.
    pub fn prune(&mut self, now: Instant) -> bool {
        let before = self.notices.len();
        self.notices.retain(|n| n.expires_at > now);
        self.notices.len() != before
    }

    /// Manual dismissal (the loop maps an empty input line to this).
    pub fn dismiss_all(&mut self) {
        self.notices.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.notices.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notice> {
        self.notices.iter()
    }

    pub fn render_into(&self, out: &mut String) {
        for notice in &self.notices {
            out.push_str(&format!("[{}] {}\n", notice.kind.tag(), notice.message));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ttls() {
        let mut board = NoticeBoard::new();
        let now = Instant::now();
        board.push(NoticeKind::Success, "saved".to_string(), now);
        board.push(NoticeKind::Error, "failed".to_string(), now);

        // After 4s only the error survives.
        assert!(board.prune(now + Duration::from_secs(4)));
        let remaining: Vec<_> = board.iter().collect();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].kind, NoticeKind::Error);

        // After 6s everything is gone.
        assert!(board.prune(now + Duration::from_secs(6)));
        assert!(board.is_empty());
    }

    #[test]
    fn test_prune_reports_no_change() {
        let mut board = NoticeBoard::new();
        let now = Instant::now();
        board.push(NoticeKind::Success, "saved".to_string(), now);
        assert!(!board.prune(now + Duration::from_secs(1)));
    }

    #[test]
    fn test_dismiss_all() {
        let mut board = NoticeBoard::new();
        board.success("saved");
        board.error("failed");
        board.dismiss_all();
        assert!(board.is_empty());
    }

    #[test]
    fn test_notices_stack_in_order() {
        let mut board = NoticeBoard::new();
        board.success("first");
        board.error("second");
        board.success("third");

        let mut out = String::new();
        board.render_into(&mut out);
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines, vec!["[ok] first", "[error] second", "[ok] third"]);
    }
}
