//! Transient user-facing notices ("added to cart", "out of stock", ...).
//!
//! A notice is a single line of text that expires on its own; posting a new
//! one replaces whatever is currently shown. Expiry is driven by the caller's
//! clock through `now` arguments, so there is no background timer.

use std::time::{Duration, Instant};

use crate::notify::ChangeNotifier;

/// How long a posted notice stays visible.
pub const NOTICE_TTL: Duration = Duration::from_millis(2000);

#[derive(Debug, Clone)]
struct Notice {
    text: String,
    expires_at: Instant,
}

/// Holds at most one live notice.
#[derive(Debug, Default)]
pub struct NoticeBoard {
    notice: Option<Notice>,
    notifier: ChangeNotifier,
}

impl NoticeBoard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Show `text` until [`NOTICE_TTL`] past `now`, replacing any notice
    /// already on the board.
    pub fn post(&mut self, text: impl Into<String>, now: Instant) {
        self.notice = Some(Notice {
            text: text.into(),
            expires_at: now + NOTICE_TTL,
        });
        self.notifier.notify();
    }

    /// The live notice, if any. Expired notices are dropped on read.
    pub fn current(&mut self, now: Instant) -> Option<&str> {
        if let Some(notice) = &self.notice
            && now >= notice.expires_at
        {
            self.notice = None;
            self.notifier.notify();
        }
        self.notice.as_ref().map(|n| n.text.as_str())
    }

    /// Subscribe to board changes.
    #[must_use]
    pub fn watch(&self) -> tokio::sync::watch::Receiver<u64> {
        self.notifier.watch()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_visible_until_ttl() {
        let now = Instant::now();
        let mut board = NoticeBoard::new();
        board.post("Produto adicionado ao carrinho", now);

        assert_eq!(
            board.current(now + NOTICE_TTL / 2),
            Some("Produto adicionado ao carrinho")
        );
        assert_eq!(board.current(now + NOTICE_TTL), None);
    }

    #[test]
    fn test_new_notice_replaces_and_rearms_expiry() {
        let now = Instant::now();
        let mut board = NoticeBoard::new();
        board.post("first", now);
        board.post("second", now + Duration::from_millis(1500));

        // past the first notice's deadline, within the second's
        assert_eq!(board.current(now + Duration::from_millis(2500)), Some("second"));
    }

    #[test]
    fn test_expiry_bumps_revision_once() {
        let now = Instant::now();
        let mut board = NoticeBoard::new();
        board.post("hello", now);

        let watch = board.watch();
        let before = *watch.borrow();

        assert_eq!(board.current(now + NOTICE_TTL), None);
        assert_eq!(*watch.borrow(), before + 1);

        // already cleared, no further bump
        assert_eq!(board.current(now + NOTICE_TTL * 2), None);
        assert_eq!(*watch.borrow(), before + 1);
    }

    #[test]
    fn test_empty_board_reads_none() {
        let mut board = NoticeBoard::new();
        assert_eq!(board.current(Instant::now()), None);
    }
}
