use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;

use kanri_api::{Notice, NoticeKind, Notifier};

/// Maximum notices retained before the oldest is evicted.
pub const NOTICE_CAPACITY: usize = 50;

/// Auto-dismiss delay in seconds.
pub const AUTO_DISMISS_SECS: i64 = 4;

/// A notice as posted to the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Posted {
    pub id: u64,
    pub kind: NoticeKind,
    pub message: String,
    pub posted_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Board {
    next_id: u64,
    entries: VecDeque<Posted>,
}

/// Bounded log of user-facing notices. Stands in for the toast stack.
#[derive(Debug, Default)]
pub struct NoticeBoard {
    board: Mutex<Board>,
}

impl NoticeBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Post a notice stamped with the current time.
    pub fn post(&self, notice: Notice) -> u64 {
        self.post_at(notice, Utc::now())
    }

    pub fn post_at(&self, notice: Notice, at: DateTime<Utc>) -> u64 {
        let mut board = self.board();
        board.next_id += 1;
        let id = board.next_id;

        if board.entries.len() >= NOTICE_CAPACITY {
            board.entries.pop_front();
        }
        board.entries.push_back(Posted {
            id,
            kind: notice.kind,
            message: notice.message,
            posted_at: at,
        });
        id
    }

    /// Notices still inside the auto-dismiss window at `now` (newest last).
    pub fn active(&self, now: DateTime<Utc>) -> Vec<Posted> {
        let window = TimeDelta::seconds(AUTO_DISMISS_SECS);
        self.board()
            .entries
            .iter()
            .filter(|n| now - n.posted_at < window)
            .cloned()
            .collect()
    }

    pub fn dismiss(&self, id: u64) -> bool {
        let mut board = self.board();
        let before = board.entries.len();
        board.entries.retain(|n| n.id != id);
        board.entries.len() != before
    }

    /// Take everything posted so far.
    pub fn drain(&self) -> Vec<Posted> {
        self.board().entries.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.board().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn board(&self) -> MutexGuard<'_, Board> {
        self.board.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Notifier for NoticeBoard {
    fn notify(&self, notice: Notice) {
        match notice.kind {
            NoticeKind::Error => tracing::warn!(kind = %notice.kind, "{}", notice.message),
            NoticeKind::Success | NoticeKind::Info => {
                tracing::info!(kind = %notice.kind, "{}", notice.message)
            }
        }
        self.post(notice);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn test_active_window() {
        let board = NoticeBoard::new();
        board.post_at(Notice::new(NoticeKind::Success, "Saved"), at(0));
        board.post_at(Notice::new(NoticeKind::Error, "Nope"), at(3));

        assert_eq!(board.active(at(1)).len(), 2);
        let active = board.active(at(4));
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].message, "Nope");
        assert!(board.active(at(10)).is_empty());
        // expiry hides, it does not delete
        assert_eq!(board.len(), 2);
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let board = NoticeBoard::new();
        for i in 0..NOTICE_CAPACITY + 5 {
            board.post(Notice::new(NoticeKind::Info, format!("n{i}")));
        }
        let all = board.drain();
        assert_eq!(all.len(), NOTICE_CAPACITY);
        assert_eq!(all[0].message, "n5");
        assert!(board.is_empty());
    }

    #[test]
    fn test_dismiss_by_id() {
        let board = NoticeBoard::new();
        let first = board.post(Notice::new(NoticeKind::Info, "a"));
        let second = board.post(Notice::new(NoticeKind::Info, "b"));
        assert_ne!(first, second);

        assert!(board.dismiss(first));
        assert!(!board.dismiss(first));
        let left = board.drain();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].id, second);
    }

    #[test]
    fn test_notifier_posts() {
        let board = NoticeBoard::new();
        board.notify(Notice::new(NoticeKind::Error, "Server error occurred"));
        let posted = board.drain();
        assert_eq!(posted[0].kind, NoticeKind::Error);
    }
}
