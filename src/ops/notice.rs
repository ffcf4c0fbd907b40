use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// How long a notice stays on the status row
pub const NOTICE_TTL: Duration = Duration::from_secs(4);

const MAX_NOTICES: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// A transient user-facing notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub text: String,
    pub raised_at: Instant,
}

/// Queue of notices raised by the hooks. The status row shows the newest
/// one that has not expired; the queue keeps a short history.
#[derive(Debug, Default)]
pub struct Notices {
    items: VecDeque<Notice>,
}

impl Notices {
    pub fn new() -> Self {
        Notices::default()
    }

    pub fn info(&mut self, title: &str, text: impl Into<String>) {
        self.push(NoticeLevel::Info, title, text.into());
    }

    pub fn error(&mut self, title: &str, text: impl Into<String>) {
        self.push(NoticeLevel::Error, title, text.into());
    }

    fn push(&mut self, level: NoticeLevel, title: &str, text: String) {
        if self.items.len() == MAX_NOTICES {
            self.items.pop_front();
        }
        self.items.push_back(Notice {
            level,
            title: title.to_string(),
            text,
            raised_at: Instant::now(),
        });
    }

    /// Newest notice still within its display window
    pub fn latest(&self, now: Instant) -> Option<&Notice> {
        self.items
            .back()
            .filter(|n| now.saturating_duration_since(n.raised_at) < NOTICE_TTL)
    }

    pub fn all(&self) -> impl Iterator<Item = &Notice> {
        self.items.iter()
    }

    pub fn error_count(&self) -> usize {
        self.items
            .iter()
            .filter(|n| n.level == NoticeLevel::Error)
            .count()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}
