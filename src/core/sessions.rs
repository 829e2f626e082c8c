use chrono::{DateTime, Timelike, Utc};

use crate::config::SessionTime;

/// Daily UTC entry window, half-open `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryWindow {
    start_min: u32,
    end_min: u32,
}

impl EntryWindow {
    pub fn new(session: SessionTime) -> Self {
        Self {
            start_min: session.start.0 * 60 + session.start.1,
            end_min: session.end.0 * 60 + session.end.1,
        }
    }

    pub fn contains(&self, now: DateTime<Utc>) -> bool {
        let current = now.hour() * 60 + now.minute();
        if self.start_min <= self.end_min {
            current >= self.start_min && current < self.end_min
        } else {
            // Wraps midnight (e.g. 23:00 - 01:00)
            current >= self.start_min || current < self.end_min
        }
    }
}
