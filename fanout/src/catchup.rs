//! Store-and-forward backlog shape for offline recipients (spec.md section
//! 1). Tracks only the highest sequence each recipient has been handed;
//! real delivery (online push, retry/backoff, backlog persistence) is out
//! of this scaffold's scope.

use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Default)]
pub struct Backlog {
    delivered_through: Mutex<HashMap<(String, String), u64>>,
}

impl Backlog {
    pub fn new() -> Self {
        Self::default()
    }

    /// The highest sequence number already delivered to `recipient` in
    /// `chat_id`, or 0 if none.
    pub fn high_water_mark(&self, chat_id: &str, recipient: &str) -> u64 {
        let state = self.delivered_through.lock().expect("backlog mutex poisoned");
        *state
            .get(&(chat_id.to_string(), recipient.to_string()))
            .unwrap_or(&0)
    }

    /// Records that `recipient` has now been handed messages through
    /// `sequence` in `chat_id`. Never moves the mark backwards.
    pub fn advance(&self, chat_id: &str, recipient: &str, sequence: u64) {
        let mut state = self.delivered_through.lock().expect("backlog mutex poisoned");
        let mark = state
            .entry((chat_id.to_string(), recipient.to_string()))
            .or_insert(0);
        if sequence > *mark {
            *mark = sequence;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn high_water_mark_never_moves_backwards() {
        let backlog = Backlog::new();
        backlog.advance("chat-a", "user-1", 5);
        backlog.advance("chat-a", "user-1", 3);
        assert_eq!(backlog.high_water_mark("chat-a", "user-1"), 5);
        backlog.advance("chat-a", "user-1", 9);
        assert_eq!(backlog.high_water_mark("chat-a", "user-1"), 9);
    }

    #[test]
    fn marks_are_independent_per_chat_and_recipient() {
        let backlog = Backlog::new();
        backlog.advance("chat-a", "user-1", 5);
        assert_eq!(backlog.high_water_mark("chat-a", "user-2"), 0);
        assert_eq!(backlog.high_water_mark("chat-b", "user-1"), 0);
    }
}
