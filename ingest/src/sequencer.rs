//! Per-chat monotonic sequence assignment, matching the `Sequence` value
//! object defined in spec.md section 3: "an unsigned 64-bit monotonic
//! counter per chat". Only the counter shape is modeled here; durable
//! persistence of assigned sequences and ordering enforcement across
//! concurrent ingest workers is out of this scaffold's scope.

use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Default)]
pub struct Sequencer {
    counters: Mutex<HashMap<String, u64>>,
}

impl Sequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns the next sequence number for `chat_id`, starting at 1.
    pub fn next(&self, chat_id: &str) -> u64 {
        let mut counters = self.counters.lock().expect("sequencer mutex poisoned");
        let counter = counters.entry(chat_id.to_string()).or_insert(0);
        *counter += 1;
        *counter
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_is_monotonic_per_chat() {
        let seq = Sequencer::new();
        assert_eq!(seq.next("chat-a"), 1);
        assert_eq!(seq.next("chat-a"), 2);
        assert_eq!(seq.next("chat-b"), 1);
        assert_eq!(seq.next("chat-a"), 3);
    }
}
