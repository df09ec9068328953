// Path: crates/vladiator-networking/src/dedup.rs
//! `RecentGossip`: the 5-second sliding-window de-duplication filter applied
//! to inbound `MESSAGE:REQUEST` and `MESSAGE:SIGNED` frames (spec §3, §4.3).

use std::collections::VecDeque;
use std::time::{Duration, Instant};
use vladiator_types::message::Topic;

const WINDOW: Duration = Duration::from_secs(5);

/// The key a duplicate is recognized by: topic, publishing author, and the
/// opaque source-chain transaction identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct Key {
    topic: Topic,
    author: String,
    transaction_hash: String,
}

struct Entry {
    key: Key,
    seen_at: Instant,
}

/// A bounded sliding window of recently-seen `(type, author, transactionHash)`
/// tuples, used to suppress duplicate `REQUEST`/`SIGNED` frames arriving
/// within 5 seconds of one another.
///
/// Mutated only by the bus's single ingress task (spec §5's shared-resource
/// policy); not `Sync` on its own, callers must serialize access.
#[derive(Default)]
pub struct RecentGossip {
    entries: VecDeque<Entry>,
}

impl RecentGossip {
    /// Creates an empty window.
    pub fn new() -> Self {
        Self {
            entries: VecDeque::new(),
        }
    }

    /// Returns `true` if this frame is a duplicate of one seen in the last
    /// 5 seconds and should be dropped; otherwise records it and returns
    /// `false`. Frames on topics other than `MESSAGE:REQUEST`/`MESSAGE:SIGNED`
    /// are never deduplicated and always return `false`.
    pub fn check_and_record(
        &mut self,
        topic: Topic,
        author: &str,
        transaction_hash: &str,
        now: Instant,
    ) -> bool {
        self.evict_stale(now);

        if !matches!(topic, Topic::MessageRequest | Topic::MessageSigned) {
            return false;
        }

        let key = Key {
            topic,
            author: author.to_string(),
            transaction_hash: transaction_hash.to_string(),
        };

        if self.entries.iter().any(|e| e.key == key) {
            return true;
        }

        self.entries.push_back(Entry { key, seen_at: now });
        false
    }

    fn evict_stale(&mut self, now: Instant) {
        while let Some(front) = self.entries.front() {
            if now.saturating_duration_since(front.seen_at) > WINDOW {
                self.entries.pop_front();
            } else {
                break;
            }
        }
    }

    /// The number of entries currently retained in the window.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` if the window currently holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_sighting_is_not_a_duplicate() {
        let mut w = RecentGossip::new();
        let now = Instant::now();
        assert!(!w.check_and_record(Topic::MessageRequest, "0xa", "0xhash", now));
        assert_eq!(w.len(), 1);
    }

    #[test]
    fn repeat_within_window_is_dropped() {
        let mut w = RecentGossip::new();
        let now = Instant::now();
        assert!(!w.check_and_record(Topic::MessageRequest, "0xa", "0xhash", now));
        assert!(w.check_and_record(
            Topic::MessageRequest,
            "0xa",
            "0xhash",
            now + Duration::from_secs(2)
        ));
    }

    #[test]
    fn repeat_after_window_is_not_dropped() {
        let mut w = RecentGossip::new();
        let now = Instant::now();
        assert!(!w.check_and_record(Topic::MessageRequest, "0xa", "0xhash", now));
        assert!(!w.check_and_record(
            Topic::MessageRequest,
            "0xa",
            "0xhash",
            now + Duration::from_secs(6)
        ));
    }

    #[test]
    fn non_deduplicated_topics_always_pass() {
        let mut w = RecentGossip::new();
        let now = Instant::now();
        assert!(!w.check_and_record(Topic::Heartbeat, "0xa", "0xhash", now));
        assert!(!w.check_and_record(Topic::Heartbeat, "0xa", "0xhash", now));
    }

    #[test]
    fn different_author_is_not_a_duplicate() {
        let mut w = RecentGossip::new();
        let now = Instant::now();
        assert!(!w.check_and_record(Topic::MessageSigned, "0xa", "0xhash", now));
        assert!(!w.check_and_record(Topic::MessageSigned, "0xb", "0xhash", now));
    }

    #[test]
    fn stale_entries_are_evicted_on_ingress() {
        let mut w = RecentGossip::new();
        let now = Instant::now();
        w.check_and_record(Topic::MessageRequest, "0xa", "0x1", now);
        w.check_and_record(
            Topic::MessageRequest,
            "0xb",
            "0x2",
            now + Duration::from_secs(10),
        );
        assert_eq!(w.len(), 1);
    }
}
