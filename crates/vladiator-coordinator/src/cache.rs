// Path: crates/vladiator-coordinator/src/cache.rs
//! The three per-driver caches the state machine reads and writes (spec §3).

use std::collections::HashMap;
use tokio::sync::Mutex;

/// The retry bound past which a `txId` is silently dropped (spec §3).
pub const MAX_RETRIES: u32 = 3;

/// A `txId`'s place in the state machine (spec §4.2).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxState {
    /// A sibling request is currently being populated/validated/signed.
    Locked,
    /// Terminal: a signature has already been produced for this `txId`.
    Signed {
        /// The `0x`-prefixed hex signature.
        signature: String,
    },
}

/// Keyed by `txId`, scoped to one driver instance (= one source chain).
///
/// Populated on REQUEST acceptance (`Locked`), finalized on successful sign
/// (`Signed`); entries are never evicted once `Signed` — only abandoned back
/// to absent on populate/validate/chain-miss/feature/sign failure.
#[derive(Default)]
pub struct SignatureCache {
    inner: Mutex<HashMap<String, TxState>>,
}

impl SignatureCache {
    /// An empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the current state for `tx_id`, if any.
    pub async fn get(&self, tx_id: &str) -> Option<TxState> {
        self.inner.lock().await.get(tx_id).cloned()
    }

    /// Atomically claims `tx_id`: if no entry exists yet, inserts `Locked`
    /// and returns `None` to the one caller that won the race. If an entry
    /// already exists (`Locked` or `Signed`), leaves it untouched and
    /// returns it, so at most one concurrent caller for a given `tx_id` ever
    /// proceeds to populate/sign (spec §5's "at-most-one concurrent signing
    /// attempt").
    pub async fn lock_if_absent(&self, tx_id: &str) -> Option<TxState> {
        let mut guard = self.inner.lock().await;
        match guard.get(tx_id) {
            Some(state) => Some(state.clone()),
            None => {
                guard.insert(tx_id.to_string(), TxState::Locked);
                None
            }
        }
    }

    /// Finalizes `tx_id` with a signature, replacing the `Locked` entry.
    pub async fn finalize(&self, tx_id: &str, signature: String) {
        self.inner
            .lock()
            .await
            .insert(tx_id.to_string(), TxState::Signed { signature });
    }

    /// Abandons the entry for `tx_id`, returning it to absent so a later
    /// REQUEST can re-enter the machine (spec §4.2, §9's confirmation-
    /// shortfall open question).
    pub async fn abandon(&self, tx_id: &str) {
        self.inner.lock().await.remove(tx_id);
    }

    /// The number of tracked `txId`s, for diagnostics/tests.
    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }
}

/// Keyed by `txId`; incremented on every REQUEST acceptance attempt and
/// never decremented (spec §9: preserved intentionally, even though it can
/// quietly burn the budget on transient RPC failures).
#[derive(Default)]
pub struct RetryCounter {
    inner: Mutex<HashMap<String, u32>>,
}

impl RetryCounter {
    /// An empty counter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Increments and returns the new count for `tx_id`.
    pub async fn increment(&self, tx_id: &str) -> u32 {
        let mut guard = self.inner.lock().await;
        let count = guard.entry(tx_id.to_string()).or_insert(0);
        *count += 1;
        *count
    }
}

/// Keyed by `txId`; preserves the opaque reply bytes a feature produced so
/// replays of the signed frame keep carrying the same reply (spec §3).
#[derive(Default)]
pub struct FeatureReplyCache {
    inner: Mutex<HashMap<String, Vec<u8>>>,
}

impl FeatureReplyCache {
    /// An empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the reply bytes produced for `tx_id`.
    pub async fn insert(&self, tx_id: &str, reply: Vec<u8>) {
        self.inner.lock().await.insert(tx_id.to_string(), reply);
    }

    /// Reads back the cached reply for `tx_id`, if any.
    pub async fn get(&self, tx_id: &str) -> Option<Vec<u8>> {
        self.inner.lock().await.get(tx_id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn lock_then_finalize_round_trips() {
        let cache = SignatureCache::new();
        assert_eq!(cache.lock_if_absent("42").await, None);
        assert_eq!(cache.get("42").await, Some(TxState::Locked));
        cache.finalize("42", "0xsig".into()).await;
        assert_eq!(
            cache.get("42").await,
            Some(TxState::Signed {
                signature: "0xsig".into()
            })
        );
    }

    #[tokio::test]
    async fn abandon_returns_to_absent() {
        let cache = SignatureCache::new();
        assert_eq!(cache.lock_if_absent("42").await, None);
        cache.abandon("42").await;
        assert_eq!(cache.get("42").await, None);
    }

    #[tokio::test]
    async fn lock_if_absent_rejects_second_caller() {
        let cache = SignatureCache::new();
        assert_eq!(cache.lock_if_absent("42").await, None);
        assert_eq!(cache.lock_if_absent("42").await, Some(TxState::Locked));
    }

    #[tokio::test]
    async fn retry_counter_increments_and_never_resets() {
        let counter = RetryCounter::new();
        assert_eq!(counter.increment("1").await, 1);
        assert_eq!(counter.increment("1").await, 2);
        assert_eq!(counter.increment("1").await, 3);
        assert_eq!(counter.increment("1").await, 4);
    }
}
