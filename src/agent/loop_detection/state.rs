//! Per-session repetition state.

use super::config::LoopDetectionConfig;
use super::fingerprint::ProgressFingerprint;
use super::signature::CallSignature;
use super::types::{LoopTrip, LoopVerdict, ToolClass};
use crate::agent::identity::SessionKey;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use tokio::sync::{Mutex, MutexGuard};
use tracing::debug;

/// Repetition bookkeeping for one call signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepetitionRecord {
    /// Consecutive calls that produced `fingerprint`
    pub count: usize,
    /// Fingerprint of the most recent output
    pub fingerprint: ProgressFingerprint,
    /// Classification of the most recent call
    pub class: ToolClass,
    /// Session call sequence number of the most recent call
    pub last_seen: u64,
}

/// Outcome of feeding one call result into the session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Observation {
    /// Signature's count after this call
    pub count: usize,
    /// Session-wide generic no-progress count after this call
    pub global_count: usize,
    /// Whether the output differed from the previous call (or was first seen)
    pub progressed: bool,
    /// Breaker this call tripped, if any
    pub trip: Option<LoopTrip>,
}

/// Loop-detection state of one session.
#[derive(Debug, Default)]
pub struct SessionLoopState {
    records: HashMap<CallSignature, RepetitionRecord>,
    global_no_progress: usize,
    sequence: u64,
}

impl SessionLoopState {
    /// Decide whether a call may run given the state left by earlier calls.
    #[must_use]
    pub fn verdict(
        &self,
        signature: &CallSignature,
        class: ToolClass,
        config: &LoopDetectionConfig,
    ) -> LoopVerdict {
        match class {
            ToolClass::PollStyle => match self.records.get(signature) {
                Some(record) if record.count >= config.critical_threshold => {
                    LoopVerdict::Block(LoopTrip::CriticalPollLoop {
                        count: record.count,
                    })
                }
                _ => LoopVerdict::Allow,
            },
            ToolClass::Generic => {
                if self.global_no_progress >= config.global_circuit_breaker_threshold {
                    LoopVerdict::Block(LoopTrip::GlobalCircuitBreaker {
                        count: self.global_no_progress,
                    })
                } else {
                    LoopVerdict::Allow
                }
            }
        }
    }

    /// Record a completed call.
    ///
    /// A new signature or a changed fingerprint is progress and restarts the
    /// signature's count at 1. Generic calls also drive the session-wide
    /// counter; poll-style calls never touch it. Once
    /// `max_tracked_signatures` records exist, a new signature evicts the
    /// least recently seen one.
    pub fn observe(
        &mut self,
        signature: &CallSignature,
        class: ToolClass,
        fingerprint: ProgressFingerprint,
        config: &LoopDetectionConfig,
    ) -> Observation {
        self.sequence = self.sequence.saturating_add(1);
        let seen = self.sequence;
        if !self.records.contains_key(signature) {
            self.evict_stalest(config.max_tracked_signatures);
        }

        let (count, progressed) = match self.records.entry(signature.clone()) {
            Entry::Occupied(mut entry) => {
                let record = entry.get_mut();
                record.class = class;
                record.last_seen = seen;
                if record.fingerprint == fingerprint {
                    record.count = record.count.saturating_add(1);
                    (record.count, false)
                } else {
                    record.fingerprint = fingerprint;
                    record.count = 1;
                    (1, true)
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(RepetitionRecord {
                    count: 1,
                    fingerprint,
                    class,
                    last_seen: seen,
                });
                (1, true)
            }
        };

        let trip = match class {
            ToolClass::PollStyle => (count >= config.critical_threshold)
                .then_some(LoopTrip::CriticalPollLoop { count }),
            ToolClass::Generic => {
                self.global_no_progress = if progressed {
                    1
                } else {
                    self.global_no_progress.saturating_add(1)
                };
                (self.global_no_progress >= config.global_circuit_breaker_threshold).then_some(
                    LoopTrip::GlobalCircuitBreaker {
                        count: self.global_no_progress,
                    },
                )
            }
        };

        Observation {
            count,
            global_count: self.global_no_progress,
            progressed,
            trip,
        }
    }

    fn evict_stalest(&mut self, limit: usize) {
        if self.records.len() < limit.max(1) {
            return;
        }

        let stalest = self
            .records
            .iter()
            .min_by_key(|(_, record)| record.last_seen)
            .map(|(signature, _)| signature.clone());

        if let Some(signature) = stalest {
            debug!(signature = %signature, "loop_detector: evicting least recently seen signature");
            self.records.remove(&signature);
        }
    }

    /// Number of signatures tracked.
    #[must_use]
    pub fn tracked_signatures(&self) -> usize {
        self.records.len()
    }

    /// Record for a signature, if one exists.
    #[must_use]
    pub fn record(&self, signature: &CallSignature) -> Option<&RepetitionRecord> {
        self.records.get(signature)
    }

    /// Session-wide generic no-progress count.
    #[must_use]
    pub const fn global_count(&self) -> usize {
        self.global_no_progress
    }
}

/// Store of loop-detection state keyed by session.
///
/// Sessions are created on first use and dropped only by an explicit reset.
#[derive(Debug, Default)]
pub struct LoopStateStore {
    sessions: Mutex<HashMap<SessionKey, SessionLoopState>>,
}

impl LoopStateStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock the store for one read-then-write on a session.
    pub(super) async fn lock(&self) -> MutexGuard<'_, HashMap<SessionKey, SessionLoopState>> {
        self.sessions.lock().await
    }

    /// Drop every session's state.
    pub async fn clear(&self) {
        self.sessions.lock().await.clear();
    }

    /// Drop one session's state. Returns `true` if it existed.
    pub async fn clear_session(&self, session_key: &SessionKey) -> bool {
        self.sessions.lock().await.remove(session_key).is_some()
    }

    /// Number of sessions with tracked state.
    pub async fn session_count(&self) -> usize {
        self.sessions.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;

    fn sig(name: &str) -> CallSignature {
        CallSignature::new(name, &Map::new())
    }

    fn fp(text: &str) -> ProgressFingerprint {
        ProgressFingerprint::of_error(text)
    }

    #[test]
    fn count_restarts_when_output_changes() {
        let config = LoopDetectionConfig::default();
        let mut state = SessionLoopState::default();
        let a = sig("a");

        assert_eq!(state.observe(&a, ToolClass::Generic, fp("x"), &config).count, 1);
        assert_eq!(state.observe(&a, ToolClass::Generic, fp("x"), &config).count, 2);
        let changed = state.observe(&a, ToolClass::Generic, fp("y"), &config);
        assert_eq!(changed.count, 1);
        assert!(changed.progressed);
        assert_eq!(changed.global_count, 1);
    }

    #[test]
    fn poll_calls_leave_global_counter_alone() {
        let config = LoopDetectionConfig::default();
        let mut state = SessionLoopState::default();
        let generic = sig("generic");
        let poll = sig("poll");

        for _ in 0..3 {
            state.observe(&generic, ToolClass::Generic, fp("same"), &config);
        }
        assert_eq!(state.global_count(), 3);

        state.observe(&poll, ToolClass::PollStyle, fp("p1"), &config);
        state.observe(&poll, ToolClass::PollStyle, fp("p2"), &config);
        assert_eq!(state.global_count(), 3);
    }

    #[test]
    fn global_counter_spans_signatures() {
        let config = LoopDetectionConfig::default();
        let mut state = SessionLoopState::default();
        let a = sig("a");
        let b = sig("b");

        state.observe(&a, ToolClass::Generic, fp("same"), &config);
        state.observe(&b, ToolClass::Generic, fp("same"), &config);
        state.observe(&a, ToolClass::Generic, fp("same"), &config);
        state.observe(&b, ToolClass::Generic, fp("same"), &config);
        assert_eq!(state.global_count(), 3);
    }

    #[test]
    fn poll_trip_is_observed_on_the_crossing_call() {
        let config = LoopDetectionConfig {
            warning_threshold: 2,
            critical_threshold: 3,
            global_circuit_breaker_threshold: 5,
            ..LoopDetectionConfig::default()
        };
        let mut state = SessionLoopState::default();
        let poll = sig("poll");

        for _ in 0..2 {
            let observation = state.observe(&poll, ToolClass::PollStyle, fp("same"), &config);
            assert!(observation.trip.is_none());
            assert_eq!(state.verdict(&poll, ToolClass::PollStyle, &config), LoopVerdict::Allow);
        }
        let observation = state.observe(&poll, ToolClass::PollStyle, fp("same"), &config);
        assert_eq!(observation.trip, Some(LoopTrip::CriticalPollLoop { count: 3 }));
        assert_eq!(
            state.verdict(&poll, ToolClass::PollStyle, &config),
            LoopVerdict::Block(LoopTrip::CriticalPollLoop { count: 3 })
        );
    }

    #[test]
    fn tracked_signatures_are_capped_by_recency() {
        let config = LoopDetectionConfig {
            max_tracked_signatures: 3,
            ..LoopDetectionConfig::default()
        };
        let mut state = SessionLoopState::default();
        let (a, b, c, d) = (sig("a"), sig("b"), sig("c"), sig("d"));

        state.observe(&a, ToolClass::PollStyle, fp("same"), &config);
        state.observe(&b, ToolClass::Generic, fp("same"), &config);
        state.observe(&c, ToolClass::Generic, fp("same"), &config);
        // Touch `a` so `b` becomes the stalest record.
        state.observe(&a, ToolClass::PollStyle, fp("same"), &config);
        state.observe(&d, ToolClass::Generic, fp("same"), &config);

        assert_eq!(state.tracked_signatures(), 3);
        assert!(state.record(&b).is_none());
        assert_eq!(state.record(&a).map(|record| record.count), Some(2));
        assert!(state.record(&c).is_some());
        assert!(state.record(&d).is_some());
    }

    #[test]
    fn known_signatures_never_evict() {
        let config = LoopDetectionConfig {
            max_tracked_signatures: 2,
            ..LoopDetectionConfig::default()
        };
        let mut state = SessionLoopState::default();
        let (a, b) = (sig("a"), sig("b"));

        for _ in 0..5 {
            state.observe(&a, ToolClass::Generic, fp("same"), &config);
            state.observe(&b, ToolClass::Generic, fp("same"), &config);
        }
        assert_eq!(state.tracked_signatures(), 2);
        assert_eq!(state.record(&a).map(|record| record.count), Some(5));
        assert_eq!(state.global_count(), 9);
    }

    #[tokio::test]
    async fn store_clears_sessions() {
        let store = LoopStateStore::new();
        store
            .lock()
            .await
            .entry(SessionKey::from("s1"))
            .or_default();
        store
            .lock()
            .await
            .entry(SessionKey::from("s2"))
            .or_default();
        assert_eq!(store.session_count().await, 2);

        assert!(store.clear_session(&SessionKey::from("s1")).await);
        assert!(!store.clear_session(&SessionKey::from("s1")).await);
        store.clear().await;
        assert_eq!(store.session_count().await, 0);
    }
}
