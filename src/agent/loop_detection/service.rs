//! Loop detector coordinating per-session repetition state.

use super::classify::classify;
use super::config::LoopDetectionConfig;
use super::fingerprint::ProgressFingerprint;
use super::signature::CallSignature;
use super::state::{LoopStateStore, Observation};
use super::types::{LoopTrip, LoopVerdict, ToolClass};
use crate::agent::identity::SessionKey;
use crate::agent::tool::ToolMetadata;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, warn};

/// Decides whether calls are progressing and when a breaker trips.
///
/// Detection runs one call in arrears: [`LoopDetector::record`] reports the
/// call that crosses a threshold, and [`LoopDetector::check`] refuses every
/// later call the trip covers.
pub struct LoopDetector {
    config: Arc<LoopDetectionConfig>,
    store: Arc<LoopStateStore>,
}

impl LoopDetector {
    /// Create a detector with its own state store.
    #[must_use]
    pub fn new(config: Arc<LoopDetectionConfig>) -> Self {
        Self::with_store(config, Arc::new(LoopStateStore::new()))
    }

    /// Create a detector over an existing state store.
    #[must_use]
    pub fn with_store(config: Arc<LoopDetectionConfig>, store: Arc<LoopStateStore>) -> Self {
        Self { config, store }
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &LoopDetectionConfig {
        &self.config
    }

    /// Handle to the state store.
    #[must_use]
    pub fn store(&self) -> Arc<LoopStateStore> {
        Arc::clone(&self.store)
    }

    /// Whether detection is enabled.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Classify a call as poll-style or generic.
    #[must_use]
    pub fn classify(
        &self,
        tool_name: &str,
        metadata: &ToolMetadata,
        params: &Map<String, Value>,
    ) -> ToolClass {
        classify(tool_name, metadata, params, &self.config)
    }

    /// Pre-call check against the state left by earlier calls.
    ///
    /// Calls without a session key are always allowed.
    pub async fn check(
        &self,
        session_key: Option<&SessionKey>,
        signature: &CallSignature,
        class: ToolClass,
    ) -> LoopVerdict {
        let Some(session_key) = session_key.filter(|_| self.is_enabled()) else {
            return LoopVerdict::Allow;
        };

        let sessions = self.store.lock().await;
        let verdict = sessions
            .get(session_key)
            .map_or(LoopVerdict::Allow, |state| {
                state.verdict(signature, class, &self.config)
            });

        if let LoopVerdict::Block(trip) = verdict {
            warn!(
                session_key = %session_key,
                signature = %signature,
                trip = ?trip,
                "loop_detector: refusing call after breaker trip"
            );
        }

        verdict
    }

    /// Record a completed call and report a breaker this call just tripped.
    ///
    /// The read-then-write of the session's counters happens under one lock,
    /// so concurrent calls never lose updates.
    pub async fn record(
        &self,
        session_key: Option<&SessionKey>,
        signature: &CallSignature,
        class: ToolClass,
        fingerprint: ProgressFingerprint,
    ) -> Option<LoopTrip> {
        let session_key = session_key.filter(|_| self.is_enabled())?;

        let observation = {
            let mut sessions = self.store.lock().await;
            sessions
                .entry(session_key.clone())
                .or_default()
                .observe(signature, class, fingerprint, &self.config)
        };

        self.log_observation(session_key, signature, class, &observation);
        observation.trip
    }

    /// Clear all tracked state.
    ///
    /// For process restart boundaries and test isolation only; the tool
    /// interceptor never calls this.
    pub async fn reset(&self) {
        self.store.clear().await;
    }

    /// Clear one session's tracked state.
    pub async fn reset_session(&self, session_key: &SessionKey) -> bool {
        self.store.clear_session(session_key).await
    }

    /// Current count for a signature in a session.
    pub async fn repetition_count(
        &self,
        session_key: &SessionKey,
        signature: &CallSignature,
    ) -> Option<usize> {
        let sessions = self.store.lock().await;
        sessions
            .get(session_key)
            .and_then(|state| state.record(signature))
            .map(|record| record.count)
    }

    /// Current session-wide generic no-progress count.
    pub async fn global_count(&self, session_key: &SessionKey) -> usize {
        let sessions = self.store.lock().await;
        sessions
            .get(session_key)
            .map_or(0, super::state::SessionLoopState::global_count)
    }

    fn log_observation(
        &self,
        session_key: &SessionKey,
        signature: &CallSignature,
        class: ToolClass,
        observation: &Observation,
    ) {
        if let Some(trip) = observation.trip {
            warn!(
                session_key = %session_key,
                signature = %signature,
                trip = ?trip,
                "loop_detector: LOOP DETECTED, next matching call will be refused"
            );
            return;
        }

        let count = observation.count;
        if count == self.config.warning_threshold
            || (class == ToolClass::Generic && count == self.config.critical_threshold)
        {
            warn!(
                session_key = %session_key,
                signature = %signature,
                class = ?class,
                count,
                global_count = observation.global_count,
                "loop_detector: repeated call without progress"
            );
        } else {
            debug!(
                session_key = %session_key,
                signature = %signature,
                class = ?class,
                count,
                progressed = observation.progressed,
                "loop_detector: call recorded"
            );
        }
    }
}
