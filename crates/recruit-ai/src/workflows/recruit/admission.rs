//! Run admission control.
//!
//! The upstream change feed delivers at-least-once, so the same document can
//! trigger several events in quick succession. A process-wide map from
//! document id to last-admission instant gates dispatch: duplicates inside
//! the cooldown window are dropped before any processing begins. Expired
//! entries are swept on every check, keeping the map bounded by the set of
//! documents seen within one cooldown window.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::debug;

pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(60);

#[derive(Debug)]
pub struct AdmissionController {
    cooldown: Duration,
    recent: Mutex<HashMap<String, Instant>>,
}

impl Default for AdmissionController {
    fn default() -> Self {
        Self::new(DEFAULT_COOLDOWN)
    }
}

impl AdmissionController {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            recent: Mutex::new(HashMap::new()),
        }
    }

    /// Check-and-set admission for one document id. Returns `false` when the
    /// id was admitted less than one cooldown ago. The lock is held only for
    /// this short check.
    pub fn admit(&self, document_id: &str) -> bool {
        self.admit_at(document_id, Instant::now())
    }

    fn admit_at(&self, document_id: &str, now: Instant) -> bool {
        let mut recent = self.recent.lock().expect("admission mutex poisoned");
        recent.retain(|_, last| now.saturating_duration_since(*last) < self.cooldown);

        if recent.contains_key(document_id) {
            debug!(document_id, "duplicate trigger inside cooldown, dropping");
            return false;
        }
        recent.insert(document_id.to_string(), now);
        true
    }

    /// Release one entry's cooldown early, e.g. when its run was never
    /// actually dispatched.
    pub fn forget(&self, document_id: &str) {
        self.recent
            .lock()
            .expect("admission mutex poisoned")
            .remove(document_id);
    }

    /// Forget everything previously admitted.
    pub fn reset(&self) {
        self.recent.lock().expect("admission mutex poisoned").clear();
    }

    /// Number of document ids currently inside their cooldown window.
    pub fn tracked(&self) -> usize {
        self.recent.lock().expect("admission mutex poisoned").len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_within_cooldown_is_dropped() {
        let controller = AdmissionController::new(Duration::from_secs(60));
        let now = Instant::now();
        assert!(controller.admit_at("doc-1", now));
        assert!(!controller.admit_at("doc-1", now + Duration::from_secs(10)));
    }

    #[test]
    fn same_document_admitted_again_after_cooldown() {
        let controller = AdmissionController::new(Duration::from_secs(60));
        let now = Instant::now();
        assert!(controller.admit_at("doc-1", now));
        assert!(controller.admit_at("doc-1", now + Duration::from_secs(61)));
    }

    #[test]
    fn distinct_documents_are_independent() {
        let controller = AdmissionController::new(Duration::from_secs(60));
        let now = Instant::now();
        assert!(controller.admit_at("doc-1", now));
        assert!(controller.admit_at("doc-2", now));
    }

    #[test]
    fn expired_entries_are_swept_on_check() {
        let controller = AdmissionController::new(Duration::from_secs(60));
        let now = Instant::now();
        for i in 0..100 {
            assert!(controller.admit_at(&format!("doc-{i}"), now));
        }
        assert_eq!(controller.tracked(), 100);

        assert!(controller.admit_at("doc-new", now + Duration::from_secs(120)));
        assert_eq!(controller.tracked(), 1);
    }

    #[test]
    fn forget_releases_a_single_cooldown() {
        let controller = AdmissionController::new(Duration::from_secs(60));
        let now = Instant::now();
        assert!(controller.admit_at("doc-1", now));
        assert!(controller.admit_at("doc-2", now));
        controller.forget("doc-1");
        assert!(controller.admit_at("doc-1", now));
        assert!(!controller.admit_at("doc-2", now));
    }

    #[test]
    fn reset_clears_the_map() {
        let controller = AdmissionController::new(Duration::from_secs(60));
        let now = Instant::now();
        assert!(controller.admit_at("doc-1", now));
        controller.reset();
        assert!(controller.admit_at("doc-1", now));
    }
}
