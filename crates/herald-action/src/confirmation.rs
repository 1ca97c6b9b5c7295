//! Per-user pending confirmation store.
//!
//! Each user has at most one pending action. A new confirmation-requiring
//! dispatch replaces the previous entry. Entries expire lazily on access
//! and are also removed by a periodic sweep.

use std::collections::HashMap;
use std::sync::RwLock;

use herald_core::types::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{ActionContext, ActionParams, ActionResult};

/// An action deferred until its user confirms or rejects it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingConfirmation {
    pub id: Uuid,
    pub user_id: String,
    pub action: String,
    pub params: ActionParams,
    pub context: ActionContext,
    /// The gated result shown to the user.
    pub result: ActionResult,
    pub created_at: Timestamp,
}

impl PendingConfirmation {
    pub fn new(
        user_id: impl Into<String>,
        action: impl Into<String>,
        params: ActionParams,
        context: ActionContext,
        result: ActionResult,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            action: action.into(),
            params,
            context,
            result,
            created_at,
        }
    }
}

/// Outcome of claiming a user's pending entry. The entry is removed in
/// every case except `Empty`.
#[derive(Debug)]
pub enum Claim {
    Empty,
    Expired(PendingConfirmation),
    Live(PendingConfirmation),
}

/// In-memory store holding one pending confirmation slot per user.
pub struct ConfirmationStore {
    expiry_secs: u64,
    pending: RwLock<HashMap<String, PendingConfirmation>>,
}

impl ConfirmationStore {
    pub fn new(expiry_secs: u64) -> Self {
        Self {
            expiry_secs,
            pending: RwLock::new(HashMap::new()),
        }
    }

    pub fn expiry_secs(&self) -> u64 {
        self.expiry_secs
    }

    fn is_expired(&self, entry: &PendingConfirmation, now: Timestamp) -> bool {
        entry.created_at.age_secs_at(now) > self.expiry_secs
    }

    /// Store `entry` in its user's slot, returning the entry it replaced.
    pub fn insert(&self, entry: PendingConfirmation) -> Option<PendingConfirmation> {
        let mut pending = self.pending.write().unwrap_or_else(|e| e.into_inner());
        let replaced = pending.insert(entry.user_id.clone(), entry);
        if let Some(old) = &replaced {
            tracing::debug!(user_id = %old.user_id, action = %old.action, "Pending confirmation replaced");
        }
        replaced
    }

    /// Remove and classify the user's pending entry as of `now`.
    pub fn take_at(&self, user_id: &str, now: Timestamp) -> Claim {
        let mut pending = self.pending.write().unwrap_or_else(|e| e.into_inner());
        match pending.remove(user_id) {
            None => Claim::Empty,
            Some(entry) if self.is_expired(&entry, now) => Claim::Expired(entry),
            Some(entry) => Claim::Live(entry),
        }
    }

    pub fn take(&self, user_id: &str) -> Claim {
        self.take_at(user_id, Timestamp::now())
    }

    /// Look up the user's live entry as of `now`, deleting it if expired.
    pub fn peek_at(&self, user_id: &str, now: Timestamp) -> Option<PendingConfirmation> {
        let expired_id = {
            let pending = self.pending.read().unwrap_or_else(|e| e.into_inner());
            let entry = pending.get(user_id)?;
            if !self.is_expired(entry, now) {
                return Some(entry.clone());
            }
            entry.id
        };

        self.remove_if(user_id, expired_id, now);
        None
    }

    pub fn peek(&self, user_id: &str) -> Option<PendingConfirmation> {
        self.peek_at(user_id, Timestamp::now())
    }

    /// Remove every entry older than the expiry window as of `now`.
    ///
    /// Collects candidates under a read lock, then removes each under a
    /// short write lock so concurrent dispatches are never held up for the
    /// whole pass. Returns the number of entries removed.
    pub fn sweep_at(&self, now: Timestamp) -> usize {
        let candidates: Vec<(String, Uuid)> = {
            let pending = self.pending.read().unwrap_or_else(|e| e.into_inner());
            pending
                .values()
                .filter(|entry| self.is_expired(entry, now))
                .map(|entry| (entry.user_id.clone(), entry.id))
                .collect()
        };

        candidates
            .into_iter()
            .filter(|(user_id, id)| self.remove_if(user_id, *id, now))
            .count()
    }

    pub fn sweep(&self) -> usize {
        self.sweep_at(Timestamp::now())
    }

    /// Remove the user's entry only if it is still `id` and still expired.
    fn remove_if(&self, user_id: &str, id: Uuid, now: Timestamp) -> bool {
        let mut pending = self.pending.write().unwrap_or_else(|e| e.into_inner());
        let still_stale = pending
            .get(user_id)
            .is_some_and(|entry| entry.id == id && self.is_expired(entry, now));
        if still_stale {
            pending.remove(user_id);
            tracing::debug!(user_id = %user_id, "Expired pending confirmation removed");
        }
        still_stale
    }

    pub fn len(&self) -> usize {
        self.pending.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXPIRY: u64 = 600;
    const T: Timestamp = Timestamp(1_700_000_000);

    fn entry(user: &str, action: &str, created_at: Timestamp) -> PendingConfirmation {
        PendingConfirmation::new(
            user,
            action,
            ActionParams::new(),
            ActionContext::for_user(user),
            ActionResult::failure(action, "placeholder"),
            created_at,
        )
    }

    #[test]
    fn test_insert_and_take_live() {
        let store = ConfirmationStore::new(EXPIRY);
        assert!(store.insert(entry("u1", "deploy", T)).is_none());
        assert_eq!(store.len(), 1);

        match store.take_at("u1", T.plus_secs(60)) {
            Claim::Live(p) => assert_eq!(p.action, "deploy"),
            other => panic!("expected live claim, got {:?}", other),
        }
        assert!(store.is_empty());
    }

    #[test]
    fn test_take_empty() {
        let store = ConfirmationStore::new(EXPIRY);
        assert!(matches!(store.take_at("u1", T), Claim::Empty));
    }

    #[test]
    fn test_take_expired_removes_entry() {
        let store = ConfirmationStore::new(EXPIRY);
        store.insert(entry("u1", "deploy", T));
        assert!(matches!(
            store.take_at("u1", T.plus_secs(11 * 60)),
            Claim::Expired(_)
        ));
        assert!(matches!(store.take_at("u1", T.plus_secs(11 * 60)), Claim::Empty));
    }

    #[test]
    fn test_second_insert_replaces_first() {
        let store = ConfirmationStore::new(EXPIRY);
        store.insert(entry("u1", "create-page", T));
        let replaced = store.insert(entry("u1", "deploy", T.plus_secs(5)));
        assert_eq!(replaced.unwrap().action, "create-page");
        assert_eq!(store.len(), 1);
        assert_eq!(store.peek_at("u1", T.plus_secs(10)).unwrap().action, "deploy");
    }

    #[test]
    fn test_users_are_independent() {
        let store = ConfirmationStore::new(EXPIRY);
        store.insert(entry("u1", "create-page", T));
        store.insert(entry("u2", "deploy", T));
        assert_eq!(store.len(), 2);
        assert!(matches!(store.take_at("u1", T), Claim::Live(_)));
        assert!(store.peek_at("u2", T).is_some());
    }

    #[test]
    fn test_peek_window_boundaries() {
        let store = ConfirmationStore::new(EXPIRY);
        store.insert(entry("u1", "deploy", T));
        assert!(store.peek_at("u1", T.plus_secs(9 * 60)).is_some());
        assert!(store.peek_at("u1", T.plus_secs(600)).is_some());
        assert!(store.peek_at("u1", T.plus_secs(11 * 60)).is_none());
        // Lazy expiry deleted the entry
        assert!(store.is_empty());
    }

    #[test]
    fn test_peek_does_not_consume() {
        let store = ConfirmationStore::new(EXPIRY);
        store.insert(entry("u1", "deploy", T));
        assert!(store.peek_at("u1", T).is_some());
        assert!(store.peek_at("u1", T).is_some());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_sweep_removes_only_stale_entries() {
        let store = ConfirmationStore::new(EXPIRY);
        store.insert(entry("old", "deploy", T));
        store.insert(entry("fresh", "deploy", T.plus_secs(500)));
        store.insert(entry("older", "create-page", T.plus_secs(-100)));

        let removed = store.sweep_at(T.plus_secs(700));
        assert_eq!(removed, 2);
        assert_eq!(store.len(), 1);
        assert!(store.peek_at("fresh", T.plus_secs(700)).is_some());
    }

    #[test]
    fn test_sweep_empty_store() {
        let store = ConfirmationStore::new(EXPIRY);
        assert_eq!(store.sweep_at(T), 0);
    }

    #[test]
    fn test_remove_if_skips_replaced_entry() {
        let store = ConfirmationStore::new(EXPIRY);
        let stale = entry("u1", "deploy", T);
        let stale_id = stale.id;
        store.insert(stale);
        store.insert(entry("u1", "create-page", T.plus_secs(1000)));

        assert!(!store.remove_if("u1", stale_id, T.plus_secs(1000)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_pending_serializes_camel_case() {
        let json = serde_json::to_value(entry("u1", "deploy", T)).unwrap();
        assert_eq!(json["userId"], "u1");
        assert_eq!(json["createdAt"], 1_700_000_000);
    }
}
