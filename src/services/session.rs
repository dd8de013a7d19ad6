use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::models::ConversationState;

pub type TurnGuard = OwnedMutexGuard<()>;

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, session_id: &str) -> ConversationState;

    async fn set(&self, session_id: &str, state: ConversationState);

    async fn begin_turn(&self, session_id: &str) -> Option<TurnGuard>;
}

#[derive(Default)]
struct SessionSlot {
    turn: Arc<Mutex<()>>,
    state: RwLock<ConversationState>,
}

// In-process store. The outer map lock is only held long enough to find or
// create a slot, so different sessions never wait on each other.
#[derive(Default)]
pub struct InMemorySessionStore {
    slots: RwLock<HashMap<String, Arc<SessionSlot>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.slots.read().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn slot(&self, session_id: &str) -> Option<Arc<SessionSlot>> {
        self.slots.read().ok()?.get(session_id).cloned()
    }

    fn slot_or_insert(&self, session_id: &str) -> Option<Arc<SessionSlot>> {
        if let Some(slot) = self.slot(session_id) {
            return Some(slot);
        }
        let mut slots = self.slots.write().ok()?;
        Some(Arc::clone(
            slots.entry(session_id.to_string()).or_default(),
        ))
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, session_id: &str) -> ConversationState {
        if session_id.is_empty() {
            return ConversationState::default();
        }
        self.slot(session_id)
            .and_then(|slot| slot.state.read().ok().map(|s| s.clone()))
            .unwrap_or_default()
    }

    async fn set(&self, session_id: &str, mut state: ConversationState) {
        if session_id.is_empty() {
            return;
        }
        let Some(slot) = self.slot_or_insert(session_id) else {
            tracing::error!(session_id, "session map lock poisoned, dropping update");
            return;
        };
        state.updated_at = Some(Utc::now());
        match slot.state.write() {
            Ok(mut current) => *current = state,
            Err(_) => tracing::error!(session_id, "session state lock poisoned, dropping update"),
        };
    }

    async fn begin_turn(&self, session_id: &str) -> Option<TurnGuard> {
        if session_id.is_empty() {
            return None;
        }
        let slot = self.slot_or_insert(session_id)?;
        Some(Arc::clone(&slot.turn).lock_owned().await)
    }
}
