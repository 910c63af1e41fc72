use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use uuid::Uuid;

use crate::models::{ChatTurn, HistoryEntry};
use crate::services::backend::ChatService;

/// Append-only conversation relayed to the booking service's chat endpoint.
///
/// A failed request never rolls the conversation back: the visitor sees a
/// fallback assistant turn instead.
pub struct ChatRelay {
    service: Arc<dyn ChatService>,
    fallback: String,
    turns: Mutex<Vec<ChatTurn>>,
    in_flight: AtomicUsize,
}

impl ChatRelay {
    pub fn new(service: Arc<dyn ChatService>, greeting: &str, fallback: impl Into<String>) -> Self {
        Self {
            service,
            fallback: fallback.into(),
            turns: Mutex::new(vec![ChatTurn::assistant(greeting)]),
            in_flight: AtomicUsize::new(0),
        }
    }

    fn lock_turns(&self) -> MutexGuard<'_, Vec<ChatTurn>> {
        self.turns.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn turns(&self) -> Vec<ChatTurn> {
        self.lock_turns().clone()
    }

    /// Advisory only; concurrent sends are not blocked.
    pub fn is_sending(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    /// Appends the user turn and returns it with the history that preceded it.
    fn push_user(&self, content: &str) -> (ChatTurn, Vec<HistoryEntry>) {
        let mut turns = self.lock_turns();
        let history = turns.iter().map(ChatTurn::to_history).collect();
        let turn = ChatTurn::user(content);
        turns.push(turn.clone());
        (turn, history)
    }

    fn push_assistant(&self, content: String) -> ChatTurn {
        let turn = ChatTurn::assistant(content);
        self.lock_turns().push(turn.clone());
        turn
    }

    /// Sends a visitor message. Blank input is ignored.
    pub async fn send(&self, text: &str) -> Option<ChatTurn> {
        let content = text.trim();
        if content.is_empty() {
            return None;
        }

        let (turn, history) = self.push_user(content);
        self.in_flight.fetch_add(1, Ordering::SeqCst);

        let reply = match self.service.chat(&turn.content, &history).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!(error = %e, "chat request failed, using fallback reply");
                self.fallback.clone()
            }
        };

        let assistant = self.push_assistant(reply);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Some(assistant)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SessionLimits {
    /// Sessions untouched for this long are dropped.
    pub idle_ttl: Duration,
    pub max_sessions: usize,
}

struct Session {
    relay: Arc<ChatRelay>,
    last_active: Instant,
}

/// Visitor chat sessions, kept in memory and bounded by [`SessionLimits`].
pub struct ChatSessions {
    service: Arc<dyn ChatService>,
    greeting: String,
    fallback: String,
    limits: SessionLimits,
    sessions: Mutex<HashMap<Uuid, Session>>,
}

impl ChatSessions {
    pub fn new(
        service: Arc<dyn ChatService>,
        greeting: String,
        fallback: String,
        limits: SessionLimits,
    ) -> Self {
        Self {
            service,
            greeting,
            fallback,
            limits,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    fn lock_sessions(&self) -> MutexGuard<'_, HashMap<Uuid, Session>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn len(&self) -> usize {
        self.lock_sessions().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn open(&self) -> (Uuid, Arc<ChatRelay>) {
        let id = Uuid::new_v4();
        let relay = Arc::new(ChatRelay::new(
            Arc::clone(&self.service),
            &self.greeting,
            self.fallback.clone(),
        ));

        let mut sessions = self.lock_sessions();
        let before = sessions.len();
        sessions.retain(|_, s| s.last_active.elapsed() < self.limits.idle_ttl);

        while sessions.len() >= self.limits.max_sessions.max(1) {
            let oldest = sessions
                .iter()
                .min_by_key(|(_, s)| s.last_active)
                .map(|(id, _)| *id);
            match oldest {
                Some(oldest) => {
                    sessions.remove(&oldest);
                }
                None => break,
            }
        }

        let dropped = before - sessions.len();
        if dropped > 0 {
            tracing::debug!(dropped, "evicted chat sessions");
        }

        sessions.insert(
            id,
            Session {
                relay: Arc::clone(&relay),
                last_active: Instant::now(),
            },
        );
        tracing::info!(session = %id, "chat session opened");
        (id, relay)
    }

    /// Looks up a live session and marks it active.
    pub fn get(&self, id: &Uuid) -> Option<Arc<ChatRelay>> {
        let mut sessions = self.lock_sessions();
        let expired = sessions
            .get(id)
            .is_some_and(|s| s.last_active.elapsed() >= self.limits.idle_ttl);
        if expired {
            sessions.remove(id);
            return None;
        }

        sessions.get_mut(id).map(|s| {
            s.last_active = Instant::now();
            Arc::clone(&s.relay)
        })
    }

    pub fn service(&self) -> &Arc<dyn ChatService> {
        &self.service
    }
}
