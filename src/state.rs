use std::sync::Arc;

use crate::config::AppConfig;
use crate::services::backend::{BookingService, ChatService};
use crate::services::chat::{ChatSessions, SessionLimits};
use crate::services::console::{BookingConsole, Notifier};
use crate::services::contact::ContactDesk;

pub struct AppState {
    pub config: AppConfig,
    pub console: BookingConsole,
    pub chat: ChatSessions,
    pub contact: ContactDesk,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        bookings: Arc<dyn BookingService>,
        chat: Arc<dyn ChatService>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let limits = SessionLimits {
            idle_ttl: config.chat_session_ttl,
            max_sessions: config.chat_max_sessions,
        };
        let sessions = ChatSessions::new(chat, config.greeting(), config.chat_fallback(), limits);
        let contact = ContactDesk::new(config.contact_delay);
        Self {
            console: BookingConsole::new(bookings, notifier),
            chat: sessions,
            contact,
            config,
        }
    }
}
