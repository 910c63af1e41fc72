use std::env;
use std::time::Duration;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";
pub const DEFAULT_CONTACT_PHONE: &str = "+92 300 1609087";
pub const DEFAULT_VENUE_NAME: &str = "Star Crescent Marriage Lawn";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub backend_url: String,
    /// Bearer token for the console routes. `None` leaves them open.
    pub admin_token: Option<String>,
    pub contact_phone: String,
    pub venue_name: String,
    pub contact_delay: Duration,
    pub chat_session_ttl: Duration,
    pub chat_max_sessions: usize,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            backend_url: env::var("BACKEND_URL")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string()),
            admin_token: env::var("ADMIN_TOKEN").ok().filter(|v| !v.is_empty()),
            contact_phone: env::var("CONTACT_PHONE")
                .unwrap_or_else(|_| DEFAULT_CONTACT_PHONE.to_string()),
            venue_name: env::var("VENUE_NAME").unwrap_or_else(|_| DEFAULT_VENUE_NAME.to_string()),
            contact_delay: Duration::from_millis(
                env::var("CONTACT_DELAY_MS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(1500),
            ),
            chat_session_ttl: Duration::from_secs(
                env::var("CHAT_SESSION_TTL_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(1800),
            ),
            chat_max_sessions: env::var("CHAT_MAX_SESSIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(1000),
        }
    }

    pub fn greeting(&self) -> String {
        format!(
            "Hello! Welcome to {}. I'm here to help you with booking inquiries, event planning, \
             and any questions about our services. How can I assist you today?",
            self.venue_name
        )
    }

    pub fn chat_fallback(&self) -> String {
        format!(
            "I'm sorry, I'm having trouble connecting right now. Please try again or contact us \
             directly at {}.",
            self.contact_phone
        )
    }
}
