use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use super::{BookingService, ChatService};
use crate::errors::AppError;
use crate::models::{
    Booking, BookingPage, BookingStatus, ChatReply, ChatRequest, ChatStatus, HistoryEntry,
    StatusFilter,
};

/// reqwest client for the booking service. No credentials, retries or timeouts.
pub struct HttpBookingService {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct BookingEnvelope {
    booking: Booking,
}

impl HttpBookingService {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            client: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(&self, req: reqwest::RequestBuilder) -> Result<reqwest::Response, AppError> {
        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            tracing::warn!(status = %status, url = %resp.url(), "booking service returned error status");
            return Err(AppError::Upstream {
                status: status.as_u16(),
            });
        }
        Ok(resp)
    }
}

#[async_trait]
impl BookingService for HttpBookingService {
    async fn list_bookings(&self, filter: StatusFilter) -> Result<BookingPage, AppError> {
        let mut req = self.client.get(self.url("/api/bookings/"));
        if let Some(status) = filter {
            req = req.query(&[("status", status.as_str())]);
        }

        let page: BookingPage = self.send(req).await?.json().await?;
        tracing::debug!(count = page.bookings.len(), total = page.total, "fetched bookings");
        Ok(page)
    }

    async fn fetch_booking(&self, id: i64) -> Result<Booking, AppError> {
        let req = self.client.get(self.url(&format!("/api/bookings/{id}")));
        let envelope: BookingEnvelope = self.send(req).await?.json().await?;
        Ok(envelope.booking)
    }

    async fn update_status(&self, id: i64, status: BookingStatus) -> Result<(), AppError> {
        let req = self
            .client
            .put(self.url(&format!("/api/bookings/{id}")))
            .json(&json!({ "status": status.as_str() }));
        self.send(req).await?;
        Ok(())
    }

    async fn delete_booking(&self, id: i64) -> Result<(), AppError> {
        let req = self.client.delete(self.url(&format!("/api/bookings/{id}")));
        self.send(req).await?;
        Ok(())
    }
}

#[async_trait]
impl ChatService for HttpBookingService {
    async fn chat(&self, message: &str, history: &[HistoryEntry]) -> Result<String, AppError> {
        let body = ChatRequest {
            message: message.to_string(),
            conversation_history: history.to_vec(),
        };
        let req = self.client.post(self.url("/api/chat")).json(&body);
        let reply: ChatReply = self.send(req).await?.json().await?;
        Ok(reply.response)
    }

    async fn chat_status(&self) -> Result<ChatStatus, AppError> {
        let req = self.client.get(self.url("/api/chat/status"));
        Ok(self.send(req).await?.json().await?)
    }
}
