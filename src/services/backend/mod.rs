pub mod http;

use async_trait::async_trait;

use crate::errors::AppError;
use crate::models::{Booking, BookingPage, BookingStatus, ChatStatus, HistoryEntry, StatusFilter};

/// Booking endpoints of the external booking service.
#[async_trait]
pub trait BookingService: Send + Sync {
    async fn list_bookings(&self, filter: StatusFilter) -> Result<BookingPage, AppError>;
    async fn fetch_booking(&self, id: i64) -> Result<Booking, AppError>;
    async fn update_status(&self, id: i64, status: BookingStatus) -> Result<(), AppError>;
    async fn delete_booking(&self, id: i64) -> Result<(), AppError>;
}

/// Chat endpoint of the external booking service.
#[async_trait]
pub trait ChatService: Send + Sync {
    async fn chat(&self, message: &str, history: &[HistoryEntry]) -> Result<String, AppError>;
    async fn chat_status(&self) -> Result<ChatStatus, AppError>;
}
