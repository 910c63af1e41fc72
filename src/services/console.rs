use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;

use crate::errors::AppError;
use crate::models::{Booking, BookingStatus, ConsoleAction, StatusFilter};
use crate::services::backend::BookingService;

pub const FETCH_FAILED: &str = "Failed to fetch bookings";
pub const UPDATE_FAILED: &str = "Failed to update booking";
pub const DELETE_FAILED: &str = "Failed to delete booking";
pub const DELETE_PROMPT: &str =
    "Are you sure you want to delete this booking? This action cannot be undone.";

/// Surfaces blocking alerts to the operator.
pub trait Notifier: Send + Sync {
    fn alert(&self, message: &str);
}

pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn alert(&self, message: &str) {
        tracing::warn!(alert = message, "console alert");
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ConsoleView {
    pub filter: StatusFilter,
    pub bookings: Vec<Booking>,
    pub total: u64,
    pub loading: bool,
    pub error: Option<String>,
}

impl ConsoleView {
    pub fn rows(&self) -> Vec<BookingRow> {
        self.bookings
            .iter()
            .map(|b| BookingRow {
                booking: b.clone(),
                actions: ConsoleAction::for_status(b.status),
            })
            .collect()
    }

    /// `total` comes from the service; the per-status counts cover the visible list.
    pub fn stats(&self) -> ConsoleStats {
        let count = |s: BookingStatus| self.bookings.iter().filter(|b| b.status == s).count();
        ConsoleStats {
            total: self.total,
            pending: count(BookingStatus::Pending),
            confirmed: count(BookingStatus::Confirmed),
            cancelled: count(BookingStatus::Cancelled),
            rejected: count(BookingStatus::Rejected),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BookingRow {
    pub booking: Booking,
    pub actions: Vec<ConsoleAction>,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ConsoleStats {
    pub total: u64,
    pub pending: usize,
    pub confirmed: usize,
    pub cancelled: usize,
    pub rejected: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refresh {
    Applied,
    /// A newer fetch was issued while this one was in flight.
    Stale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deletion {
    Declined,
    Deleted,
}

/// In-memory admin view over the booking service.
///
/// Every successful fetch replaces the whole list. Responses are tagged with a
/// sequence number and only the most recently issued fetch may write the view.
pub struct BookingConsole {
    service: Arc<dyn BookingService>,
    notifier: Arc<dyn Notifier>,
    issued: AtomicU64,
    view: Mutex<ConsoleView>,
}

impl BookingConsole {
    pub fn new(service: Arc<dyn BookingService>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            service,
            notifier,
            issued: AtomicU64::new(0),
            view: Mutex::new(ConsoleView::default()),
        }
    }

    fn view(&self) -> MutexGuard<'_, ConsoleView> {
        self.view.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> ConsoleView {
        self.view().clone()
    }

    pub fn filter(&self) -> StatusFilter {
        self.view().filter
    }

    pub fn rows(&self) -> Vec<BookingRow> {
        self.view().rows()
    }

    pub fn stats(&self) -> ConsoleStats {
        self.view().stats()
    }

    pub async fn set_filter(&self, filter: StatusFilter) -> Result<Refresh, AppError> {
        self.view().filter = filter;
        self.refresh().await
    }

    pub async fn refresh(&self) -> Result<Refresh, AppError> {
        let (seq, filter) = {
            let mut view = self.view();
            view.loading = true;
            view.error = None;
            (self.issued.fetch_add(1, Ordering::SeqCst) + 1, view.filter)
        };

        let result = self.service.list_bookings(filter).await;

        let mut view = self.view();
        if self.issued.load(Ordering::SeqCst) != seq {
            tracing::debug!(seq, "discarding stale booking list response");
            return Ok(Refresh::Stale);
        }
        view.loading = false;

        match result {
            Ok(page) => {
                view.bookings = page.bookings;
                view.total = page.total;
                Ok(Refresh::Applied)
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to fetch bookings");
                view.bookings.clear();
                view.total = 0;
                view.error = Some(FETCH_FAILED.to_string());
                Err(AppError::operation(FETCH_FAILED, e))
            }
        }
    }

    pub async fn detail(&self, id: i64) -> Result<Booking, AppError> {
        self.service.fetch_booking(id).await
    }

    /// Moves a listed booking to `target` if the console offers that control.
    pub async fn transition(&self, id: i64, target: BookingStatus) -> Result<(), AppError> {
        let current = self
            .view()
            .bookings
            .iter()
            .find(|b| b.id == id)
            .map(|b| b.status)
            .ok_or_else(|| AppError::NotFound(format!("booking {id}")))?;

        if !current.can_transition_to(target) {
            return Err(AppError::InvalidTransition {
                from: current,
                to: target,
            });
        }

        if let Err(e) = self.service.update_status(id, target).await {
            tracing::warn!(error = %e, booking_id = id, "failed to update booking status");
            self.notifier.alert(UPDATE_FAILED);
            return Err(AppError::operation(UPDATE_FAILED, e));
        }
        tracing::info!(booking_id = id, from = %current, to = %target, "booking status updated");

        self.refetch().await;
        Ok(())
    }

    /// Deletes a booking after `confirm` accepts [`DELETE_PROMPT`].
    pub async fn delete<F>(&self, id: i64, confirm: F) -> Result<Deletion, AppError>
    where
        F: FnOnce(&str) -> bool,
    {
        if !confirm(DELETE_PROMPT) {
            return Ok(Deletion::Declined);
        }

        if let Err(e) = self.service.delete_booking(id).await {
            tracing::warn!(error = %e, booking_id = id, "failed to delete booking");
            self.notifier.alert(DELETE_FAILED);
            return Err(AppError::operation(DELETE_FAILED, e));
        }
        tracing::info!(booking_id = id, "booking deleted");

        self.refetch().await;
        Ok(Deletion::Deleted)
    }

    // Failures land in the view's error field; the mutation itself succeeded.
    async fn refetch(&self) {
        if let Err(e) = self.refresh().await {
            tracing::debug!(error = %e, "re-fetch after mutation failed");
        }
    }
}
