use std::time::Duration;

use chrono::Utc;

use crate::errors::AppError;
use crate::models::{ContactForm, ContactReceipt};

/// Accepts contact-form enquiries. Submission is simulated: nothing is sent or stored.
pub struct ContactDesk {
    delay: Duration,
}

impl ContactDesk {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub async fn submit(&self, form: &ContactForm) -> Result<ContactReceipt, AppError> {
        form.validate()?;

        tokio::time::sleep(self.delay).await;

        tracing::info!(
            name = %form.name,
            event_type = form.event_type.as_deref().unwrap_or("-"),
            event_date = ?form.event_date,
            guests = ?form.guests,
            "contact enquiry received"
        );

        Ok(ContactReceipt {
            received_at: Utc::now(),
        })
    }
}
