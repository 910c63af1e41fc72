use std::sync::Arc;

use axum::extract::State;
use axum::Json;

use crate::errors::AppError;
use crate::models::{ContactForm, ContactReceipt};
use crate::state::AppState;

// POST /api/contact
pub async fn submit(
    State(state): State<Arc<AppState>>,
    Json(form): Json<ContactForm>,
) -> Result<Json<ContactReceipt>, AppError> {
    let receipt = state.contact.submit(&form).await?;
    Ok(Json(receipt))
}
