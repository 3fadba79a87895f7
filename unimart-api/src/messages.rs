use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use unimart_core::Message;
use unimart_shared::{ListingKind, ListingRef};

use crate::{auth::Auth, error::AppError, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/messages", get(inbox).post(send_message))
        .route("/messages/unread-count", get(unread_count))
        .route("/messages/{id}/read", post(mark_read))
}

async fn inbox(
    State(state): State<AppState>,
    Auth(actor): Auth,
) -> Result<Json<Vec<Message>>, AppError> {
    let messages = state.messages.inbox(actor.id).await?;
    Ok(Json(messages))
}

#[derive(Debug, Deserialize)]
struct SendMessageRequest {
    recipient_id: Uuid,
    listing_kind: Option<ListingKind>,
    listing_id: Option<Uuid>,
    subject: String,
    body: String,
}

async fn send_message(
    State(state): State<AppState>,
    Auth(actor): Auth,
    Json(req): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<Message>), AppError> {
    let listing = match (req.listing_kind, req.listing_id) {
        (Some(kind), Some(id)) => Some(ListingRef { kind, id }),
        (None, None) => None,
        _ => {
            return Err(AppError::ValidationError(
                "listing_kind and listing_id must be supplied together".into(),
            ))
        }
    };
    if req.subject.trim().is_empty() {
        return Err(AppError::ValidationError("subject must not be empty".into()));
    }

    let message = Message::new(actor.id, req.recipient_id, listing, req.subject, req.body);
    state.messages.create(&message).await?;
    Ok((StatusCode::CREATED, Json(message)))
}

#[derive(Debug, Serialize)]
struct UnreadCount {
    unread: u64,
}

async fn unread_count(
    State(state): State<AppState>,
    Auth(actor): Auth,
) -> Result<Json<UnreadCount>, AppError> {
    let unread = state.messages.unread_count(actor.id).await?;
    Ok(Json(UnreadCount { unread }))
}

async fn mark_read(
    State(state): State<AppState>,
    Auth(actor): Auth,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    state.messages.mark_read(id, actor.id).await?;
    Ok(Json(json!({ "ok": true })))
}
