use axum::{
    body::Bytes,
    extract::{Path, State},
    response::{IntoResponse, Response},
    Json,
};
use http::StatusCode;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, error, info};

use super::AppState;
use crate::{
    alerts::AlertGroup,
    delivery::{deliver, DeliveryError},
    metrics,
    telegram::{Messenger, OutgoingMessage},
    Error,
};

/// Everything a request can fail with, and the status it maps to.
#[derive(Debug)]
pub enum ApiError {
    /// Chat id in the path is not an integer.
    InvalidChatId(String),
    InvalidPayload(String),
    Template(String),
    Delivery(DeliveryError),
    Ping(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::InvalidChatId(err) => (StatusCode::SERVICE_UNAVAILABLE, json!({ "err": err })),
            ApiError::InvalidPayload(err) => (StatusCode::BAD_REQUEST, json!({ "err": err })),
            ApiError::Template(err) => (StatusCode::INTERNAL_SERVER_ERROR, json!({ "err": err })),
            ApiError::Delivery(err) => (
                StatusCode::SERVICE_UNAVAILABLE,
                json!({ "err": err.reason, "srcmsg": err.source_text }),
            ),
            ApiError::Ping(err) => (StatusCode::BAD_REQUEST, json!({ "err": err })),
        };
        (status, Json(body)).into_response()
    }
}

fn parse_chat_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>().map_err(|e| {
        error!("Can't parse chat id: {:?}", raw);
        ApiError::InvalidChatId(Error::InvalidChatId(format!("{}: {}", raw, e)).to_string())
    })
}

pub fn ping_text(chat_id: i64) -> String {
    format!("Some HTTP triggered notification by alertgram... {}", chat_id)
}

pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "healthy" }))
}

pub async fn metrics() -> String {
    metrics::gather_metrics()
}

pub async fn ping(
    State(state): State<Arc<AppState>>,
    Path(chat_id): Path<String>,
) -> Result<String, ApiError> {
    let chat_id = parse_chat_id(&chat_id)?;
    info!("Bot test: {}", chat_id);

    let text = ping_text(chat_id);
    state
        .messenger
        .send_message(&OutgoingMessage::plain(chat_id, text.clone()))
        .await
        .map_err(|e| {
            error!("Ping to chat {} failed: {}", chat_id, e);
            ApiError::Ping(e.to_string())
        })?;
    Ok(text)
}

pub async fn alert(
    State(state): State<Arc<AppState>>,
    Path(chat_id): Path<String>,
    body: Bytes,
) -> Result<&'static str, ApiError> {
    let chat_id = parse_chat_id(&chat_id)?;
    info!("Bot alert post: {}", chat_id);

    let group = AlertGroup::from_slice(&body).map_err(|e| {
        error!("Invalid alert payload for chat {}: {}", chat_id, e);
        ApiError::InvalidPayload(e.to_string())
    })?;
    metrics::ALERT_GROUPS_RECEIVED_TOTAL.inc();
    info!(
        "Alert group for chat {}: status={} receiver={} alerts={}",
        chat_id,
        group.status,
        group.receiver,
        group.alerts.len()
    );

    let message = state.composer.compose(&group).map_err(|e| {
        error!("Failed to compose message for chat {}: {}", chat_id, e);
        ApiError::Template(e.to_string())
    })?;
    debug!("message: {}", message.text);

    deliver(state.messenger.as_ref(), chat_id, &message)
        .await
        .map_err(ApiError::Delivery)?;
    Ok("telegram msg sent.")
}
