//! Handler for the chat relay endpoint.
//!
//! Accepts either a single `message` string or a full `messages`
//! conversation and forwards it to the configured completion provider.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use genrelay_chat::{ChatMessage, ChatRequest};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// `POST /api/v1/chat` request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRelayRequest {
    /// Single-turn shorthand: wrapped as one user message.
    pub message: Option<String>,
    /// Full conversation; takes precedence over `message`.
    pub messages: Option<Vec<ChatMessage>>,
    pub model: Option<String>,
}

/// `POST /api/v1/chat` response body.
#[derive(Debug, Serialize)]
pub struct ChatRelayResponse {
    pub reply: String,
    pub model: String,
}

/// POST /api/v1/chat
pub async fn relay_chat(
    State(state): State<AppState>,
    Json(body): Json<ChatRelayRequest>,
) -> AppResult<Json<ChatRelayResponse>> {
    let messages = match (body.messages, body.message) {
        (Some(messages), _) if !messages.is_empty() => messages,
        (_, Some(message)) if !message.trim().is_empty() => vec![ChatMessage::user(message)],
        _ => {
            return Err(AppError::BadRequest(
                "Provide either 'message' or a non-empty 'messages' list".to_string(),
            ))
        }
    };

    let completion = state
        .chat
        .complete(&ChatRequest {
            messages,
            model: body.model,
        })
        .await?;

    Ok(Json(ChatRelayResponse {
        reply: completion.reply,
        model: completion.model,
    }))
}
