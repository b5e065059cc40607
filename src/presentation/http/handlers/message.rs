//! Message Handlers

use axum::{extract::State, http::StatusCode, Json};
use validator::Validate;

use crate::application::dto::request::CreateMessageRequest;
use crate::application::dto::response::MessageResponse;
use crate::presentation::http::extractors::AuthUser;
use crate::shared::error::AppError;
use crate::shared::validation::validation_error;
use crate::startup::AppState;

/// Post a message as the caller
pub async fn create_message(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(body): Json<CreateMessageRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    body.validate().map_err(validation_error)?;

    let message = state.messages.create_message(&user, &body.body).await?;

    Ok((StatusCode::CREATED, Json(message.into())))
}

/// List all messages, oldest first
pub async fn list_messages(
    State(state): State<AppState>,
) -> Result<Json<Vec<MessageResponse>>, AppError> {
    let messages = state.messages.list_messages().await?;
    Ok(Json(messages.into_iter().map(MessageResponse::from).collect()))
}
