//! Gateway Request Dispatch
//!
//! Op 5 requests are routed here by method name. The caller is the identity
//! pinned at connection init; protected methods pass it through
//! `require_user` exactly like the HTTP extractor does.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

use crate::application::dto::request::{CreateMessageRequest, FollowUserRequest};
use crate::application::dto::response::{
    CurrentUserResponse, FollowListResponse, MessageResponse, UserResponse,
};
use crate::domain::{require_user, CurrentUser};
use crate::shared::error::AppError;
use crate::shared::validation::validation_error;
use crate::startup::AppState;

/// Optional target for the follower/following views. Defaults to the caller.
#[derive(Debug, Default, Deserialize)]
struct ViewParams {
    #[serde(default)]
    username: Option<String>,
}

/// Run one gateway request and return its JSON result.
pub async fn handle_request(
    state: &AppState,
    caller: Option<&CurrentUser>,
    method: &str,
    params: Value,
) -> Result<Value, AppError> {
    match method {
        "me" => {
            let user = authenticated(caller)?;
            to_json(CurrentUserResponse::from(user))
        }
        "users" => {
            let viewer_id = caller.map(|c| c.id);
            let users: Vec<UserResponse> = state
                .graph
                .list_all()
                .await?
                .into_iter()
                .map(|u| {
                    let is_self = Some(u.id) == viewer_id;
                    UserResponse::from_user(u, is_self)
                })
                .collect();
            to_json(users)
        }
        "followUser" => {
            let user = authenticated(caller)?;
            let req: FollowUserRequest = parse_params(params)?;
            req.validate().map_err(validation_error)?;
            let actor = state.graph.follow(user.id, &req.username).await?;
            to_json(UserResponse::from_user(actor, true))
        }
        "unfollowUser" => {
            let user = authenticated(caller)?;
            let req: FollowUserRequest = parse_params(params)?;
            req.validate().map_err(validation_error)?;
            let actor = state.graph.unfollow(user.id, &req.username).await?;
            to_json(UserResponse::from_user(actor, true))
        }
        "followers" => {
            let list = match optional_params::<ViewParams>(params)?.username {
                Some(username) => state.graph.followers_of_username(&username).await?,
                None => state.graph.followers_of(authenticated(caller)?.id).await?,
            };
            to_json(FollowListResponse::from(list))
        }
        "following" => {
            let list = match optional_params::<ViewParams>(params)?.username {
                Some(username) => state.graph.following_of_username(&username).await?,
                None => state.graph.following_of(authenticated(caller)?.id).await?,
            };
            to_json(FollowListResponse::from(list))
        }
        // Followers of the caller; any params are ignored
        "follows" => {
            let user = authenticated(caller)?;
            let list = state.graph.followers_of(user.id).await?;
            to_json(FollowListResponse::from(list))
        }
        "createMessage" => {
            let user = authenticated(caller)?;
            let req: CreateMessageRequest = parse_params(params)?;
            req.validate().map_err(validation_error)?;
            let message = state.messages.create_message(&user, &req.body).await?;
            to_json(MessageResponse::from(message))
        }
        "messages" => {
            let messages: Vec<MessageResponse> = state
                .messages
                .list_messages()
                .await?
                .into_iter()
                .map(MessageResponse::from)
                .collect();
            to_json(messages)
        }
        other => Err(AppError::BadRequest(format!("Unknown method: {other}"))),
    }
}

fn authenticated(caller: Option<&CurrentUser>) -> Result<CurrentUser, AppError> {
    require_user(caller.cloned()).map_err(|e| AppError::Unauthorized(e.to_string()))
}

fn parse_params<T: DeserializeOwned>(params: Value) -> Result<T, AppError> {
    serde_json::from_value(params).map_err(|e| AppError::BadRequest(format!("Invalid params: {e}")))
}

fn optional_params<T: DeserializeOwned + Default>(params: Value) -> Result<T, AppError> {
    if params.is_null() {
        return Ok(T::default());
    }
    parse_params(params)
}

fn to_json<T: Serialize>(value: T) -> Result<Value, AppError> {
    serde_json::to_value(value).map_err(|e| AppError::Internal(e.to_string()))
}
