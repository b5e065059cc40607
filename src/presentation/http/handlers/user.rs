//! User and Follow Graph Handlers

use axum::{
    extract::{Path, State},
    Json,
};

use crate::application::dto::response::{CurrentUserResponse, FollowListResponse, UserResponse};
use crate::presentation::http::extractors::{AuthUser, MaybeUser};
use crate::shared::error::AppError;
use crate::startup::AppState;

/// List every user. Email is shown only on the caller's own entry.
pub async fn list_users(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    let viewer_id = viewer.map(|v| v.id);
    let users = state.graph.list_all().await?;

    Ok(Json(
        users
            .into_iter()
            .map(|u| {
                let is_self = Some(u.id) == viewer_id;
                UserResponse::from_user(u, is_self)
            })
            .collect(),
    ))
}

/// Get the current user
pub async fn get_current_user(AuthUser(user): AuthUser) -> Json<CurrentUserResponse> {
    Json(user.into())
}

/// Users following the caller
pub async fn get_my_followers(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<FollowListResponse>, AppError> {
    let list = state.graph.followers_of(user.id).await?;
    Ok(Json(list.into()))
}

/// Users the caller follows
pub async fn get_my_following(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<FollowListResponse>, AppError> {
    let list = state.graph.following_of(user.id).await?;
    Ok(Json(list.into()))
}

/// Follow a user. Following someone already followed is a no-op.
pub async fn follow_user(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(username): Path<String>,
) -> Result<Json<UserResponse>, AppError> {
    let actor = state.graph.follow(user.id, &username).await?;
    Ok(Json(UserResponse::from_user(actor, true)))
}

/// Unfollow a user. Unfollowing someone not followed is a no-op.
pub async fn unfollow_user(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(username): Path<String>,
) -> Result<Json<UserResponse>, AppError> {
    let actor = state.graph.unfollow(user.id, &username).await?;
    Ok(Json(UserResponse::from_user(actor, true)))
}

/// Followers of any user, by username
pub async fn get_user_followers(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<FollowListResponse>, AppError> {
    let list = state.graph.followers_of_username(&username).await?;
    Ok(Json(list.into()))
}

/// Followees of any user, by username
pub async fn get_user_following(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<FollowListResponse>, AppError> {
    let list = state.graph.following_of_username(&username).await?;
    Ok(Json(list.into()))
}
