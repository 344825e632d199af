//! HTTP handlers for the users API

use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    error::{ErrorResponse, Result},
    handlers::JsonBody,
    ids::UserId,
    models::{CreateUserRequest, MessageResponse, UpdateUserRequest, User, UserMessageResponse},
    state::AppState,
};

/// List all users
#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    responses(
        (status = 200, description = "Every stored user, in insertion order", body = [User])
    )
)]
pub async fn list_users(State(state): State<AppState>) -> Json<Vec<User>> {
    let users = state.users().list().await;
    tracing::info!(count = users.len(), "Listing users");
    Json(users)
}

/// Get a user by ID
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "users",
    params(("id" = String, Path, description = "User id; leading digits are used")),
    responses(
        (status = 200, description = "The first user with this id", body = User),
        (status = 404, description = "No user has this id", body = ErrorResponse)
    )
)]
pub async fn get_user(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<User>> {
    let user_id = lookup_id(&id)?;
    tracing::info!("Getting user {}", user_id);

    let user = state.users().get(user_id).await?;
    Ok(Json(user))
}

/// Create a new user
#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    request_body(content = CreateUserRequest, description = "Both names are optional"),
    responses(
        (status = 200, description = "User appended to the collection", body = UserMessageResponse),
        (status = 400, description = "Body is not valid JSON", body = ErrorResponse)
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<CreateUserRequest>,
) -> Json<UserMessageResponse> {
    let user = state.users().create(request).await;
    tracing::info!("User created with ID: {}", user.id);

    Json(UserMessageResponse::created(user))
}

/// Update a user
///
/// Only the names present in the body are overwritten.
#[utoipa::path(
    put,
    path = "/users/{id}",
    tag = "users",
    params(("id" = String, Path, description = "User id; leading digits are used")),
    request_body(content = UpdateUserRequest, description = "Names to overwrite"),
    responses(
        (status = 200, description = "User updated", body = UserMessageResponse),
        (status = 400, description = "Body is not valid JSON", body = ErrorResponse),
        (status = 404, description = "No user has this id", body = ErrorResponse)
    )
)]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(request): JsonBody<UpdateUserRequest>,
) -> Result<Json<UserMessageResponse>> {
    let user_id = lookup_id(&id)?;
    tracing::info!("Updating user {}", user_id);

    if !request.has_updates() {
        tracing::debug!("Update for user {} names no fields", user_id);
    }

    let user = state.users().update(user_id, request).await?;
    Ok(Json(UserMessageResponse::updated(user)))
}

/// Delete a user
///
/// Always reports success, whether or not a record was removed.
#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "users",
    params(("id" = String, Path, description = "User id; leading digits are used")),
    responses(
        (status = 200, description = "Delete acknowledged", body = MessageResponse)
    )
)]
pub async fn delete_user(State(state): State<AppState>, Path(id): Path<String>) -> Json<MessageResponse> {
    match UserId::parse_lenient(&id) {
        Some(user_id) => {
            let removed = state.users().delete(user_id).await;
            tracing::info!(removed, "Deleted user {}", user_id);
        }
        None => tracing::info!("Delete for non-numeric id {:?} matched nothing", id),
    }

    Json(MessageResponse::deleted())
}

/// A segment that is not a number can never match a stored record
fn lookup_id(segment: &str) -> Result<UserId> {
    UserId::parse_lenient(segment).ok_or_else(|| {
        tracing::debug!("Path segment {:?} is not a user id", segment);
        crate::error::Error::user_not_found()
    })
}
