use crate::dtos::{CreateUserRequest, UpdateUserRequest, UserResponse};
use crate::startup::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use axum_extra::extract::WithRejection;
use chrono::Utc;
use mongodb::bson::oid::ObjectId;
use service_core::error::AppError;
use service_core::response::ApiResponse;
use validator::Validate;

fn user_not_found() -> AppError {
    AppError::NotFound(anyhow::anyhow!("User not found"))
}

/// A malformed id is a store-level cast failure, not a missing user.
fn parse_user_id(id: &str) -> Result<ObjectId, AppError> {
    ObjectId::parse_str(id).map_err(|e| {
        AppError::DatabaseError(anyhow::anyhow!("Invalid user id '{}': {}", id, e))
    })
}

pub async fn create_user(
    State(state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<CreateUserRequest>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    let new_user = payload.into_new_user()?;

    let user = state.store.insert(new_user).await.map_err(|e| {
        tracing::warn!(error = %e, "Failed to create user");
        e
    })?;

    tracing::info!(user_id = %user.id, role = user.role.as_str(), "User created");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("User created successfully").with_data(UserResponse::from(user))),
    ))
}

pub async fn list_users(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let users = state.store.find_all().await.map_err(|e| {
        tracing::error!(error = %e, "Failed to list users");
        e
    })?;

    let count = users.len();
    let users: Vec<UserResponse> = users.into_iter().map(UserResponse::from).collect();

    Ok(Json(
        ApiResponse::success("Users retrieved successfully")
            .with_data(users)
            .with_count(count),
    ))
}

pub async fn get_user(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<String>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_user_id(&id)?;

    let user = state
        .store
        .find_by_id(&id)
        .await
        .map_err(|e| {
            tracing::error!(user_id = %id, error = %e, "Failed to fetch user");
            e
        })?
        .ok_or_else(user_not_found)?;

    Ok(Json(
        ApiResponse::success("User retrieved successfully").with_data(UserResponse::from(user)),
    ))
}

pub async fn update_user(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<String>, AppError>,
    WithRejection(Json(payload), _): WithRejection<Json<UpdateUserRequest>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_user_id(&id)?;
    let changes = payload.into_changes()?;

    let mut user = state
        .store
        .find_by_id(&id)
        .await?
        .ok_or_else(user_not_found)?;

    user.apply_changes(changes, Utc::now());
    user.validate()?;

    // Last write wins; the user may also have been deleted in between.
    let user = state
        .store
        .replace(&user)
        .await
        .map_err(|e| {
            tracing::warn!(user_id = %id, error = %e, "Failed to update user");
            e
        })?
        .ok_or_else(user_not_found)?;

    tracing::info!(user_id = %id, "User updated");

    Ok(Json(
        ApiResponse::success("User updated successfully").with_data(UserResponse::from(user)),
    ))
}

pub async fn delete_user(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<String>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_user_id(&id)?;

    let user = state
        .store
        .delete_by_id(&id)
        .await
        .map_err(|e| {
            tracing::error!(user_id = %id, error = %e, "Failed to delete user");
            e
        })?
        .ok_or_else(user_not_found)?;

    tracing::info!(user_id = %id, "User deleted");

    Ok(Json(
        ApiResponse::success("User deleted successfully").with_data(UserResponse::from(user)),
    ))
}
