//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};

use crate::{
    domain::RoomId,
    infrastructure::dto::http::{
        HistoryEntryDto, LoginRequest, LoginResponse, RoomDetailDto, RoomSummaryDto,
    },
    ui::state::AppState,
    usecase::{LoginError, LoginOutcome, RoomQueryError},
};

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Get list of rooms that currently have members
pub async fn get_rooms(State(state): State<Arc<AppState>>) -> Json<Vec<RoomSummaryDto>> {
    let rooms = state.get_rooms_usecase.execute().await;

    // Domain Model から DTO への変換
    Json(rooms.into_iter().map(RoomSummaryDto::from).collect())
}

/// Get room detail by ID
pub async fn get_room_detail(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Result<Json<RoomDetailDto>, StatusCode> {
    let room_id = RoomId::new(room_id).map_err(|_| StatusCode::NOT_FOUND)?;

    match state.get_room_detail_usecase.execute(room_id.clone()).await {
        Ok(members) => Ok(Json(RoomDetailDto::from((room_id, members)))),
        Err(RoomQueryError::RoomNotFound(_)) => Err(StatusCode::NOT_FOUND),
        Err(RoomQueryError::Persistence(e)) => {
            tracing::warn!("Failed to load room '{}': {}", room_id, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Get the recorded chat history of a room (oldest first)
pub async fn get_room_history(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Result<Json<Vec<HistoryEntryDto>>, StatusCode> {
    let room_id = RoomId::new(room_id).map_err(|_| StatusCode::NOT_FOUND)?;

    match state.get_room_history_usecase.execute(&room_id).await {
        Ok(history) => Ok(Json(history.into_iter().map(HistoryEntryDto::from).collect())),
        Err(e) => {
            tracing::warn!("Failed to load history of room '{}': {}", room_id, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Log in, creating the account on first use
pub async fn login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> (StatusCode, Json<LoginResponse>) {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            tracing::warn!("Rejected login request: {}", rejection.body_text());
            return (
                StatusCode::BAD_REQUEST,
                Json(LoginResponse::failed("Invalid request body")),
            );
        }
    };

    match state
        .login_usecase
        .execute(&request.username, &request.password)
        .await
    {
        Ok(LoginOutcome::Created) => {
            tracing::info!("Created account '{}'", request.username);
            (StatusCode::OK, Json(LoginResponse::ok()))
        }
        Ok(LoginOutcome::LoggedIn) => (StatusCode::OK, Json(LoginResponse::ok())),
        Err(LoginError::InvalidUsername) => (
            StatusCode::BAD_REQUEST,
            Json(LoginResponse::failed("Invalid username format")),
        ),
        Err(LoginError::IncorrectPassword) => (
            StatusCode::UNAUTHORIZED,
            Json(LoginResponse::failed("Incorrect password")),
        ),
        Err(LoginError::Store(e)) => {
            tracing::warn!("Login failed for '{}': {}", request.username, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(LoginResponse::failed("Internal server error")),
            )
        }
    }
}
