//! Announcement API endpoints

use api_types::announcement::{
    AnnouncementActive, AnnouncementList, AnnouncementNew, AnnouncementUpdate, AnnouncementView,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::Principal;

use crate::{ServerError, server::ServerState, views};

/// Active announcements for the landing page, no credential needed
pub async fn list_public(
    State(state): State<ServerState>,
) -> Result<Json<AnnouncementList>, ServerError> {
    let announcements = state.engine.announcements(None).await?;
    Ok(Json(AnnouncementList {
        announcements: announcements.into_iter().map(views::announcement).collect(),
    }))
}

/// Admins get every announcement, members only the active ones
pub async fn list(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
) -> Result<Json<AnnouncementList>, ServerError> {
    let announcements = state.engine.announcements(Some(&principal)).await?;
    Ok(Json(AnnouncementList {
        announcements: announcements.into_iter().map(views::announcement).collect(),
    }))
}

pub async fn announcement_new(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Json(payload): Json<AnnouncementNew>,
) -> Result<(StatusCode, Json<AnnouncementView>), ServerError> {
    let announcement = state
        .engine
        .create_announcement(&principal, &payload.message, payload.is_active)
        .await?;
    Ok((StatusCode::CREATED, Json(views::announcement(announcement))))
}

pub async fn update(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<AnnouncementUpdate>,
) -> Result<Json<AnnouncementView>, ServerError> {
    let announcement = state
        .engine
        .update_announcement(&principal, id, &payload.message)
        .await?;
    Ok(Json(views::announcement(announcement)))
}

pub async fn set_active(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<AnnouncementActive>,
) -> Result<Json<AnnouncementView>, ServerError> {
    let announcement = state
        .engine
        .set_announcement_active(&principal, id, payload.is_active)
        .await?;
    Ok(Json(views::announcement(announcement)))
}

pub async fn remove(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_announcement(&principal, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
