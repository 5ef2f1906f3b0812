//! Profile API endpoints

use api_types::profile::{
    MeResponse, MembershipUpdate, ProfileCreated, ProfileList, ProfileNew, ProfileUpdate,
    ProfileView, RoleUpdate,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::Principal;

use crate::{ServerError, server::ServerState, views};

/// The caller's own profile with the capabilities resolved for this request
pub async fn me(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
) -> Result<Json<MeResponse>, ServerError> {
    let profile = state
        .engine
        .profile(&principal, &principal.user_id)
        .await?;
    Ok(Json(MeResponse {
        profile: views::profile(profile),
        capabilities: views::capabilities(principal.capabilities),
    }))
}

pub async fn update_me(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Json(payload): Json<ProfileUpdate>,
) -> Result<Json<ProfileView>, ServerError> {
    let profile = state
        .engine
        .update_own_profile(
            &principal,
            engine::ProfileUpdate {
                name: payload.name,
                phone: payload.phone,
                profile_picture_url: payload.profile_picture_url,
            },
        )
        .await?;
    Ok(Json(views::profile(profile)))
}

pub async fn list(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
) -> Result<Json<ProfileList>, ServerError> {
    let profiles = state.engine.list_profiles(&principal).await?;
    Ok(Json(ProfileList {
        profiles: profiles.into_iter().map(views::profile).collect(),
    }))
}

/// Creates a profile together with its first access token
pub async fn profile_new(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Json(payload): Json<ProfileNew>,
) -> Result<(StatusCode, Json<ProfileCreated>), ServerError> {
    let profile = state
        .engine
        .register_profile(
            &principal,
            engine::NewProfile {
                id: payload.id,
                name: payload.name,
                email: payload.email,
                phone: payload.phone,
                role: views::role_from_wire(payload.role),
                active_until: payload.active_until.map(views::utc),
            },
        )
        .await?;
    let access_token = state.engine.issue_access_token(&profile.id).await?;

    Ok((
        StatusCode::CREATED,
        Json(ProfileCreated {
            profile: views::profile(profile),
            access_token,
        }),
    ))
}

pub async fn get(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<ProfileView>, ServerError> {
    let profile = state.engine.profile(&principal, &id).await?;
    Ok(Json(views::profile(profile)))
}

pub async fn remove(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_profile(&principal, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn set_role(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<RoleUpdate>,
) -> Result<Json<ProfileView>, ServerError> {
    let profile = state
        .engine
        .set_role(&principal, &id, views::role_from_wire(payload.role))
        .await?;
    Ok(Json(views::profile(profile)))
}

pub async fn set_membership(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<MembershipUpdate>,
) -> Result<Json<ProfileView>, ServerError> {
    let profile = state
        .engine
        .set_active_until(&principal, &id, payload.active_until.map(views::utc))
        .await?;
    Ok(Json(views::profile(profile)))
}
