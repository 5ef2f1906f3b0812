//! Membership inquiry and contact message endpoints

use api_types::{
    contact::{ContactList, ContactNew, ContactView},
    inquiry::{InquiryList, InquiryNew, InquiryView},
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{NewInquiry, Principal};

use crate::{ServerError, server::ServerState, views};

/// Public membership form
pub async fn inquiry_new(
    State(state): State<ServerState>,
    Json(payload): Json<InquiryNew>,
) -> Result<(StatusCode, Json<InquiryView>), ServerError> {
    let inquiry = state
        .engine
        .submit_membership_inquiry(NewInquiry {
            name: payload.name,
            email: payload.email,
            phone: payload.phone,
            message: payload.message,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(views::inquiry(inquiry))))
}

pub async fn list(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
) -> Result<Json<InquiryList>, ServerError> {
    let inquiries = state.engine.membership_inquiries(&principal).await?;
    Ok(Json(InquiryList {
        inquiries: inquiries.into_iter().map(views::inquiry).collect(),
    }))
}

pub async fn remove(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_membership_inquiry(&principal, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn contact_new(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Json(payload): Json<ContactNew>,
) -> Result<(StatusCode, Json<ContactView>), ServerError> {
    let message = state
        .engine
        .submit_contact_message(
            &principal,
            &payload.subject,
            &payload.message,
            payload.attachment_url.as_deref(),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(views::contact(message))))
}

pub async fn contact_list(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
) -> Result<Json<ContactList>, ServerError> {
    let messages = state.engine.contact_messages(&principal).await?;
    Ok(Json(ContactList {
        messages: messages.into_iter().map(views::contact).collect(),
    }))
}

pub async fn contact_remove(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_contact_message(&principal, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
