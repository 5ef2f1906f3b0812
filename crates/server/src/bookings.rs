//! Booking API endpoints

use api_types::booking::{BookingCancelled, BookingList, BookingNew, BookingQuery, BookingView};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{BookingFilter, Principal};

use crate::{ServerError, server::ServerState, views};

/// Handle requests for reserving a simulator slot
pub async fn booking_new(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Json(payload): Json<BookingNew>,
) -> Result<(StatusCode, Json<BookingView>), ServerError> {
    let booking = state
        .engine
        .create_booking(
            &principal,
            views::simulator_from_wire(payload.simulator),
            views::utc(payload.start_time),
            payload.user_id.as_deref(),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(views::booking(booking))))
}

/// Calendar listing
pub async fn list(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Query(query): Query<BookingQuery>,
) -> Result<Json<BookingList>, ServerError> {
    let filter = BookingFilter {
        from: query.from.map(views::utc),
        to: query.to.map(views::utc),
        simulator: query.simulator.map(views::simulator_from_wire),
        user_id: query.user_id,
    };
    let bookings = state.engine.list_bookings(&principal, &filter).await?;
    Ok(Json(BookingList {
        bookings: bookings.into_iter().map(views::booking).collect(),
    }))
}

pub async fn get(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<Json<BookingView>, ServerError> {
    let booking = state.engine.booking(&principal, id).await?;
    Ok(Json(views::booking(booking)))
}

/// Cancels a booking and drops the guest fees charged on it
pub async fn cancel(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<Json<BookingCancelled>, ServerError> {
    let cancelled = state.engine.cancel_booking(&principal, id).await?;
    Ok(Json(BookingCancelled {
        booking_id: cancelled.booking_id,
        deleted_guest_fees: cancelled.deleted_guest_fees,
    }))
}
