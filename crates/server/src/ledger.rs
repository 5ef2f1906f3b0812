//! Balance and ledger API endpoints

use api_types::ledger::{
    BalanceAdjust, BalanceList, BalanceView, GuestFeeNew, LedgerEntryView, LedgerList,
    PaymentNew,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{MoneyCents, Principal};

use crate::{ServerError, server::ServerState, views};

pub async fn balance(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Path(user_id): Path<String>,
) -> Result<Json<BalanceView>, ServerError> {
    let balance = state.engine.balance(&principal, &user_id).await?;
    Ok(Json(views::balance(balance)))
}

/// Every member with an outstanding balance
pub async fn all_balances(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
) -> Result<Json<BalanceList>, ServerError> {
    let balances = state.engine.all_balances(&principal).await?;
    Ok(Json(BalanceList {
        balances: balances.into_iter().map(views::balance).collect(),
    }))
}

pub async fn entries(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Path(user_id): Path<String>,
) -> Result<Json<LedgerList>, ServerError> {
    let entries = state.engine.ledger(&principal, &user_id).await?;
    Ok(Json(LedgerList {
        entries: entries.into_iter().map(views::ledger_entry).collect(),
    }))
}

pub async fn guest_fees(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Path(user_id): Path<String>,
) -> Result<Json<LedgerList>, ServerError> {
    let entries = state.engine.guest_fees(&principal, &user_id).await?;
    Ok(Json(LedgerList {
        entries: entries.into_iter().map(views::ledger_entry).collect(),
    }))
}

/// Charges a guest fee on a booking. `{}` charges the default fee to the
/// booking owner.
pub async fn guest_fee_new(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Path(booking_id): Path<i64>,
    Json(payload): Json<GuestFeeNew>,
) -> Result<(StatusCode, Json<LedgerEntryView>), ServerError> {
    let entry = state
        .engine
        .assess_guest_fee(
            &principal,
            booking_id,
            payload.user_id.as_deref(),
            payload.amount_minor.map(MoneyCents::new),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(views::ledger_entry(entry))))
}

pub async fn payment_new(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Path(user_id): Path<String>,
    Json(payload): Json<PaymentNew>,
) -> Result<(StatusCode, Json<LedgerEntryView>), ServerError> {
    let entry = state
        .engine
        .record_payment(&principal, &user_id, MoneyCents::new(payload.amount_minor))
        .await?;
    Ok((StatusCode::CREATED, Json(views::ledger_entry(entry))))
}

/// Brings a member's balance to an exact target
pub async fn adjust(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Path(user_id): Path<String>,
    Json(payload): Json<BalanceAdjust>,
) -> Result<(StatusCode, Json<LedgerEntryView>), ServerError> {
    let entry = state
        .engine
        .adjust_balance_to(
            &principal,
            &user_id,
            MoneyCents::new(payload.target_minor),
            &payload.reason,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(views::ledger_entry(entry))))
}

pub async fn remove_entry(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<Json<LedgerEntryView>, ServerError> {
    let entry = state.engine.delete_ledger_entry(&principal, id).await?;
    Ok(Json(views::ledger_entry(entry)))
}
