//! Income, expense and history endpoints.
//!
//! Amounts arrive as numbers or decimal strings in the wallet currency and are
//! converted to minor units with that currency's decimal places before reaching
//! the ledger.

use api_types::transaction::{
    Amount, TransactionCreated, TransactionListResponse, TransactionNew, TransactionView,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{Money, NewTransaction, User, to_minor_units};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

async fn record(
    state: &ServerState,
    user: &User,
    wallet_id: Uuid,
    payload: TransactionNew,
    is_deposit: bool,
) -> Result<(StatusCode, Json<TransactionCreated>), ServerError> {
    let detail = state.engine.wallet(wallet_id, user.id).await?;
    let decimal_places = detail.currency.decimal_places;
    let amount_minor = match &payload.amount {
        Amount::Number(amount) => to_minor_units(*amount, decimal_places)?,
        Amount::Text(text) => Money::parse(text, decimal_places)?.minor(),
    };

    let tx = state
        .engine
        .record_transaction(NewTransaction {
            wallet_id,
            creator_id: user.id,
            amount_minor,
            is_deposit,
            category: payload.category.unwrap_or_default(),
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(TransactionCreated {
            id: tx.id,
            created_at: tx.created_at,
        }),
    ))
}

pub async fn income_new(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(wallet_id): Path<Uuid>,
    Json(payload): Json<TransactionNew>,
) -> Result<(StatusCode, Json<TransactionCreated>), ServerError> {
    record(&state, &user, wallet_id, payload, true).await
}

pub async fn expense_new(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(wallet_id): Path<Uuid>,
    Json(payload): Json<TransactionNew>,
) -> Result<(StatusCode, Json<TransactionCreated>), ServerError> {
    record(&state, &user, wallet_id, payload, false).await
}

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(wallet_id): Path<Uuid>,
) -> Result<Json<TransactionListResponse>, ServerError> {
    let detail = state.engine.wallet(wallet_id, user.id).await?;
    let decimal_places = detail.currency.decimal_places;

    let transactions = state
        .engine
        .list_transactions(wallet_id, user.id)
        .await?
        .into_iter()
        .map(|tx| TransactionView {
            id: tx.id,
            amount: Money::new(tx.signed_amount(), decimal_places).to_string(),
            amount_minor: tx.signed_amount(),
            is_deposit: tx.is_deposit,
            category: tx.category,
            creator_id: tx.creator_id,
            created_at: tx.created_at,
        })
        .collect();

    Ok(Json(TransactionListResponse { transactions }))
}
