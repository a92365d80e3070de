//! Wallets API endpoints.

use api_types::wallet::{WalletCreated, WalletNew, WalletView};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::User;
use uuid::Uuid;

use crate::{ServerError, memberships::api_role, server::ServerState};

pub async fn wallet_new(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<WalletNew>,
) -> Result<(StatusCode, Json<WalletCreated>), ServerError> {
    let wallet = state
        .engine
        .create_wallet(&payload.name, &payload.currency, user.id)
        .await?;

    Ok((StatusCode::CREATED, Json(WalletCreated { id: wallet.id })))
}

pub async fn wallet_get(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(wallet_id): Path<Uuid>,
) -> Result<Json<WalletView>, ServerError> {
    let detail = state.engine.wallet(wallet_id, user.id).await?;

    Ok(Json(WalletView {
        id: detail.wallet.id,
        name: detail.wallet.name,
        currency: detail.wallet.currency,
        role: api_role(detail.role),
        balance: detail.balance.to_string(),
        balance_minor: detail.balance.minor(),
        last_snapshot: detail.wallet.last_snapshot,
        created_at: detail.wallet.created_at,
    }))
}

pub async fn wallet_delete(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(wallet_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_wallet(wallet_id, user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
