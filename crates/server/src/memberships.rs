//! Wallet membership endpoints. Listing is open to members, changes are admin-only.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::User;
use uuid::Uuid;

use api_types::membership::{MemberNew, MemberView, MembersResponse, WalletRole};

use crate::{ServerError, server::ServerState};

pub(crate) fn api_role(role: engine::WalletRole) -> WalletRole {
    match role {
        engine::WalletRole::Admin => WalletRole::Admin,
        engine::WalletRole::User => WalletRole::User,
        engine::WalletRole::Spectator => WalletRole::Spectator,
    }
}

fn engine_role(role: WalletRole) -> engine::WalletRole {
    match role {
        WalletRole::Admin => engine::WalletRole::Admin,
        WalletRole::User => engine::WalletRole::User,
        WalletRole::Spectator => engine::WalletRole::Spectator,
    }
}

pub async fn list_members(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(wallet_id): Path<Uuid>,
) -> Result<Json<MembersResponse>, ServerError> {
    let members = state
        .engine
        .list_members(wallet_id, user.id)
        .await?
        .into_iter()
        .map(|member| MemberView {
            username: member.username,
            role: api_role(member.role),
        })
        .collect();

    Ok(Json(MembersResponse { members }))
}

pub async fn add_member(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(wallet_id): Path<Uuid>,
    Json(payload): Json<MemberNew>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .add_member(
            wallet_id,
            user.id,
            &payload.username,
            engine_role(payload.role),
        )
        .await?;
    Ok(StatusCode::CREATED)
}

pub async fn remove_member(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path((wallet_id, username)): Path<(Uuid, String)>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .remove_member(wallet_id, user.id, &username)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
