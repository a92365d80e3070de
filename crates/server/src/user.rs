//! Sign-up and profile endpoints.

use api_types::user::{Profile, ProfileWallet, SignUp, UserCreated};
use axum::{Extension, Json, extract::State, http::StatusCode};
use engine::{NewUser, User};

use crate::{ServerError, auth::hash_password, memberships::api_role, server::ServerState};

pub async fn signup(
    State(state): State<ServerState>,
    Json(payload): Json<SignUp>,
) -> Result<(StatusCode, Json<UserCreated>), ServerError> {
    let password_hash = hash_password(&payload.password)?;
    let user = state
        .engine
        .create_user(NewUser {
            username: payload.username,
            password_hash,
            base_currency: payload.base_currency,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(UserCreated { id: user.id })))
}

/// The caller's profile with every wallet they belong to.
pub async fn profile(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<Profile>, ServerError> {
    let wallets = state
        .engine
        .user_wallets(user.id)
        .await?
        .into_iter()
        .map(|entry| ProfileWallet {
            id: entry.wallet.id,
            name: entry.wallet.name,
            currency: entry.wallet.currency,
            role: api_role(entry.role),
            balance: entry.balance.to_string(),
            converted_balance: entry.converted.map(|money| money.to_string()),
        })
        .collect();

    Ok(Json(Profile {
        id: user.id,
        username: user.username,
        base_currency: user.base_currency,
        created_at: user.created_at,
        wallets,
    }))
}

pub async fn delete_profile(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_user(user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
