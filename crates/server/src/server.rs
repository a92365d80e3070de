use axum::{
    Router, middleware,
    routing::{delete, get, post},
};

use std::sync::Arc;

use crate::{auth::auth, memberships, rates, transactions, user, wallets};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

/// Every route but `/signup` goes through Basic auth.
pub fn router(state: ServerState) -> Router {
    let protected = Router::new()
        .route("/profile", get(user::profile).delete(user::delete_profile))
        .route("/wallets", post(wallets::wallet_new))
        .route(
            "/wallets/{id}",
            get(wallets::wallet_get).delete(wallets::wallet_delete),
        )
        .route("/wallets/{id}/transactions", get(transactions::list))
        .route("/wallets/{id}/income", post(transactions::income_new))
        .route("/wallets/{id}/expense", post(transactions::expense_new))
        .route(
            "/wallets/{id}/members",
            get(memberships::list_members).post(memberships::add_member),
        )
        .route(
            "/wallets/{id}/members/{username}",
            delete(memberships::remove_member),
        )
        .route("/rates/{from}/{to}", get(rates::get_rate))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth));

    Router::new()
        .route("/signup", post(user::signup))
        .merge(protected)
        .with_state(state)
}

/// Serves the API on `listener` until the process stops.
///
/// The engine is shared so the caller can keep using it, e.g. for the
/// periodic rate refresh.
pub async fn run_with_listener(
    engine: Arc<Engine>,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(ServerState { engine })).await
}
