use api_types::rates::RateView;
use axum::{
    Json,
    extract::{Path, State},
};
use engine::normalize_code;

use crate::{ServerError, server::ServerState};

pub async fn get_rate(
    State(state): State<ServerState>,
    Path((from, to)): Path<(String, String)>,
) -> Result<Json<RateView>, ServerError> {
    let rate = state.engine.exchange_rate(&from, &to).await?;
    Ok(Json(RateView {
        from: normalize_code(&from)?,
        to: normalize_code(&to)?,
        rate,
    }))
}
