// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde_json::Value;

use crate::{
    error::ApiError,
    providers::gatefi::{Operation, QuoteInput},
    state::AppState,
};

/// Request an offramp quote.
///
/// Exactly one of `fromAmount` and `toAmount` must be given.
#[utoipa::path(
    post,
    path = "/api/quotes",
    tag = "Quotes",
    request_body = QuoteInput,
    responses(
        (status = 200, description = "Provider quote"),
        (status = 400, description = "Missing fields, both or neither amount, or bad metadata"),
        (status = 500, description = "Provider failure")
    )
)]
pub async fn create_quote(
    State(state): State<AppState>,
    payload: Result<Json<QuoteInput>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(input) = payload?;
    let quote = state.ramp.perform(Operation::CreateQuote(input)).await?;
    Ok(Json(quote))
}
