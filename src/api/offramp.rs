// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Offramp endpoints: payout accounts, transactions and history.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    Json,
};
use serde_json::Value;

use crate::{
    error::ApiError,
    providers::gatefi::{FiatAccountInput, OfframpListQuery, OfframpTransactionInput, Operation},
    state::AppState,
};

/// Register a fiat payout account for a customer.
#[utoipa::path(
    post,
    path = "/api/offramp",
    tag = "Offramp",
    request_body = FiatAccountInput,
    responses(
        (status = 200, description = "Provider fiat account"),
        (status = 400, description = "Missing fields or unsupported account type"),
        (status = 500, description = "Provider failure")
    )
)]
pub async fn add_fiat_account(
    State(state): State<AppState>,
    payload: Result<Json<FiatAccountInput>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(input) = payload?;
    let account = state.ramp.perform(Operation::AddFiatAccount(input)).await?;
    Ok(Json(account))
}

/// Start an offramp transaction against an accepted quote.
#[utoipa::path(
    post,
    path = "/api/transaction",
    tag = "Offramp",
    request_body = OfframpTransactionInput,
    responses(
        (status = 200, description = "Provider transaction"),
        (status = 400, description = "Missing fields"),
        (status = 500, description = "Provider failure")
    )
)]
pub async fn initiate_transaction(
    State(state): State<AppState>,
    payload: Result<Json<OfframpTransactionInput>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(input) = payload?;
    let transaction = state
        .ramp
        .perform(Operation::InitiateOfframpTransaction(input))
        .await?;
    Ok(Json(transaction))
}

/// Page through offramp transactions.
#[utoipa::path(
    get,
    path = "/api/offramp-data",
    tag = "Offramp",
    params(OfframpListQuery),
    responses(
        (status = 200, description = "Provider transaction page"),
        (status = 400, description = "Invalid paging parameters"),
        (status = 500, description = "Provider failure")
    )
)]
pub async fn list_transactions(
    State(state): State<AppState>,
    query: Result<Query<OfframpListQuery>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let Query(query) = query?;
    let page = state
        .ramp
        .perform(Operation::ListOfframpTransactions(query))
        .await?;
    Ok(Json(page))
}
