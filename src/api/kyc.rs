// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! KYC onboarding endpoints.
//!
//! `POST /api/kyc` multiplexes four operations on the `action` field, as the
//! web client expects. The action set is closed: anything else is a 400.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use utoipa::ToSchema;

use crate::{
    error::ApiError,
    providers::gatefi::{
        CustomerInput, KycMetadataInput, KycRequirementsQuery, KycWidgetInput, Operation,
        SubmitKycInput,
    },
    state::AppState,
};

const KYC_ACTIONS: [&str; 4] = [
    "createCustomer",
    "addKycMetadata",
    "submitKycForReview",
    "getKycWidgetUrl",
];

/// Body of `POST /api/kyc`, tagged by `action`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum KycAction {
    /// Create a provider customer from `data`.
    CreateCustomer {
        #[serde(default)]
        data: Option<CustomerInput>,
    },
    /// Attach identity details to a customer.
    AddKycMetadata(KycMetadataInput),
    /// Submit a KYC submission for review.
    SubmitKycForReview(SubmitKycInput),
    /// Obtain a widget URL carrying a fresh auth token.
    GetKycWidgetUrl(KycWidgetInput),
}

impl KycAction {
    fn from_body(body: Value) -> Result<Self, ApiError> {
        let known = body
            .get("action")
            .and_then(Value::as_str)
            .is_some_and(|action| KYC_ACTIONS.contains(&action));
        if !known {
            return Err(ApiError::bad_request("Invalid action"));
        }

        serde_json::from_value(body)
            .map_err(|e| ApiError::bad_request(format!("Invalid request body: {e}")))
    }
}

impl From<KycAction> for Operation {
    fn from(action: KycAction) -> Self {
        match action {
            KycAction::CreateCustomer { data } => {
                Operation::CreateCustomer(data.unwrap_or_default())
            }
            KycAction::AddKycMetadata(input) => Operation::AddKycMetadata(input),
            KycAction::SubmitKycForReview(input) => Operation::SubmitKycForReview(input),
            KycAction::GetKycWidgetUrl(input) => Operation::GetKycWidgetUrl(input),
        }
    }
}

/// KYC requirements for a country.
#[utoipa::path(
    get,
    path = "/api/kyc",
    tag = "KYC",
    params(KycRequirementsQuery),
    responses(
        (status = 200, description = "Provider KYC requirements"),
        (status = 400, description = "Missing country"),
        (status = 500, description = "Provider failure")
    )
)]
pub async fn kyc_requirements(
    State(state): State<AppState>,
    query: Result<Query<KycRequirementsQuery>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let Query(query) = query?;
    let body = state
        .ramp
        .perform(Operation::GetKycRequirements(query))
        .await?;
    Ok(Json(body))
}

/// Run one KYC action.
///
/// `getKycWidgetUrl` performs two provider calls and answers with
/// [`KycWidgetUrl`](crate::providers::gatefi::KycWidgetUrl); the other actions
/// return the provider body unchanged.
#[utoipa::path(
    post,
    path = "/api/kyc",
    tag = "KYC",
    request_body = KycAction,
    responses(
        (status = 200, description = "Provider response, or the merged widget URL"),
        (status = 400, description = "Invalid action or missing fields"),
        (status = 500, description = "Provider failure")
    )
)]
pub async fn kyc_action(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(body) = payload?;
    let action = KycAction::from_body(body)?;
    let result = state.ramp.perform(action.into()).await?;
    Ok(Json(result))
}
