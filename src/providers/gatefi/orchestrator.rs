// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Ramp Operation Orchestrator
//!
//! [`RampService`] turns one logical [`Operation`] into provider calls.
//! Almost every operation is a single call. `getKycWidgetUrl` needs two,
//! strictly in sequence:
//!
//! ```text
//! Start -> AuthTokenRequested -> AuthTokenReceived -> WidgetUrlRequested -> Done
//! ```
//!
//! Any failing step ends the flow. A failed auth-token call means the widget
//! call is never made; a failed widget call drops the auth token, since
//! issuing it has no side effect to undo.

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};
use utoipa::ToSchema;

use super::{
    client::{HttpTransport, ProviderClient, Transport},
    error::RampError,
    request::{KycWidgetFlow, Operation, OperationKind, Plan},
};

/// Query parameter carrying the auth token on the merged widget URL.
pub const WIDGET_TOKEN_PARAM: &str = "ucToken";

/// Result of the KYC widget flow.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct KycWidgetUrl {
    /// Provider widget URL with the auth token appended as `ucToken`.
    pub kyc_url: String,
    /// KYC submission opened by the widget.
    #[serde(skip_serializing_if = "Value::is_null")]
    #[schema(value_type = String)]
    pub submission_id: Value,
}

#[derive(Debug)]
enum WidgetFlowState {
    Start,
    AuthTokenRequested,
    AuthTokenReceived { auth_token: String },
    WidgetUrlRequested { auth_token: String },
    Done(KycWidgetUrl),
}

impl WidgetFlowState {
    fn name(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::AuthTokenRequested => "auth_token_requested",
            Self::AuthTokenReceived { .. } => "auth_token_received",
            Self::WidgetUrlRequested { .. } => "widget_url_requested",
            Self::Done(_) => "done",
        }
    }
}

/// Executes ramp operations against the provider.
pub struct RampService<T = HttpTransport> {
    client: ProviderClient<T>,
}

impl<T: Transport> RampService<T> {
    pub fn new(client: ProviderClient<T>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ProviderClient<T> {
        &self.client
    }

    /// Validate, execute and merge one operation. The first error wins.
    pub async fn perform(&self, operation: Operation) -> Result<Value, RampError> {
        let kind = operation.kind();
        match operation.plan()? {
            Plan::Single(request) => self.client.execute(request).await,
            Plan::KycWidget(flow) => {
                let widget = self.kyc_widget_url(&flow).await?;
                serde_json::to_value(widget)
                    .map_err(|e| RampError::internal(kind.fallback_message(), e.to_string()))
            }
        }
    }

    /// Run the two-step widget flow to completion or to its first failure.
    pub async fn kyc_widget_url(&self, flow: &KycWidgetFlow) -> Result<KycWidgetUrl, RampError> {
        let mut state = WidgetFlowState::Start;
        loop {
            let stage = state.name();
            state = match self.advance(flow, state).await {
                Ok(WidgetFlowState::Done(widget)) => return Ok(widget),
                Ok(next) => next,
                Err(error) => {
                    warn!(
                        customer_id = %flow.customer_id,
                        stage,
                        error = %error,
                        "KYC widget flow failed"
                    );
                    return Err(error);
                }
            };
        }
    }

    async fn advance(
        &self,
        flow: &KycWidgetFlow,
        state: WidgetFlowState,
    ) -> Result<WidgetFlowState, RampError> {
        let next = match state {
            WidgetFlowState::Start => WidgetFlowState::AuthTokenRequested,
            WidgetFlowState::AuthTokenRequested => {
                let response = self.client.execute(flow.auth_token_request()).await?;
                let auth_token = required_str(&response, "authToken", OperationKind::GetAuthToken)?;
                WidgetFlowState::AuthTokenReceived { auth_token }
            }
            WidgetFlowState::AuthTokenReceived { auth_token } => {
                WidgetFlowState::WidgetUrlRequested { auth_token }
            }
            WidgetFlowState::WidgetUrlRequested { auth_token } => {
                let response = self.client.execute(flow.widget_url_request()).await?;
                let kyc_url = required_str(&response, "kycUrl", OperationKind::GetKycWidgetUrl)?;
                WidgetFlowState::Done(KycWidgetUrl {
                    kyc_url: append_widget_token(&kyc_url, &auth_token),
                    submission_id: response.get("submissionId").cloned().unwrap_or(Value::Null),
                })
            }
            done @ WidgetFlowState::Done(_) => done,
        };
        debug!(customer_id = %flow.customer_id, state = next.name(), "KYC widget flow advanced");
        Ok(next)
    }
}

/// Append the auth token to the widget URL as `ucToken`.
///
/// The provider's URL is kept byte for byte; the pair is inserted at the end
/// of the query, ahead of any `#fragment`.
pub fn append_widget_token(kyc_url: &str, auth_token: &str) -> String {
    let (base, fragment) = match kyc_url.split_once('#') {
        Some((base, fragment)) => (base, Some(fragment)),
        None => (kyc_url, None),
    };
    let separator = match base.find('?') {
        None => "?",
        Some(_) if base.ends_with(['?', '&']) => "",
        Some(_) => "&",
    };

    let mut merged = format!(
        "{base}{separator}{WIDGET_TOKEN_PARAM}={}",
        urlencoding::encode(auth_token)
    );
    if let Some(fragment) = fragment {
        merged.push('#');
        merged.push_str(fragment);
    }
    merged
}

fn required_str(body: &Value, field: &str, operation: OperationKind) -> Result<String, RampError> {
    body.get(field)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .ok_or_else(|| {
            RampError::internal(
                operation.fallback_message(),
                format!("{} response is missing `{field}`", operation.name()),
            )
        })
}
