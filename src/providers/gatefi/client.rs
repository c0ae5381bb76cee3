// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! GateFi provider client.
//!
//! [`ProviderClient`] signs a [`ProviderRequest`], hands it to a
//! [`Transport`] and interprets the answer. The provider sends JSON bodies on
//! failure too, so the body is always parsed before the status is checked.
//! Every remote call is attempted exactly once.

use std::{future::Future, time::Duration};

use reqwest::{Client, Method};
use serde_json::Value;
use tracing::{error, info, warn};
use url::Url;

use super::{
    error::{RampError, TransportError},
    request::{OperationKind, ProviderRequest},
    signer::Signer,
};

pub const API_KEY_HEADER: &str = "api-key";
pub const SIGNATURE_HEADER: &str = "signature";

/// A provider call ready to be sent.
#[derive(Debug, Clone, PartialEq)]
pub struct SignedRequest {
    pub operation: OperationKind,
    pub method: Method,
    /// Path only. This is exactly what was signed.
    pub path: String,
    /// Appended to the URL after signing.
    pub query: Vec<(&'static str, String)>,
    pub signature: String,
    pub headers: Vec<(&'static str, String)>,
    pub body: Option<Value>,
}

/// Status and raw body of a provider answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Moves a signed request to the provider and returns its raw answer.
pub trait Transport: Send + Sync {
    fn send(
        &self,
        request: &SignedRequest,
    ) -> impl Future<Output = Result<RawResponse, TransportError>> + Send;
}

/// HTTPS transport backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    base_url: String,
    http: Client,
}

impl HttpTransport {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, TransportError> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        Url::parse(&base_url).map_err(|e| TransportError::InvalidUrl(format!("{base_url}: {e}")))?;

        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Request(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { base_url, http })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request_url(&self, request: &SignedRequest) -> Result<Url, TransportError> {
        let raw = format!("{}{}", self.base_url, request.path);
        let mut url = Url::parse(&raw).map_err(|e| TransportError::InvalidUrl(format!("{raw}: {e}")))?;
        // The signature covers `request.path`; parsing must not rewrite it.
        if !url.path().ends_with(request.path.as_str()) {
            return Err(TransportError::InvalidUrl(format!(
                "{raw}: path normalized to {}",
                url.path()
            )));
        }
        if !request.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &request.query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }
}

impl Transport for HttpTransport {
    async fn send(&self, request: &SignedRequest) -> Result<RawResponse, TransportError> {
        let url = self.request_url(request)?;

        let mut builder = self.http.request(request.method.clone(), url);
        for (name, value) in &request.headers {
            builder = builder.header(*name, value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.to_string());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::Request(format!("{} {} failed: {e}", request.method, request.path)))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::Body(e.to_string()))?;

        Ok(RawResponse {
            status,
            body: body.to_vec(),
        })
    }
}

/// Signs and executes provider calls.
pub struct ProviderClient<T = HttpTransport> {
    signer: Signer,
    api_key: String,
    transport: T,
}

impl<T: Transport> ProviderClient<T> {
    pub fn new(signer: Signer, api_key: impl Into<String>, transport: T) -> Self {
        Self {
            signer,
            api_key: api_key.into(),
            transport,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Attach the signature and auth headers. The query string and body stay
    /// out of the signed material.
    pub fn sign(&self, request: ProviderRequest) -> SignedRequest {
        let signature = self.signer.sign(&request.method, &request.path);

        let mut headers = vec![
            (API_KEY_HEADER, self.api_key.clone()),
            (SIGNATURE_HEADER, signature.clone()),
        ];
        if request.body.is_some() {
            headers.push(("Content-Type", "application/json".to_string()));
        }

        SignedRequest {
            operation: request.operation,
            method: request.method,
            path: request.path,
            query: request.query,
            signature,
            headers,
            body: request.body,
        }
    }

    /// Execute one provider call and return its JSON body.
    pub async fn execute(&self, request: ProviderRequest) -> Result<Value, RampError> {
        let signed = self.sign(request);
        let operation = signed.operation;

        info!(
            operation = operation.name(),
            method = %signed.method,
            path = %signed.path,
            "GateFi request"
        );

        let response = self.transport.send(&signed).await.map_err(|e| {
            error!(
                operation = operation.name(),
                path = %signed.path,
                error = %e,
                "GateFi transport failure"
            );
            RampError::internal(operation.fallback_message(), e.to_string())
        })?;

        interpret_response(operation, response)
    }
}

/// Turn a raw provider answer into the JSON body or a [`RampError`].
pub fn interpret_response(
    operation: OperationKind,
    response: RawResponse,
) -> Result<Value, RampError> {
    let parsed = serde_json::from_slice::<Value>(&response.body);

    if !(200..300).contains(&response.status) {
        let message = parsed
            .as_ref()
            .ok()
            .and_then(provider_error_message)
            .unwrap_or_else(|| operation.fallback_message().to_string());
        warn!(
            operation = operation.name(),
            status = response.status,
            message = %message,
            "GateFi returned an error"
        );
        return Err(RampError::Provider {
            message,
            status: response.status,
        });
    }

    match parsed {
        Ok(value) => Ok(value),
        Err(_) if response.body.iter().all(u8::is_ascii_whitespace) => {
            Ok(Value::Object(Default::default()))
        }
        Err(e) => Err(RampError::internal(
            operation.fallback_message(),
            format!("{} returned invalid JSON: {e}", operation.name()),
        )),
    }
}

/// The provider reports errors in `message`, some endpoints in `error`.
fn provider_error_message(body: &Value) -> Option<String> {
    ["message", "error"]
        .iter()
        .filter_map(|field| body.get(*field).and_then(Value::as_str))
        .map(str::trim)
        .find(|message| !message.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::providers::gatefi::request::{BuildRequest, SubmitKycInput};

    fn raw(status: u16, body: &str) -> RawResponse {
        RawResponse {
            status,
            body: body.as_bytes().to_vec(),
        }
    }

    fn quote_request() -> ProviderRequest {
        ProviderRequest {
            operation: OperationKind::CreateQuote,
            method: Method::POST,
            path: "/v1/external/quotes".to_string(),
            query: Vec::new(),
            body: Some(json!({"fromAmount": "10"})),
        }
    }

    struct NoopTransport;

    impl Transport for NoopTransport {
        async fn send(&self, _request: &SignedRequest) -> Result<RawResponse, TransportError> {
            Ok(raw(200, "{}"))
        }
    }

    fn client() -> ProviderClient<NoopTransport> {
        ProviderClient::new(Signer::new("test-secret"), "key-1", NoopTransport)
    }

    #[test]
    fn sign_sets_auth_headers_and_content_type_for_bodies() {
        let signed = client().sign(quote_request());
        assert_eq!(
            signed.signature,
            "cee4c19c766879c571a41846caf7333b5d495611ce33a0672db2fa46f37407b0"
        );
        assert_eq!(
            signed.headers,
            vec![
                (API_KEY_HEADER, "key-1".to_string()),
                (SIGNATURE_HEADER, signed.signature.clone()),
                ("Content-Type", "application/json".to_string()),
            ]
        );
    }

    #[test]
    fn sign_ignores_query_and_omits_content_type_without_body() {
        let request = ProviderRequest {
            operation: OperationKind::GetAuthToken,
            method: Method::POST,
            path: "/v1/external/auth-token".to_string(),
            query: vec![("customerId", "cust-1".to_string())],
            body: None,
        };
        let signed = client().sign(request);
        assert_eq!(
            signed.signature,
            "ab485739bfd8ff0675654f642d1b9cf16d474a1bf8afcc823d513a5fbbe3ddb0"
        );
        assert!(signed.headers.iter().all(|(name, _)| *name != "Content-Type"));
        assert_eq!(signed.query, vec![("customerId", "cust-1".to_string())]);
    }

    #[test]
    fn success_returns_parsed_body() {
        let value = interpret_response(OperationKind::CreateQuote, raw(200, r#"{"quoteId":"q"}"#))
            .expect("success");
        assert_eq!(value, json!({"quoteId": "q"}));
    }

    #[test]
    fn empty_success_body_becomes_empty_object() {
        let value = interpret_response(OperationKind::SubmitKycForReview, raw(204, ""))
            .expect("success");
        assert_eq!(value, json!({}));
    }

    #[test]
    fn malformed_success_body_is_internal() {
        let error = interpret_response(OperationKind::CreateQuote, raw(200, "<html>"))
            .expect_err("invalid JSON");
        match error {
            RampError::Internal { message, detail } => {
                assert_eq!(message, "Failed to create quote");
                assert!(detail.contains("invalid JSON"));
            }
            other => panic!("expected internal error, got {other:?}"),
        }
    }

    #[test]
    fn provider_message_and_status_are_kept() {
        let error = interpret_response(
            OperationKind::CreateQuote,
            raw(422, r#"{"message":"bad input"}"#),
        )
        .expect_err("provider failure");
        match error {
            RampError::Provider { message, status } => {
                assert_eq!(message, "bad input");
                assert_eq!(status, 422);
            }
            other => panic!("expected provider error, got {other:?}"),
        }
    }

    #[test]
    fn provider_error_field_is_used_when_message_is_missing() {
        let error = interpret_response(
            OperationKind::InitiateOfframpTransaction,
            raw(400, r#"{"error":"quote expired"}"#),
        )
        .expect_err("provider failure");
        assert_eq!(error.to_string(), "quote expired");
    }

    #[test]
    fn fallback_message_when_provider_body_is_not_json() {
        let error = interpret_response(OperationKind::AddFiatAccount, raw(502, "Bad Gateway"))
            .expect_err("provider failure");
        match error {
            RampError::Provider { message, status } => {
                assert_eq!(message, "Failed to add fiat account");
                assert_eq!(status, 502);
            }
            other => panic!("expected provider error, got {other:?}"),
        }
    }

    #[test]
    fn transport_builds_url_with_query_after_path() {
        let transport =
            HttpTransport::new("https://api-sandbox.gatefi.com/", Duration::from_secs(5))
                .expect("valid base URL");
        let signed = client().sign(ProviderRequest {
            operation: OperationKind::ListOfframpTransactions,
            method: Method::GET,
            path: "/v1/external/offramp".to_string(),
            query: vec![
                ("pageSize", "20".to_string()),
                ("pageOffset", "0".to_string()),
            ],
            body: None,
        });
        let url = transport.request_url(&signed).expect("url");
        assert_eq!(
            url.as_str(),
            "https://api-sandbox.gatefi.com/v1/external/offramp?pageSize=20&pageOffset=0"
        );
    }

    #[test]
    fn transport_sends_exactly_the_signed_path() {
        let transport =
            HttpTransport::new("https://api-sandbox.gatefi.com", Duration::from_secs(5))
                .expect("valid base URL");
        let submit = SubmitKycInput {
            customer_id: Some("cust 1/..".to_string()),
            submission_id: Some("...".to_string()),
        }
        .build()
        .expect("valid submit");
        let signed = client().sign(submit);
        let url = transport.request_url(&signed).expect("url");
        assert_eq!(url.path(), signed.path);
        assert_eq!(url.path(), "/v1/external/customers/cust%201%2F../kyc/.../submit");

        let dotted = client().sign(ProviderRequest {
            operation: OperationKind::SubmitKycForReview,
            method: Method::POST,
            path: "/v1/external/customers/../kyc/S/submit".to_string(),
            query: Vec::new(),
            body: None,
        });
        assert!(matches!(
            transport.request_url(&dotted),
            Err(TransportError::InvalidUrl(_))
        ));
    }

    #[test]
    fn transport_rejects_invalid_base_url() {
        assert!(matches!(
            HttpTransport::new("not a url", Duration::from_secs(5)),
            Err(TransportError::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn execute_passes_successful_body_through() {
        let value = client().execute(quote_request()).await.expect("success");
        assert_eq!(value, json!({}));
    }
}
