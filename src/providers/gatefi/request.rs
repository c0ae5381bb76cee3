// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Provider request construction.
//!
//! Each logical ramp [`Operation`] carries its own typed input. Building an
//! operation validates and normalizes that input and yields the exact
//! provider path, query and body. Nothing here performs I/O; a rejected
//! input never reaches the network.

use reqwest::Method;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use utoipa::{IntoParams, ToSchema};

use super::error::RampError;

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const DEFAULT_PAGE_OFFSET: u32 = 0;

/// Identifies a single provider call, for logging and fallback messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    GetKycRequirements,
    CreateCustomer,
    AddKycMetadata,
    SubmitKycForReview,
    GetAuthToken,
    GetKycWidgetUrl,
    CreateQuote,
    AddFiatAccount,
    InitiateOfframpTransaction,
    ListOfframpTransactions,
}

impl OperationKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::GetKycRequirements => "getKycRequirements",
            Self::CreateCustomer => "createCustomer",
            Self::AddKycMetadata => "addKycMetadata",
            Self::SubmitKycForReview => "submitKycForReview",
            Self::GetAuthToken => "getAuthToken",
            Self::GetKycWidgetUrl => "getKycWidgetUrl",
            Self::CreateQuote => "createQuote",
            Self::AddFiatAccount => "addFiatAccount",
            Self::InitiateOfframpTransaction => "initiateOfframpTransaction",
            Self::ListOfframpTransactions => "listOfframpTransactions",
        }
    }

    /// Message reported when the provider fails without one of its own.
    pub fn fallback_message(self) -> &'static str {
        match self {
            Self::GetKycRequirements => "Failed to fetch KYC requirements",
            Self::CreateCustomer => "Failed to create customer",
            Self::AddKycMetadata => "Failed to add KYC metadata",
            Self::SubmitKycForReview => "Failed to submit KYC for review",
            Self::GetAuthToken => "Failed to get auth token",
            Self::GetKycWidgetUrl => "Failed to get KYC widget URL",
            Self::CreateQuote => "Failed to create quote",
            Self::AddFiatAccount => "Failed to add fiat account",
            Self::InitiateOfframpTransaction => "Failed to initiate offramp transaction",
            Self::ListOfframpTransactions => "Failed to fetch offramp transactions",
        }
    }
}

/// An unsigned provider call: method, path, query and optional JSON body.
///
/// `path` never contains a query string; query parameters travel separately
/// so they stay out of the signed material.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderRequest {
    pub operation: OperationKind,
    pub method: Method,
    pub path: String,
    pub query: Vec<(&'static str, String)>,
    pub body: Option<Value>,
}

impl ProviderRequest {
    fn new(operation: OperationKind, method: Method, path: impl Into<String>) -> Self {
        Self {
            operation,
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    fn get(operation: OperationKind, path: impl Into<String>) -> Self {
        Self::new(operation, Method::GET, path)
    }

    fn post(operation: OperationKind, path: impl Into<String>) -> Self {
        Self::new(operation, Method::POST, path)
    }

    fn with_query(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.query.push((key, value.into()));
        self
    }

    fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// Validation and construction of a single provider call.
pub trait BuildRequest {
    fn build(&self) -> Result<ProviderRequest, RampError>;
}

// =============================================================================
// Operation set
// =============================================================================

/// A logical ramp action requested by the web client.
#[derive(Debug, Clone)]
pub enum Operation {
    GetKycRequirements(KycRequirementsQuery),
    CreateCustomer(CustomerInput),
    AddKycMetadata(KycMetadataInput),
    SubmitKycForReview(SubmitKycInput),
    GetKycWidgetUrl(KycWidgetInput),
    CreateQuote(QuoteInput),
    AddFiatAccount(FiatAccountInput),
    InitiateOfframpTransaction(OfframpTransactionInput),
    ListOfframpTransactions(OfframpListQuery),
}

/// What the orchestrator has to execute for a validated operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Plan {
    Single(ProviderRequest),
    KycWidget(KycWidgetFlow),
}

impl Operation {
    pub fn kind(&self) -> OperationKind {
        match self {
            Self::GetKycRequirements(_) => OperationKind::GetKycRequirements,
            Self::CreateCustomer(_) => OperationKind::CreateCustomer,
            Self::AddKycMetadata(_) => OperationKind::AddKycMetadata,
            Self::SubmitKycForReview(_) => OperationKind::SubmitKycForReview,
            Self::GetKycWidgetUrl(_) => OperationKind::GetKycWidgetUrl,
            Self::CreateQuote(_) => OperationKind::CreateQuote,
            Self::AddFiatAccount(_) => OperationKind::AddFiatAccount,
            Self::InitiateOfframpTransaction(_) => OperationKind::InitiateOfframpTransaction,
            Self::ListOfframpTransactions(_) => OperationKind::ListOfframpTransactions,
        }
    }

    /// Validate the input and resolve the provider calls it needs.
    pub fn plan(&self) -> Result<Plan, RampError> {
        let request = match self {
            Self::GetKycRequirements(input) => input.build(),
            Self::CreateCustomer(input) => input.build(),
            Self::AddKycMetadata(input) => input.build(),
            Self::SubmitKycForReview(input) => input.build(),
            Self::GetKycWidgetUrl(input) => return input.validate().map(Plan::KycWidget),
            Self::CreateQuote(input) => input.build(),
            Self::AddFiatAccount(input) => input.build(),
            Self::InitiateOfframpTransaction(input) => input.build(),
            Self::ListOfframpTransactions(input) => input.build(),
        }?;
        Ok(Plan::Single(request))
    }
}

// =============================================================================
// KYC
// =============================================================================

/// Query for the KYC requirements of a country.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct KycRequirementsQuery {
    /// ISO country code.
    pub country: Option<String>,
}

impl BuildRequest for KycRequirementsQuery {
    fn build(&self) -> Result<ProviderRequest, RampError> {
        let country = present(&self.country)
            .ok_or_else(|| RampError::validation("Country code is required"))?;
        Ok(ProviderRequest::get(
            OperationKind::GetKycRequirements,
            "/v1/external/kyc/requirements",
        )
        .with_query("country", country))
    }
}

/// Customer to create at the provider.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInput {
    pub email: Option<String>,
    pub phone_number: Option<String>,
    /// Customer type, e.g. `INDIVIDUAL`.
    #[serde(rename = "type")]
    pub customer_type: Option<String>,
}

impl BuildRequest for CustomerInput {
    fn build(&self) -> Result<ProviderRequest, RampError> {
        let (Some(email), Some(phone_number), Some(customer_type)) = (
            present(&self.email),
            present(&self.phone_number),
            present(&self.customer_type),
        ) else {
            return Err(RampError::validation(
                "email, phoneNumber, and type are required.",
            ));
        };

        Ok(
            ProviderRequest::post(OperationKind::CreateCustomer, "/v1/external/customers")
                .with_body(json!({
                    "email": email,
                    "phoneNumber": phone_number,
                    "type": customer_type,
                })),
        )
    }
}

/// Identity details attached to a customer's KYC submission.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct KycSubmissionInput {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub nationality: Option<String>,
    pub date_of_birth: Option<String>,
    pub country_of_residence: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct KycMetadataInput {
    pub customer_id: Option<String>,
    pub kyc_submission: Option<KycSubmissionInput>,
}

impl BuildRequest for KycMetadataInput {
    fn build(&self) -> Result<ProviderRequest, RampError> {
        let customer_id =
            present(&self.customer_id).ok_or_else(|| RampError::validation("customerId is required."))?;
        let customer_id = path_param("customerId", customer_id)?;

        let submission = self.kyc_submission.clone().unwrap_or_default();
        let (
            Some(first_name),
            Some(last_name),
            Some(nationality),
            Some(date_of_birth),
            Some(country_of_residence),
        ) = (
            present(&submission.first_name),
            present(&submission.last_name),
            present(&submission.nationality),
            present(&submission.date_of_birth),
            present(&submission.country_of_residence),
        )
        else {
            return Err(RampError::validation(
                "kycSubmission requires firstName, lastName, nationality, dateOfBirth, and countryOfResidence.",
            ));
        };

        Ok(ProviderRequest::post(
            OperationKind::AddKycMetadata,
            format!("/v1/external/customers/{}/kyc", segment(customer_id)),
        )
        .with_body(json!({
            "kycSubmission": {
                "firstName": first_name,
                "lastName": last_name,
                "nationality": nationality,
                "dateOfBirth": date_of_birth,
                "countryOfResidence": country_of_residence,
            }
        })))
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitKycInput {
    pub customer_id: Option<String>,
    pub submission_id: Option<String>,
}

impl BuildRequest for SubmitKycInput {
    fn build(&self) -> Result<ProviderRequest, RampError> {
        let (Some(customer_id), Some(submission_id)) =
            (present(&self.customer_id), present(&self.submission_id))
        else {
            return Err(RampError::validation(
                "customerId and submissionId are required.",
            ));
        };
        let customer_id = path_param("customerId", customer_id)?;
        let submission_id = path_param("submissionId", submission_id)?;

        Ok(ProviderRequest::post(
            OperationKind::SubmitKycForReview,
            format!(
                "/v1/external/customers/{}/kyc/{}/submit",
                segment(customer_id),
                segment(submission_id)
            ),
        ))
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct KycWidgetInput {
    pub customer_id: Option<String>,
    /// Where the provider redirects after a completed KYC flow.
    pub success_url: Option<String>,
    /// Where the provider redirects when the user abandons the flow.
    pub cancel_url: Option<String>,
}

impl KycWidgetInput {
    pub fn validate(&self) -> Result<KycWidgetFlow, RampError> {
        let (Some(customer_id), Some(success_url), Some(cancel_url)) = (
            present(&self.customer_id),
            present(&self.success_url),
            present(&self.cancel_url),
        ) else {
            return Err(RampError::validation(
                "customerId, successUrl, and cancelUrl are required.",
            ));
        };
        let customer_id = path_param("customerId", customer_id)?;

        for (field, value) in [("successUrl", success_url), ("cancelUrl", cancel_url)] {
            if url::Url::parse(value).is_err() {
                return Err(RampError::validation(format!(
                    "{field} must be an absolute URL."
                )));
            }
        }

        Ok(KycWidgetFlow {
            customer_id: customer_id.to_string(),
            success_url: success_url.to_string(),
            cancel_url: cancel_url.to_string(),
        })
    }
}

/// Validated input of the two-call widget flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KycWidgetFlow {
    pub customer_id: String,
    pub success_url: String,
    pub cancel_url: String,
}

impl KycWidgetFlow {
    /// Step 1: the customer travels in the query string, there is no body.
    pub fn auth_token_request(&self) -> ProviderRequest {
        ProviderRequest::post(OperationKind::GetAuthToken, "/v1/external/auth-token")
            .with_query("customerId", self.customer_id.clone())
    }

    /// Step 2: the redirect targets travel in the body.
    pub fn widget_url_request(&self) -> ProviderRequest {
        ProviderRequest::post(
            OperationKind::GetKycWidgetUrl,
            format!(
                "/v1/external/customers/{}/kyc/widgetUrl",
                segment(&self.customer_id)
            ),
        )
        .with_body(json!({
            "successUrl": self.success_url,
            "cancelUrl": self.cancel_url,
        }))
    }
}

// =============================================================================
// Quotes
// =============================================================================

/// Quote request. Exactly one of `fromAmount` / `toAmount` must be given.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuoteInput {
    pub chain: Option<String>,
    /// Amount in `fromCurrency`, as a string or a number.
    #[schema(value_type = Option<String>)]
    pub from_amount: Option<Value>,
    /// Amount in `toCurrency`, as a string or a number.
    #[schema(value_type = Option<String>)]
    pub to_amount: Option<Value>,
    pub from_currency: Option<String>,
    pub to_currency: Option<String>,
    pub payment_method_type: Option<String>,
    /// JSON object, or a string holding one.
    #[schema(value_type = Option<Object>)]
    pub metadata: Option<Value>,
}

impl BuildRequest for QuoteInput {
    fn build(&self) -> Result<ProviderRequest, RampError> {
        let (Some(from_currency), Some(to_currency), Some(payment_method_type)) = (
            present(&self.from_currency),
            present(&self.to_currency),
            present(&self.payment_method_type),
        ) else {
            return Err(RampError::validation(
                "fromCurrency, toCurrency, and paymentMethodType are required.",
            ));
        };

        let from_amount = amount("fromAmount", &self.from_amount)?;
        let to_amount = amount("toAmount", &self.to_amount)?;
        if from_amount.is_some() == to_amount.is_some() {
            return Err(RampError::validation(
                "Provide either fromAmount or toAmount, but not both.",
            ));
        }

        let metadata = parse_metadata(&self.metadata)?;

        let mut body = Map::new();
        if let Some(chain) = present(&self.chain) {
            body.insert("chain".to_string(), Value::String(chain.to_string()));
        }
        if let Some(from_amount) = from_amount {
            body.insert("fromAmount".to_string(), from_amount);
        }
        body.insert(
            "fromCurrency".to_string(),
            Value::String(from_currency.to_string()),
        );
        body.insert(
            "paymentMethodType".to_string(),
            Value::String(payment_method_type.to_string()),
        );
        body.insert(
            "toCurrency".to_string(),
            Value::String(to_currency.to_string()),
        );
        if let Some(to_amount) = to_amount {
            body.insert("toAmount".to_string(), to_amount);
        }
        if let Some(metadata) = metadata {
            body.insert("metadata".to_string(), Value::Object(metadata));
        }

        Ok(
            ProviderRequest::post(OperationKind::CreateQuote, "/v1/external/quotes")
                .with_body(Value::Object(body)),
        )
    }
}

// =============================================================================
// Fiat accounts
// =============================================================================

/// Fiat account types accepted by the adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FiatAccountType {
    Sepa,
}

impl FiatAccountType {
    pub const SUPPORTED: [FiatAccountType; 1] = [FiatAccountType::Sepa];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sepa => "SEPA",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::SUPPORTED
            .into_iter()
            .find(|account_type| account_type.as_str() == raw)
    }

    /// Fields the provider needs in `fiatAccountFields` for this type.
    pub fn required_fields(self) -> &'static [&'static str] {
        match self {
            Self::Sepa => &[
                "accountNumber",
                "recipientFullAddress",
                "recipientAddressCountry",
            ],
        }
    }

    fn supported_list() -> String {
        Self::SUPPORTED
            .iter()
            .map(|account_type| account_type.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FiatAccountInput {
    pub customer_id: Option<String>,
    /// Account type. Only `SEPA` is supported.
    #[serde(rename = "type")]
    pub account_type: Option<String>,
    /// Provider-specific account fields, e.g. `accountNumber`. Values are
    /// forwarded as given; text values are trimmed.
    #[schema(value_type = Option<Object>)]
    pub fiat_account_fields: Option<Map<String, Value>>,
}

impl BuildRequest for FiatAccountInput {
    fn build(&self) -> Result<ProviderRequest, RampError> {
        let (Some(customer_id), Some(raw_type), Some(fields)) = (
            present(&self.customer_id),
            present(&self.account_type),
            self.fiat_account_fields.as_ref(),
        ) else {
            return Err(RampError::validation(
                "customerId, type, and fiatAccountFields are required.",
            ));
        };

        let account_type = FiatAccountType::parse(raw_type).ok_or_else(|| {
            RampError::validation(format!(
                "Invalid type `{raw_type}`. Supported types: {}",
                FiatAccountType::supported_list()
            ))
        })?;

        let fields: Map<String, Value> = fields
            .iter()
            .map(|(name, value)| {
                let value = match value {
                    Value::String(text) => Value::String(text.trim().to_string()),
                    other => other.clone(),
                };
                (name.clone(), value)
            })
            .collect();
        if let Some(missing) = account_type
            .required_fields()
            .iter()
            .find(|name| fields.get(**name).is_none_or(is_blank))
        {
            return Err(RampError::validation(format!(
                "fiatAccountFields.{missing} is required for {} accounts.",
                account_type.as_str()
            )));
        }

        Ok(
            ProviderRequest::post(OperationKind::AddFiatAccount, "/v1/external/fiatAccounts")
                .with_body(json!({
                    "customerId": customer_id,
                    "type": account_type.as_str(),
                    "fiatAccountFields": fields,
                })),
        )
    }
}

// =============================================================================
// Offramp transactions
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OfframpTransactionInput {
    pub customer_id: Option<String>,
    pub quote_id: Option<String>,
    pub from_currency: Option<String>,
    pub to_currency: Option<String>,
    /// Amount as a string or a number.
    #[schema(value_type = Option<String>)]
    pub amount: Option<Value>,
    pub fiat_account_id: Option<String>,
    pub chain: Option<String>,
}

impl BuildRequest for OfframpTransactionInput {
    fn build(&self) -> Result<ProviderRequest, RampError> {
        const REQUIRED: &str =
            "customerId, quoteId, fromCurrency, toCurrency, amount, and fiatAccountId are required.";

        let amount = amount("amount", &self.amount)?;
        let (
            Some(customer_id),
            Some(quote_id),
            Some(from_currency),
            Some(to_currency),
            Some(amount),
            Some(fiat_account_id),
        ) = (
            present(&self.customer_id),
            present(&self.quote_id),
            present(&self.from_currency),
            present(&self.to_currency),
            amount,
            present(&self.fiat_account_id),
        )
        else {
            return Err(RampError::validation(REQUIRED));
        };

        let mut body = json!({
            "customerId": customer_id,
            "quoteId": quote_id,
            "fromCurrency": from_currency,
            "toCurrency": to_currency,
            "amount": amount,
            "fiatAccountId": fiat_account_id,
        });
        if let (Some(chain), Some(object)) = (present(&self.chain), body.as_object_mut()) {
            object.insert("chain".to_string(), Value::String(chain.to_string()));
        }

        Ok(
            ProviderRequest::post(OperationKind::InitiateOfframpTransaction, "/v1/external/offramp")
                .with_body(body),
        )
    }
}

/// Filters and paging for the offramp transaction history.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct OfframpListQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    /// Defaults to 20.
    pub page_size: Option<String>,
    /// Defaults to 0.
    pub page_offset: Option<String>,
}

impl BuildRequest for OfframpListQuery {
    fn build(&self) -> Result<ProviderRequest, RampError> {
        let page_size = page_number("pageSize", &self.page_size, DEFAULT_PAGE_SIZE)?;
        let page_offset = page_number("pageOffset", &self.page_offset, DEFAULT_PAGE_OFFSET)?;

        let mut request =
            ProviderRequest::get(OperationKind::ListOfframpTransactions, "/v1/external/offramp");
        if let Some(start_date) = present(&self.start_date) {
            request = request.with_query("startDate", start_date);
        }
        if let Some(end_date) = present(&self.end_date) {
            request = request.with_query("endDate", end_date);
        }
        Ok(request
            .with_query("pageSize", page_size.to_string())
            .with_query("pageOffset", page_offset.to_string()))
    }
}

// =============================================================================
// Field helpers
// =============================================================================

/// Trimmed value of a text field; empty counts as absent.
fn present(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// Reject dot segments, which URL parsing would resolve away and so change
/// the path after it has been signed.
fn path_param<'a>(field: &str, value: &'a str) -> Result<&'a str, RampError> {
    if matches!(value, "." | "..") {
        return Err(RampError::validation(format!(
            "{field} must not be `.` or `..`."
        )));
    }
    Ok(value)
}

/// Percent-encode a path parameter.
fn segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Amounts may be JSON strings or numbers. `0` and `"0"` are present.
fn amount(field: &str, value: &Option<Value>) -> Result<Option<Value>, RampError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                Ok(None)
            } else {
                Ok(Some(Value::String(trimmed.to_string())))
            }
        }
        Some(Value::Number(number)) => Ok(Some(Value::Number(number.clone()))),
        Some(_) => Err(RampError::validation(format!(
            "{field} must be a string or a number."
        ))),
    }
}

/// Null and empty text count as missing for required provider fields.
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.trim().is_empty(),
        _ => false,
    }
}

fn parse_metadata(value: &Option<Value>) -> Result<Option<Map<String, Value>>, RampError> {
    let parsed = match value {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::String(text)) if text.trim().is_empty() => return Ok(None),
        Some(Value::String(text)) => serde_json::from_str::<Value>(text)
            .map_err(|_| RampError::validation("metadata must be valid JSON."))?,
        Some(other) => other.clone(),
    };

    match parsed {
        Value::Object(object) => Ok(Some(object)),
        _ => Err(RampError::validation("metadata must be a JSON object.")),
    }
}

fn page_number(field: &str, value: &Option<String>, default: u32) -> Result<u32, RampError> {
    match present(value) {
        None => Ok(default),
        Some(raw) => raw.parse::<u32>().map_err(|_| {
            RampError::validation(format!("{field} must be a non-negative integer."))
        }),
    }
}
