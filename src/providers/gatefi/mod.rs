// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # GateFi Ramp Integration
//!
//! Signing, request construction and orchestration for the GateFi
//! (Unlimit) on/off-ramp REST API.
//!
//! ## Request Flow
//!
//! ```text
//! caller input -> request (validate/normalize) -> signer -> client (execute)
//!              -> orchestrator (multi-call merge) -> api (translate)
//! ```
//!
//! ## Modules
//!
//! - `signer` - HMAC-SHA256 signature over `METHOD + path`
//! - `request` - typed operation inputs, validation, provider paths
//! - `client` - signed HTTP execution and error extraction
//! - `orchestrator` - single-call pass-through and the KYC widget flow
//! - `error` - ramp error taxonomy

pub mod client;
pub mod error;
pub mod orchestrator;
pub mod request;
pub mod signer;

pub use client::{HttpTransport, ProviderClient, RawResponse, SignedRequest, Transport};
pub use error::{RampError, TransportError};
pub use orchestrator::{KycWidgetUrl, RampService};
pub use request::{
    BuildRequest, CustomerInput, FiatAccountInput, FiatAccountType, KycMetadataInput,
    KycRequirementsQuery, KycSubmissionInput, KycWidgetInput, OfframpListQuery,
    OfframpTransactionInput, Operation, OperationKind, ProviderRequest, QuoteInput,
    SubmitKycInput,
};
pub use signer::Signer;
