// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Error taxonomy for ramp operations.

/// Failure of a ramp operation.
///
/// `Display` renders only the caller-facing message. The `detail` of an
/// internal failure is meant for logs and is never sent to the client.
#[derive(Debug, thiserror::Error)]
pub enum RampError {
    /// Caller input violates the operation contract. Never reaches the provider.
    #[error("{0}")]
    Validation(String),

    /// The provider answered with a non-2xx status.
    #[error("{message}")]
    Provider { message: String, status: u16 },

    /// Transport failure or an unusable successful response.
    #[error("{message}")]
    Internal { message: String, detail: String },
}

impl RampError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn internal(message: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            detail: detail.into(),
        }
    }
}

/// Failure to complete an HTTP exchange with the provider.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("invalid provider URL: {0}")]
    InvalidUrl(String),

    #[error("request failed: {0}")]
    Request(String),

    #[error("failed to read response body: {0}")]
    Body(String),
}
