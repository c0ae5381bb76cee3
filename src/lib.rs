// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Relational Ramp - GateFi fiat on/off-ramp adapter
//!
//! This crate exposes the wallet's KYC, quote and offramp flows over HTTP and
//! forwards each one to GateFi as a signed provider request.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `config` - Environment configuration
//! - `providers` - Provider integrations (GateFi signer, client and flows)
//! - `state` - Shared request state

pub mod api;
pub mod config;
pub mod error;
pub mod providers;
pub mod state;
