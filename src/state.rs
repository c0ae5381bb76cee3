// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::{
    config::GatefiConfig,
    providers::gatefi::{HttpTransport, ProviderClient, RampService, Signer, TransportError},
};

/// Shared, read-only request state.
#[derive(Clone)]
pub struct AppState {
    pub ramp: Arc<RampService>,
}

impl AppState {
    pub fn new(ramp: RampService) -> Self {
        Self {
            ramp: Arc::new(ramp),
        }
    }

    /// Wire signer, transport and orchestrator from the provider configuration.
    pub fn from_config(config: &GatefiConfig) -> Result<Self, TransportError> {
        let transport = HttpTransport::new(&config.api_base_url, config.timeout)?;
        let client = ProviderClient::new(
            Signer::new(&config.secret_key),
            config.api_key.clone(),
            transport,
        );
        Ok(Self::new(RampService::new(client)))
    }

    pub fn provider_base_url(&self) -> &str {
        self.ramp.client().transport().base_url()
    }
}
