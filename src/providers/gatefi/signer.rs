// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! GateFi request signatures.
//!
//! Every outbound call carries a `signature` header computed as
//! `hex(HMAC-SHA256(secret, METHOD + path))`. Only the path takes part in the
//! signed material: the query string and the body are excluded, matching the
//! provider's documented scheme.

use std::fmt;

use hmac::{Hmac, Mac};
use reqwest::Method;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Signs provider requests with the process-wide shared secret.
#[derive(Clone)]
pub struct Signer {
    secret: Vec<u8>,
}

impl Signer {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            secret: secret.as_ref().to_vec(),
        }
    }

    /// Compute the lowercase hex signature for `method` + `path`.
    ///
    /// `path` must be the path portion only (no `?query`).
    pub fn sign(&self, method: &Method, path: &str) -> String {
        // HMAC accepts keys of any length, so construction cannot fail.
        let mut mac = <HmacSha256 as Mac>::new_from_slice(&self.secret)
            .expect("HMAC-SHA256 accepts keys of any length");
        mac.update(method.as_str().to_ascii_uppercase().as_bytes());
        mac.update(path.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }
}

impl fmt::Debug for Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signer")
            .field("secret", &"<redacted>")
            .finish()
    }
}
