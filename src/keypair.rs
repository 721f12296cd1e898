// Copyright 2025 LocalSSL Contributors
// SPDX-License-Identifier: Apache-2.0

//! RSA key-pair generation.
//!
//! rcgen cannot generate RSA keys itself, so keys are produced with the
//! `rsa` crate and imported as PKCS#8 with a SHA-256 signature algorithm.

use crate::error::{Error, Result};
use rand::rngs::OsRng;
use rcgen::{KeyPair, PKCS_RSA_SHA256};
use rsa::pkcs8::EncodePrivateKey;
use rsa::RsaPrivateKey;

/// RSA modulus size for every generated key, CA and leaf alike.
pub const RSA_KEY_BITS: usize = 2048;

/// Generate a fresh RSA-2048 key pair. Every call produces an independent
/// key from the system's secure random source.
pub fn generate() -> Result<KeyPair> {
    let private_key = RsaPrivateKey::new(&mut OsRng, RSA_KEY_BITS)?;
    let key_pem = private_key
        .to_pkcs8_pem(pkcs8::LineEnding::LF)
        .map_err(|e| Error::KeyEncode(e.to_string()))?;
    from_pem(&key_pem)
}

/// Reload a key pair from PKCS#8 PEM, pinned to RSA/SHA-256 so a reloaded
/// CA signs exactly like a freshly generated one.
pub fn from_pem(key_pem: &str) -> Result<KeyPair> {
    KeyPair::from_pkcs8_pem_and_sign_algo(key_pem, &PKCS_RSA_SHA256).map_err(Error::CertGen)
}
