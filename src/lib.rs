// Copyright 2025 LocalSSL Contributors
// SPDX-License-Identifier: Apache-2.0

//! Local CA and CA-signed certificate generation for development HTTPS.
//!
//! ```rust,no_run
//! use localssl::{Ca, CaOptions, Cert, Paths};
//!
//! let paths = Paths::new()?;
//!
//! let ca = match Ca::load(&paths)? {
//!     Some(ca) => ca,
//!     None => {
//!         let ca = Ca::generate(&CaOptions::default())?;
//!         ca.save(&paths)?;
//!         ca
//!     }
//! };
//!
//! let cert = Cert::generate(&ca, &["localhost".into(), "127.0.0.1".into()], 365)?;
//! cert.save(std::path::Path::new("certificates"))?;
//! # Ok::<(), localssl::Error>(())
//! ```

/// Certificate Authority management.
pub mod ca;
/// Leaf certificate generation.
pub mod cert;
/// Paths and project configuration.
pub mod config;
/// Error types.
pub mod error;
/// Filesystem utilities.
pub mod fs;
/// RSA key-pair generation.
pub mod keypair;
/// Subject-alternative-name classification.
pub mod san;
/// System trust store management.
pub mod trust;
/// X.509 certificate parsing.
pub mod x509;

pub use ca::{Ca, CaOptions, CA_COMMON_NAME, CA_ORG_NAME, CA_VALIDITY_YEARS};
pub use cert::{validate_days, Cert, SavedCert, DEFAULT_CERT_DAYS, MAX_CERT_DAYS};
pub use config::{Paths, ProjectConfig, DEFAULT_OUTPUT_DIR};
pub use error::{Error, Result};
pub use fs::{cert_file_base, write_secret_file};
pub use keypair::RSA_KEY_BITS;
pub use san::{encode_alt_names, AltName};
pub use trust::{get_trust_store, CommandRunner, TrustStore};
pub use x509::{parse_cert_file, parse_cert_pem, CertInfo};
