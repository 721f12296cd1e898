// Copyright 2025 LocalSSL Contributors
// SPDX-License-Identifier: Apache-2.0

use crate::ca::Ca;
use crate::error::{Error, Result};
use crate::fs::{atomic_write, atomic_write_secret, cert_file_base};
use crate::san;
use rcgen::{
    CertificateParams, DnType, ExtendedKeyUsagePurpose, IsCa, KeyUsagePurpose, SerialNumber,
};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use time::OffsetDateTime;

/// Default certificate validity when the caller does not choose one.
pub const DEFAULT_CERT_DAYS: u32 = 365;

/// Maximum certificate validity, matching the CA lifetime (10 years).
pub const MAX_CERT_DAYS: u32 = 3650;

pub const CERT_ORG_NAME: &str = "LocalSSL Development";
pub const CERT_ORG_UNIT: &str = "Local Certificate";

// Tie-breaker for serials minted within the same millisecond.
static SERIAL_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Serial numbers combine the current time with an atomic counter, so
/// concurrent issuance from one process cannot collide.
fn next_serial() -> SerialNumber {
    let now = OffsetDateTime::now_utc();
    let millis = (now.unix_timestamp_nanos() / 1_000_000) as u64;
    let count = SERIAL_COUNTER.fetch_add(1, Ordering::Relaxed) as u32;

    let mut bytes = Vec::with_capacity(12);
    bytes.extend_from_slice(&millis.to_be_bytes());
    bytes.extend_from_slice(&count.to_be_bytes());
    SerialNumber::from(bytes)
}

/// Validate that the validity period is within allowed bounds.
///
/// # Errors
/// Returns an error if `days` is 0 or exceeds [`MAX_CERT_DAYS`].
pub fn validate_days(days: u32) -> Result<()> {
    if days == 0 {
        return Err(Error::InvalidDays("days cannot be 0".into()));
    }
    if days > MAX_CERT_DAYS {
        return Err(Error::InvalidDays(format!(
            "days cannot exceed {} (10 years)",
            MAX_CERT_DAYS
        )));
    }
    Ok(())
}

/// A generated certificate with its private key.
#[derive(Debug)]
pub struct Cert {
    /// The certificate in PEM format.
    pub pem: String,
    /// The private key in PEM format.
    pub key_pem: String,
    /// The domains covered by this certificate, in input order.
    pub domains: Vec<String>,
}

/// Where [`Cert::save`] put the certificate files.
#[derive(Debug)]
pub struct SavedCert {
    pub key_path: PathBuf,
    pub cert_path: PathBuf,
}

impl Cert {
    /// Generate a server certificate for the given domains, signed by `ca`.
    ///
    /// The certificate gets a fresh RSA key pair, the first domain as its
    /// common name, and one subject-alternative-name entry per domain in
    /// input order (IP literals become IP entries, everything else DNS).
    /// The issuer attributes are copied from the CA at this moment; `ca`
    /// itself is never mutated.
    pub fn generate(ca: &Ca, domains: &[String], days: u32) -> Result<Self> {
        validate_days(days)?;
        let alt_names = san::encode_alt_names(domains)?;
        let common_name = domains.first().ok_or(Error::NoDomains)?;

        let mut params = CertificateParams::default();
        params
            .distinguished_name
            .push(DnType::CommonName, common_name.as_str());
        params
            .distinguished_name
            .push(DnType::OrganizationName, CERT_ORG_NAME);
        params
            .distinguished_name
            .push(DnType::OrganizationalUnitName, CERT_ORG_UNIT);

        params.is_ca = IsCa::ExplicitNoCa;
        params.key_usages = vec![
            KeyUsagePurpose::DigitalSignature,
            KeyUsagePurpose::KeyEncipherment,
            KeyUsagePurpose::DataEncipherment,
        ];
        params.extended_key_usages = vec![
            ExtendedKeyUsagePurpose::ServerAuth,
            ExtendedKeyUsagePurpose::ClientAuth,
        ];

        for name in &alt_names {
            params.subject_alt_names.push(name.to_san_type()?);
        }

        params.serial_number = Some(next_serial());

        let now = OffsetDateTime::now_utc();
        params.not_before = now;
        params.not_after = now + time::Duration::days(days as i64);

        // Fresh key pair per certificate; the CA key is only used to sign
        let key_pair = crate::keypair::generate()?;
        let issuer = ca.issuer()?;
        let cert = params.signed_by(&key_pair, &issuer)?;

        Ok(Self {
            pem: cert.pem(),
            key_pem: key_pair.serialize_pem(),
            domains: domains.to_vec(),
        })
    }

    /// Save cert and key under `output_dir`, creating it when missing.
    /// Filenames derive from the first domain with `*` replaced by `_`.
    pub fn save(&self, output_dir: &Path) -> Result<SavedCert> {
        let first = self.domains.first().ok_or(Error::NoDomains)?;
        let base = cert_file_base(first)?;

        if !output_dir.exists() {
            std::fs::create_dir_all(output_dir).map_err(|e| Error::CreateDir {
                path: output_dir.to_path_buf(),
                source: e,
            })?;
        }

        let key_path = output_dir.join(format!("{}.key", base));
        let cert_path = output_dir.join(format!("{}.pem", base));

        atomic_write_secret(&key_path, self.key_pem.as_bytes())?;
        atomic_write(&cert_path, self.pem.as_bytes())?;

        Ok(SavedCert {
            key_path,
            cert_path,
        })
    }
}
