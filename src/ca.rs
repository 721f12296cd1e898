// Copyright 2025 LocalSSL Contributors
// SPDX-License-Identifier: Apache-2.0

use crate::config::Paths;
use crate::error::{Error, Result};
use rcgen::{
    BasicConstraints, Certificate, CertificateParams, DnType, IsCa, Issuer, KeyPair,
    KeyUsagePurpose, SerialNumber,
};
use std::fs;
use time::{Duration, OffsetDateTime};

pub const CA_COMMON_NAME: &str = "LocalSSL Development CA";
pub const CA_COUNTRY: &str = "TR";
pub const CA_STATE: &str = "Istanbul";
pub const CA_LOCALITY: &str = "Istanbul";
pub const CA_ORG_NAME: &str = "LocalSSL";
pub const CA_ORG_UNIT: &str = "Development";

/// CA lifetime in calendar years.
pub const CA_VALIDITY_YEARS: i32 = 10;

// Exactly one root CA exists at a time, so a fixed serial is sufficient.
const CA_SERIAL: &[u8] = &[0x01];

/// Subject attributes for a new CA. Missing fields fall back to the
/// LocalSSL defaults; the organizational unit is always "Development".
#[derive(Debug, Clone)]
pub struct CaOptions {
    pub common_name: String,
    pub country: String,
    pub state: String,
    pub locality: String,
    pub organization: String,
}

impl Default for CaOptions {
    fn default() -> Self {
        Self {
            common_name: CA_COMMON_NAME.into(),
            country: CA_COUNTRY.into(),
            state: CA_STATE.into(),
            locality: CA_LOCALITY.into(),
            organization: CA_ORG_NAME.into(),
        }
    }
}

/// Local CA for signing development certificates.
pub struct Ca {
    pub key_pair: KeyPair,
    pub cert_pem: String,
}

impl Ca {
    /// Generate a self-signed root CA valid for ten years.
    pub fn generate(options: &CaOptions) -> Result<Self> {
        let key_pair = crate::keypair::generate()?;
        let cert = Self::create_ca_cert(&key_pair, options)?;
        let cert_pem = cert.pem();

        Ok(Self { key_pair, cert_pem })
    }

    /// Load a previously saved CA, or `None` when none has been persisted.
    ///
    /// A reloaded CA signs certificates exactly like the freshly generated
    /// one: the key pair is pinned to RSA/SHA-256 and the subject attributes
    /// come from the stored certificate.
    pub fn load(paths: &Paths) -> Result<Option<Self>> {
        if !paths.ca_exists() {
            return Ok(None);
        }

        let cert_pem = fs::read_to_string(&paths.ca_cert).map_err(|e| Error::ReadFile {
            path: paths.ca_cert.clone(),
            source: e,
        })?;
        let key_pem = fs::read_to_string(&paths.ca_key).map_err(|e| Error::ReadFile {
            path: paths.ca_key.clone(),
            source: e,
        })?;
        let key_pair = crate::keypair::from_pem(&key_pem)?;

        Ok(Some(Self { key_pair, cert_pem }))
    }

    /// Create an Issuer for signing certificates.
    ///
    /// The issuer carries a snapshot of this CA's subject attributes taken
    /// from the certificate, so already-issued leaves are unaffected by
    /// anything that happens to the live CA afterwards.
    ///
    /// Note: This recreates the KeyPair because Issuer takes ownership
    pub fn issuer(&self) -> Result<Issuer<'_, KeyPair>> {
        let key_pem = self.key_pair.serialize_pem();
        let key_pair = crate::keypair::from_pem(&key_pem)?;
        Issuer::from_ca_cert_pem(&self.cert_pem, key_pair).map_err(Error::CertGen)
    }

    fn create_ca_cert(key_pair: &KeyPair, options: &CaOptions) -> Result<Certificate> {
        let mut params = CertificateParams::default();
        params
            .distinguished_name
            .push(DnType::CommonName, options.common_name.as_str());
        params
            .distinguished_name
            .push(DnType::CountryName, options.country.as_str());
        params
            .distinguished_name
            .push(DnType::StateOrProvinceName, options.state.as_str());
        params
            .distinguished_name
            .push(DnType::LocalityName, options.locality.as_str());
        params
            .distinguished_name
            .push(DnType::OrganizationName, options.organization.as_str());
        params
            .distinguished_name
            .push(DnType::OrganizationalUnitName, CA_ORG_UNIT);

        params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
        params.key_usages = vec![KeyUsagePurpose::KeyCertSign, KeyUsagePurpose::CrlSign];
        params.serial_number = Some(SerialNumber::from_slice(CA_SERIAL));

        let now = OffsetDateTime::now_utc();
        params.not_before = now;
        params.not_after = add_years(now, CA_VALIDITY_YEARS);

        Ok(params.self_signed(key_pair)?)
    }

    /// Persist the CA under the fixed CA directory. The key is written
    /// atomically with owner-only permissions.
    pub fn save(&self, paths: &Paths) -> Result<()> {
        paths.ensure_dirs()?;
        crate::fs::atomic_write_secret(&paths.ca_key, self.key_pair.serialize_pem().as_bytes())?;
        crate::fs::atomic_write(&paths.ca_cert, self.cert_pem.as_bytes())?;
        Ok(())
    }

    pub fn days_remaining(&self) -> Result<i64> {
        let info = crate::x509::parse_cert_pem(&self.cert_pem)?;
        Ok(info.days_remaining())
    }
}

/// Calendar-year addition. A Feb 29 start rolls forward to Mar 1 when the
/// target year is not a leap year.
fn add_years(t: OffsetDateTime, years: i32) -> OffsetDateTime {
    match t.replace_year(t.year() + years) {
        Ok(shifted) => shifted,
        Err(_) => (t + Duration::days(1))
            .replace_year(t.year() + years)
            .unwrap_or(t + Duration::days(365 * years as i64)),
    }
}
