// Copyright 2025 LocalSSL Contributors
// SPDX-License-Identifier: Apache-2.0

//! Parse issued certificates without shelling out to openssl.

use crate::error::{Error, Result};
use std::fmt::Write as _;
use std::path::Path;
use x509_parser::prelude::*;

#[derive(Debug, Clone)]
pub struct CertInfo {
    /// Serial number as lowercase hex.
    pub serial: String,
    pub common_name: Option<String>,
    /// DNS names and IP addresses from the SAN extension, in certificate order.
    pub subject_alt_names: Vec<String>,
    pub is_ca: bool,
    pub not_before_timestamp: i64,
    pub not_after_timestamp: i64,
}

impl CertInfo {
    pub fn expiry_string(&self) -> String {
        match ::time::OffsetDateTime::from_unix_timestamp(self.not_after_timestamp) {
            Ok(dt) => format!("{}-{:02}-{:02}", dt.year(), dt.month() as u8, dt.day()),
            Err(_) => "Invalid date".to_string(),
        }
    }

    pub fn days_remaining(&self) -> i64 {
        let now = ::time::OffsetDateTime::now_utc();
        match ::time::OffsetDateTime::from_unix_timestamp(self.not_after_timestamp) {
            Ok(expiry) => (expiry - now).whole_days(),
            Err(_) => -1, // Treat invalid timestamps as expired
        }
    }

    pub fn is_expired(&self) -> bool {
        self.days_remaining() < 0
    }
}

pub fn parse_cert_file(path: &Path) -> Result<CertInfo> {
    let pem_data = std::fs::read_to_string(path).map_err(|e| Error::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse_cert_pem(&pem_data)
}

pub fn parse_cert_pem(pem_str: &str) -> Result<CertInfo> {
    let pem = ::pem::parse(pem_str)
        .map_err(|e| Error::CertParse(format!("Failed to parse PEM: {}", e)))?;

    if pem.tag() != "CERTIFICATE" {
        return Err(Error::CertParse(format!(
            "Expected CERTIFICATE, got {}",
            pem.tag()
        )));
    }

    let (_, cert) = X509Certificate::from_der(pem.contents())
        .map_err(|e| Error::CertParse(format!("Invalid X.509: {}", e)))?;

    let serial = cert.raw_serial().iter().fold(String::new(), |mut s, b| {
        let _ = write!(s, "{:02x}", b);
        s
    });

    let common_name = cert
        .subject()
        .iter_common_name()
        .next()
        .and_then(|cn| cn.as_str().ok())
        .map(String::from);

    let mut subject_alt_names = Vec::new();
    let mut is_ca = false;

    for ext in cert.extensions() {
        match ext.parsed_extension() {
            ParsedExtension::SubjectAlternativeName(san) => {
                for name in &san.general_names {
                    match name {
                        GeneralName::DNSName(dns) => subject_alt_names.push(dns.to_string()),
                        GeneralName::IPAddress(ip_bytes) if ip_bytes.len() == 4 => {
                            let ip = std::net::Ipv4Addr::new(
                                ip_bytes[0],
                                ip_bytes[1],
                                ip_bytes[2],
                                ip_bytes[3],
                            );
                            subject_alt_names.push(ip.to_string());
                        }
                        GeneralName::IPAddress(ip_bytes) if ip_bytes.len() == 16 => {
                            if let Ok(bytes) = <[u8; 16]>::try_from(*ip_bytes) {
                                subject_alt_names
                                    .push(std::net::Ipv6Addr::from(bytes).to_string());
                            }
                        }
                        _ => {}
                    }
                }
            }
            ParsedExtension::BasicConstraints(bc) => {
                is_ca = bc.ca;
            }
            _ => {}
        }
    }

    Ok(CertInfo {
        serial,
        common_name,
        subject_alt_names,
        is_ca,
        not_before_timestamp: cert.validity().not_before.timestamp(),
        not_after_timestamp: cert.validity().not_after.timestamp(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ca::{Ca, CaOptions, CA_COMMON_NAME};
    use crate::cert::Cert;

    #[test]
    fn test_parse_leaf_cert() {
        let ca = Ca::generate(&CaOptions::default()).unwrap();
        let cert = Cert::generate(&ca, &["localhost".into()], 30).unwrap();

        let info = parse_cert_pem(&cert.pem).unwrap();

        assert!(info.days_remaining() >= 29);
        assert!(info.days_remaining() <= 30);
        assert!(!info.is_expired());
        assert_eq!(info.common_name, Some("localhost".to_string()));
        // End-entity certificates must not carry CA:TRUE
        assert!(!info.is_ca);
        assert!(!info.serial.is_empty());
    }

    #[test]
    fn test_parse_ca_cert() {
        let ca = Ca::generate(&CaOptions::default()).unwrap();

        let info = parse_cert_pem(&ca.cert_pem).unwrap();

        assert_eq!(info.common_name, Some(CA_COMMON_NAME.to_string()));
        assert!(info.is_ca);
        assert!(info.days_remaining() > 3640);
    }

    #[test]
    fn test_parse_san_addresses() {
        let ca = Ca::generate(&CaOptions::default()).unwrap();
        let cert = Cert::generate(
            &ca,
            &["localhost".into(), "127.0.0.1".into(), "::1".into()],
            30,
        )
        .unwrap();

        let info = parse_cert_pem(&cert.pem).unwrap();
        assert_eq!(info.subject_alt_names, vec!["localhost", "127.0.0.1", "::1"]);
    }

    #[test]
    fn test_expiry_string_format() {
        let ca = Ca::generate(&CaOptions::default()).unwrap();
        let info = parse_cert_pem(&ca.cert_pem).unwrap();

        let expiry = info.expiry_string();
        assert_eq!(expiry.len(), 10);
        assert_eq!(expiry.chars().nth(4), Some('-'));
        assert_eq!(expiry.chars().nth(7), Some('-'));
    }

    #[test]
    fn test_parse_rejects_non_certificate_pem() {
        let ca = Ca::generate(&CaOptions::default()).unwrap();
        let result = parse_cert_pem(&ca.key_pair.serialize_pem());
        assert!(matches!(result.unwrap_err(), Error::CertParse(_)));
    }
}
