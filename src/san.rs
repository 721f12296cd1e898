// Copyright 2025 LocalSSL Contributors
// SPDX-License-Identifier: Apache-2.0

//! Subject-alternative-name classification.

use crate::error::{Error, Result};
use rcgen::SanType;
use std::net::IpAddr;

/// A classified alternative-name entry for a certificate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AltName {
    /// A DNS name, kept exactly as the caller wrote it (wildcards included).
    Dns(String),
    /// An IPv4 or IPv6 address literal.
    Ip(IpAddr),
}

impl AltName {
    /// Classify a single domain string. Strings that parse as an IPv4 or
    /// IPv6 literal become IP entries; everything else is a DNS name.
    pub fn from_domain(domain: &str) -> AltName {
        match domain.parse::<IpAddr>() {
            Ok(ip) => AltName::Ip(ip),
            Err(_) => AltName::Dns(domain.to_string()),
        }
    }

    pub fn to_san_type(&self) -> Result<SanType> {
        match self {
            AltName::Ip(ip) => Ok(SanType::IpAddress(*ip)),
            AltName::Dns(name) => Ok(SanType::DnsName(name.clone().try_into().map_err(
                |_| Error::InvalidDomain {
                    domain: name.clone(),
                    reason: "Invalid DNS name".into(),
                },
            )?)),
        }
    }
}

/// Encode an ordered domain list into typed alternative names. The nth
/// input maps to the nth output entry.
pub fn encode_alt_names(domains: &[String]) -> Result<Vec<AltName>> {
    if domains.is_empty() {
        return Err(Error::NoDomains);
    }
    Ok(domains.iter().map(|d| AltName::from_domain(d)).collect())
}
