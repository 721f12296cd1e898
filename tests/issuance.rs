// Copyright 2025 LocalSSL Contributors
// SPDX-License-Identifier: Apache-2.0

//! End-to-end properties of issued certificates, checked against an
//! independent X.509 parser.

use localssl::{Ca, CaOptions, Cert};
use ::time::OffsetDateTime;
use x509_parser::prelude::*;

fn der_from_pem(pem_str: &str) -> Vec<u8> {
    ::pem::parse(pem_str).expect("valid PEM").into_contents()
}

fn test_ca() -> Ca {
    Ca::generate(&CaOptions::default()).expect("CA generation")
}

#[test]
fn ca_subject_equals_issuer() {
    let ca = test_ca();
    let der = der_from_pem(&ca.cert_pem);
    let (_, cert) = X509Certificate::from_der(&der).unwrap();

    assert_eq!(cert.subject().to_string(), cert.issuer().to_string());
    assert!(cert.subject().to_string().contains("LocalSSL Development CA"));
}

#[test]
fn ca_is_self_signed_and_verifies() {
    let ca = test_ca();
    let der = der_from_pem(&ca.cert_pem);
    let (_, cert) = X509Certificate::from_der(&der).unwrap();

    // None = verify against the certificate's own public key
    assert!(cert.verify_signature(None).is_ok());
}

#[test]
fn ca_extensions_mark_a_certificate_authority() {
    let ca = test_ca();
    let der = der_from_pem(&ca.cert_pem);
    let (_, cert) = X509Certificate::from_der(&der).unwrap();

    let mut saw_basic_constraints = false;
    let mut saw_key_usage = false;
    let mut saw_key_identifier = false;

    for ext in cert.extensions() {
        match ext.parsed_extension() {
            ParsedExtension::BasicConstraints(bc) => {
                saw_basic_constraints = true;
                assert!(bc.ca);
                assert!(ext.critical, "basicConstraints must be critical on the CA");
            }
            ParsedExtension::KeyUsage(ku) => {
                saw_key_usage = true;
                assert!(ku.key_cert_sign());
                assert!(ku.crl_sign());
                assert!(ext.critical, "keyUsage must be critical on the CA");
            }
            ParsedExtension::SubjectKeyIdentifier(_) => {
                saw_key_identifier = true;
            }
            _ => {}
        }
    }

    assert!(saw_basic_constraints);
    assert!(saw_key_usage);
    assert!(saw_key_identifier);
}

#[test]
fn ca_validity_spans_ten_calendar_years() {
    let ca = test_ca();
    let der = der_from_pem(&ca.cert_pem);
    let (_, cert) = X509Certificate::from_der(&der).unwrap();

    let not_before =
        OffsetDateTime::from_unix_timestamp(cert.validity().not_before.timestamp()).unwrap();
    let not_after =
        OffsetDateTime::from_unix_timestamp(cert.validity().not_after.timestamp()).unwrap();

    assert_eq!(not_after.year() - not_before.year(), 10);
}

#[test]
fn leaf_san_entries_discriminate_dns_from_ip() {
    let ca = test_ca();
    let cert =
        Cert::generate(&ca, &["localhost".into(), "127.0.0.1".into()], 30).unwrap();

    let der = der_from_pem(&cert.pem);
    let (_, parsed) = X509Certificate::from_der(&der).unwrap();

    let san = parsed
        .subject_alternative_name()
        .unwrap()
        .expect("SAN extension present");

    assert_eq!(san.value.general_names.len(), 2);
    match &san.value.general_names[0] {
        GeneralName::DNSName(name) => assert_eq!(*name, "localhost"),
        other => panic!("expected DNS entry first, got {:?}", other),
    }
    match &san.value.general_names[1] {
        GeneralName::IPAddress(bytes) => assert_eq!(*bytes, &[127, 0, 0, 1][..]),
        other => panic!("expected IP entry second, got {:?}", other),
    }
}

#[test]
fn leaf_san_handles_ipv6_loopback() {
    let ca = test_ca();
    let cert = Cert::generate(&ca, &["::1".into()], 30).unwrap();

    let der = der_from_pem(&cert.pem);
    let (_, parsed) = X509Certificate::from_der(&der).unwrap();

    let san = parsed
        .subject_alternative_name()
        .unwrap()
        .expect("SAN extension present");

    let mut expected = [0u8; 16];
    expected[15] = 1;
    match &san.value.general_names[0] {
        GeneralName::IPAddress(bytes) => assert_eq!(*bytes, &expected[..]),
        other => panic!("expected IP entry, got {:?}", other),
    }
}

#[test]
fn leaf_validity_matches_requested_days() {
    let ca = test_ca();
    let cert = Cert::generate(&ca, &["localhost".into()], 10).unwrap();

    let der = der_from_pem(&cert.pem);
    let (_, parsed) = X509Certificate::from_der(&der).unwrap();

    let seconds =
        parsed.validity().not_after.timestamp() - parsed.validity().not_before.timestamp();
    let days = (seconds as f64 / 86_400.0).round() as i64;
    assert!((9..=11).contains(&days), "validity was {} days", days);
}

#[test]
fn leaf_subject_and_issuer_attributes() {
    let ca = test_ca();
    let cert = Cert::generate(&ca, &["myapp.local".into()], 30).unwrap();

    let ca_der = der_from_pem(&ca.cert_pem);
    let (_, ca_parsed) = X509Certificate::from_der(&ca_der).unwrap();
    let leaf_der = der_from_pem(&cert.pem);
    let (_, leaf) = X509Certificate::from_der(&leaf_der).unwrap();

    // Issuer is a snapshot of the CA's subject
    assert_eq!(leaf.issuer().to_string(), ca_parsed.subject().to_string());

    let cn = leaf
        .subject()
        .iter_common_name()
        .next()
        .and_then(|v| v.as_str().ok());
    assert_eq!(cn, Some("myapp.local"));

    let org = leaf
        .subject()
        .iter_organization()
        .next()
        .and_then(|v| v.as_str().ok());
    assert_eq!(org, Some("LocalSSL Development"));

    let ou = leaf
        .subject()
        .iter_organizational_unit()
        .next()
        .and_then(|v| v.as_str().ok());
    assert_eq!(ou, Some("Local Certificate"));
}

#[test]
fn leaf_extensions_mark_a_server_certificate() {
    let ca = test_ca();
    let cert = Cert::generate(&ca, &["localhost".into()], 30).unwrap();

    let der = der_from_pem(&cert.pem);
    let (_, parsed) = X509Certificate::from_der(&der).unwrap();

    let mut saw_eku = false;
    for ext in parsed.extensions() {
        match ext.parsed_extension() {
            ParsedExtension::BasicConstraints(bc) => assert!(!bc.ca),
            ParsedExtension::KeyUsage(ku) => {
                assert!(ku.digital_signature());
                assert!(ku.key_encipherment());
                assert!(ku.data_encipherment());
            }
            ParsedExtension::ExtendedKeyUsage(eku) => {
                saw_eku = true;
                assert!(eku.server_auth);
                assert!(eku.client_auth);
            }
            _ => {}
        }
    }
    assert!(saw_eku);
}

#[test]
fn leaf_signature_verifies_against_ca_key() {
    let ca = test_ca();
    let cert = Cert::generate(&ca, &["localhost".into()], 30).unwrap();

    let ca_der = der_from_pem(&ca.cert_pem);
    let (_, ca_parsed) = X509Certificate::from_der(&ca_der).unwrap();
    let leaf_der = der_from_pem(&cert.pem);
    let (_, leaf) = X509Certificate::from_der(&leaf_der).unwrap();

    assert!(leaf.verify_signature(Some(ca_parsed.public_key())).is_ok());
    // A leaf is not self-signed
    assert!(leaf.verify_signature(None).is_err());
}

#[test]
fn tampered_certificate_body_fails_verification() {
    let ca = test_ca();
    let cert = Cert::generate(&ca, &["localhost".into()], 30).unwrap();

    let ca_der = der_from_pem(&ca.cert_pem);
    let (_, ca_parsed) = X509Certificate::from_der(&ca_der).unwrap();

    // Flip one byte inside the signed body (the CN string), keeping the
    // DER structure intact
    let mut tampered = der_from_pem(&cert.pem);
    let pos = tampered
        .windows(b"localhost".len())
        .position(|w| w == b"localhost")
        .expect("common name bytes present");
    tampered[pos] ^= 0x01;

    match X509Certificate::from_der(&tampered) {
        Ok((_, parsed)) => {
            assert!(
                parsed.verify_signature(Some(ca_parsed.public_key())).is_err(),
                "tampered certificate must not verify"
            );
        }
        // Refusing to parse a mangled body is also a failure to verify
        Err(_) => {}
    }
}

#[test]
fn reissuance_produces_fresh_keys_and_serials() {
    let ca = test_ca();
    let domains = vec!["localhost".to_string(), "127.0.0.1".to_string()];

    let a = Cert::generate(&ca, &domains, 30).unwrap();
    let b = Cert::generate(&ca, &domains, 30).unwrap();

    assert_ne!(a.key_pem, b.key_pem, "key pairs must not be cached");

    let a_der = der_from_pem(&a.pem);
    let (_, a_parsed) = X509Certificate::from_der(&a_der).unwrap();
    let b_der = der_from_pem(&b.pem);
    let (_, b_parsed) = X509Certificate::from_der(&b_der).unwrap();

    assert_ne!(a_parsed.raw_serial(), b_parsed.raw_serial());
    assert_eq!(
        a_parsed.subject().to_string(),
        b_parsed.subject().to_string()
    );
    assert_eq!(a_parsed.issuer().to_string(), b_parsed.issuer().to_string());

    let sans = |c: &X509Certificate| -> Vec<String> {
        c.subject_alternative_name()
            .unwrap()
            .map(|san| {
                san.value
                    .general_names
                    .iter()
                    .map(|n| format!("{:?}", n))
                    .collect()
            })
            .unwrap_or_default()
    };
    assert_eq!(sans(&a_parsed), sans(&b_parsed));
}

#[test]
fn reloaded_ca_issues_equivalent_certificates() {
    let dir = tempfile::tempdir().unwrap();
    let original = std::env::var("LOCALSSL_ROOT").ok();
    std::env::set_var("LOCALSSL_ROOT", dir.path());

    let paths = localssl::Paths::new().unwrap();
    let ca = test_ca();
    ca.save(&paths).unwrap();

    let reloaded = Ca::load(&paths).unwrap().expect("CA should load back");
    let cert = Cert::generate(&reloaded, &["localhost".into()], 30).unwrap();

    let ca_der = der_from_pem(&ca.cert_pem);
    let (_, ca_parsed) = X509Certificate::from_der(&ca_der).unwrap();
    let leaf_der = der_from_pem(&cert.pem);
    let (_, leaf) = X509Certificate::from_der(&leaf_der).unwrap();

    assert_eq!(leaf.issuer().to_string(), ca_parsed.subject().to_string());
    assert!(leaf.verify_signature(Some(ca_parsed.public_key())).is_ok());

    match original {
        Some(val) => std::env::set_var("LOCALSSL_ROOT", val),
        None => std::env::remove_var("LOCALSSL_ROOT"),
    }
}
