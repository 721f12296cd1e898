// Copyright 2025 LocalSSL Contributors
// SPDX-License-Identifier: Apache-2.0

use crate::ca::CA_COMMON_NAME;
use crate::error::{Error, Result};
use crate::fs::path_to_str;
use crate::trust::{validate_cert_path, CommandRunner, TrustStore};
use std::path::Path;

const SYSTEM_KEYCHAIN: &str = "/Library/Keychains/System.keychain";

pub struct MacOsTrustStore {
    runner: Box<dyn CommandRunner>,
}

impl MacOsTrustStore {
    pub fn new(runner: Box<dyn CommandRunner>) -> Self {
        Self { runner }
    }
}

impl TrustStore for MacOsTrustStore {
    fn install_ca(&self, cert_path: &Path) -> Result<()> {
        let safe_cert_path = validate_cert_path(cert_path)?;
        let cert_path_str = path_to_str(&safe_cert_path)?;

        // Add to the System keychain as a trusted root (admin password prompt)
        let output = self.runner.run(
            "sudo",
            &[
                "security",
                "add-trusted-cert",
                "-d",
                "-r",
                "trustRoot",
                "-k",
                SYSTEM_KEYCHAIN,
                cert_path_str,
            ],
        )?;

        if !output.status.success() {
            return Err(Error::TrustStore(format!(
                "Failed to add certificate to the System keychain: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(())
    }

    fn uninstall_ca(&self) -> Result<()> {
        let output = self.runner.run(
            "sudo",
            &[
                "security",
                "delete-certificate",
                "-c",
                CA_COMMON_NAME,
                SYSTEM_KEYCHAIN,
            ],
        )?;

        // The certificate may simply not be installed; that is not an error
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if !stderr.contains("Unable to delete certificate") {
                return Err(Error::TrustStore(format!(
                    "Failed to remove certificate from the System keychain: {}",
                    stderr.trim()
                )));
            }
        }

        Ok(())
    }

    fn name(&self) -> &'static str {
        "macOS Keychain"
    }
}
