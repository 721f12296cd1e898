// Copyright 2025 LocalSSL Contributors
// SPDX-License-Identifier: Apache-2.0

use crate::ca::CA_COMMON_NAME;
use crate::error::{Error, Result};
use crate::fs::path_to_str;
use crate::trust::{validate_cert_path, CommandRunner, TrustStore};
use std::path::Path;

pub struct WindowsTrustStore {
    runner: Box<dyn CommandRunner>,
}

impl WindowsTrustStore {
    pub fn new(runner: Box<dyn CommandRunner>) -> Self {
        Self { runner }
    }
}

impl TrustStore for WindowsTrustStore {
    fn install_ca(&self, cert_path: &Path) -> Result<()> {
        let safe_cert_path = validate_cert_path(cert_path)?;
        let cert_path_str = path_to_str(&safe_cert_path)?;

        // Add to Trusted Root Certification Authorities (requires admin)
        let output = self
            .runner
            .run("certutil", &["-addstore", "-f", "Root", cert_path_str])?;

        if !output.status.success() {
            return Err(Error::TrustStore(format!(
                "certutil failed: {}\nPlease run the terminal as Administrator.",
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(())
    }

    fn uninstall_ca(&self) -> Result<()> {
        let output = self
            .runner
            .run("certutil", &["-delstore", "Root", CA_COMMON_NAME])?;

        if !output.status.success() {
            return Err(Error::TrustStore(format!(
                "certutil failed: {}\nPlease run the terminal as Administrator.",
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(())
    }

    fn name(&self) -> &'static str {
        "Windows Certificate Store"
    }
}
