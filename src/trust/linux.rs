// Copyright 2025 LocalSSL Contributors
// SPDX-License-Identifier: Apache-2.0

use crate::error::{Error, Result};
use crate::fs::path_to_str;
use crate::trust::{validate_cert_path, CommandRunner, TrustStore};
use std::path::{Path, PathBuf};

const TRUST_STORE_CERT_NAME: &str = "localssl-ca.crt";

pub struct LinuxTrustStore {
    distro: LinuxDistro,
    runner: Box<dyn CommandRunner>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LinuxDistro {
    Debian, // Ubuntu, Mint, Alpine - anything with update-ca-certificates
    Fedora, // RHEL, CentOS, Rocky, Alma
    Unknown,
}

impl LinuxDistro {
    fn trust_store_dir(&self) -> Option<&'static Path> {
        match self {
            LinuxDistro::Debian => Some(Path::new("/usr/local/share/ca-certificates")),
            LinuxDistro::Fedora => Some(Path::new("/etc/pki/ca-trust/source/anchors")),
            LinuxDistro::Unknown => None,
        }
    }

    fn cert_path(&self) -> Option<PathBuf> {
        self.trust_store_dir()
            .map(|dir| dir.join(TRUST_STORE_CERT_NAME))
    }

    fn update_command(&self) -> Option<&'static [&'static str]> {
        match self {
            LinuxDistro::Debian => Some(&["update-ca-certificates"]),
            LinuxDistro::Fedora => Some(&["update-ca-trust", "extract"]),
            LinuxDistro::Unknown => None,
        }
    }
}

fn detect_distro() -> LinuxDistro {
    if Path::new("/usr/local/share/ca-certificates").is_dir() {
        LinuxDistro::Debian
    } else if Path::new("/etc/pki/ca-trust/source/anchors").is_dir() {
        LinuxDistro::Fedora
    } else {
        LinuxDistro::Unknown
    }
}

impl LinuxTrustStore {
    pub fn detect(runner: Box<dyn CommandRunner>) -> Self {
        Self {
            distro: detect_distro(),
            runner,
        }
    }

    #[cfg(test)]
    fn with_distro(distro: LinuxDistro, runner: Box<dyn CommandRunner>) -> Self {
        Self { distro, runner }
    }

    fn run_as_root(&self, args: &[&str]) -> Result<()> {
        let output = self.runner.run("sudo", args)?;
        if !output.status.success() {
            return Err(Error::TrustStore(format!(
                "'sudo {}' failed: {}",
                args.join(" "),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(())
    }
}

impl TrustStore for LinuxTrustStore {
    fn install_ca(&self, cert_path: &Path) -> Result<()> {
        let safe_cert_path = validate_cert_path(cert_path)?;

        let dest = self.distro.cert_path().ok_or_else(|| {
            Error::TrustStore(
                "Unsupported Linux distribution (cannot find CA store path)".into(),
            )
        })?;
        let update_cmd = self.distro.update_command().ok_or_else(|| {
            Error::TrustStore("No update command available for this distribution".into())
        })?;

        self.run_as_root(&["cp", path_to_str(&safe_cert_path)?, path_to_str(&dest)?])?;
        self.run_as_root(update_cmd)?;

        Ok(())
    }

    fn uninstall_ca(&self) -> Result<()> {
        // Remove from whichever store holds the certificate; the detected
        // distro may have changed since installation
        for distro in [LinuxDistro::Debian, LinuxDistro::Fedora] {
            let dest = match distro.cert_path() {
                Some(dest) if dest.exists() => dest,
                _ => continue,
            };

            self.run_as_root(&["rm", "-f", path_to_str(&dest)?])?;
            if let Some(update_cmd) = distro.update_command() {
                self.run_as_root(update_cmd)?;
            }
        }

        Ok(())
    }

    fn name(&self) -> &'static str {
        match self.distro {
            LinuxDistro::Debian => "Debian/Ubuntu ca-certificates",
            LinuxDistro::Fedora => "Fedora/RHEL ca-trust",
            LinuxDistro::Unknown => "Linux (unknown)",
        }
    }
}
