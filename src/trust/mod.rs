// Copyright 2025 LocalSSL Contributors
// SPDX-License-Identifier: Apache-2.0

//! System trust store management.
//!
//! Installing the CA requires elevated privileges on every platform, so all
//! external commands go through [`CommandRunner`]; unit tests substitute a
//! recording runner and never touch the real trust store.

#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "macos")]
mod macos;
#[cfg(windows)]
mod windows;

use crate::error::{Error, Result};
use std::path::Path;
use std::process::{Command, Output};

pub trait CommandRunner {
    fn run(&self, program: &str, args: &[&str]) -> Result<Output>;
}

/// Executes commands directly on the host.
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[&str]) -> Result<Output> {
        Command::new(program)
            .args(args)
            .output()
            .map_err(|e| Error::Command {
                command: format!("{} {}", program, args.join(" ")),
                stderr: e.to_string(),
            })
    }
}

pub trait TrustStore {
    fn install_ca(&self, cert_path: &Path) -> Result<()>;
    fn uninstall_ca(&self) -> Result<()>;
    fn name(&self) -> &'static str;
}

/// Trust store for the current platform, or `UnsupportedPlatform` when
/// there is no automatic installation path.
pub fn get_trust_store() -> Result<Box<dyn TrustStore>> {
    #[cfg(target_os = "macos")]
    {
        Ok(Box::new(macos::MacOsTrustStore::new(Box::new(SystemRunner))))
    }

    #[cfg(target_os = "linux")]
    {
        Ok(Box::new(linux::LinuxTrustStore::detect(Box::new(
            SystemRunner,
        ))))
    }

    #[cfg(windows)]
    {
        Ok(Box::new(windows::WindowsTrustStore::new(Box::new(
            SystemRunner,
        ))))
    }

    #[cfg(not(any(target_os = "macos", target_os = "linux", windows)))]
    {
        Err(Error::UnsupportedPlatform(std::env::consts::OS))
    }
}

/// Validate a certificate path before handing it to system tools.
/// Prevents command injection and symlink games.
pub fn validate_cert_path(path: &Path) -> Result<std::path::PathBuf> {
    if !path.is_file() {
        return Err(Error::ReadFile {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "Not a regular file"),
        });
    }

    // Resolve symlinks so the checks apply to the real target
    let canonical = path.canonicalize().map_err(|e| Error::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    let path_str = canonical
        .to_str()
        .ok_or_else(|| Error::InvalidPath(canonical.clone()))?;

    const DANGEROUS_CHARS: &[char] = &[
        ';', '&', '|', '$', '`', '(', ')', '{', '}', '[', ']', '<', '>', '!', '~', '*', '?', '#',
        '\n', '\r', '\0',
    ];

    for c in DANGEROUS_CHARS {
        if path_str.contains(*c) {
            return Err(Error::TrustStore(format!(
                "Path contains dangerous character '{}': {}",
                c,
                path.display()
            )));
        }
    }

    if path_str.starts_with('-') {
        return Err(Error::TrustStore(format!(
            "Path cannot start with dash: {}",
            path.display()
        )));
    }

    Ok(canonical)
}
