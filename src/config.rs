// Copyright 2025 LocalSSL Contributors
// SPDX-License-Identifier: Apache-2.0

use crate::error::{Error, Result};
use directories::BaseDirs;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default output directory for generated certificates, relative to the
/// working directory.
pub const DEFAULT_OUTPUT_DIR: &str = "certificates";

/// Locations of the persisted CA material.
#[derive(Debug, Clone)]
pub struct Paths {
    pub base: PathBuf,
    pub ca_dir: PathBuf,
    pub ca_key: PathBuf,
    pub ca_cert: PathBuf,
}

impl Paths {
    pub fn new() -> Result<Self> {
        let base = Self::base_dir()?;
        let ca_dir = base.join("ca");
        Ok(Self {
            ca_key: ca_dir.join("rootCA.key"),
            ca_cert: ca_dir.join("rootCA.pem"),
            ca_dir,
            base,
        })
    }

    fn base_dir() -> Result<PathBuf> {
        // LOCALSSL_ROOT overrides the default location (used by tests and CI)
        if let Ok(custom_root) = std::env::var("LOCALSSL_ROOT") {
            let path = PathBuf::from(&custom_root);
            if !path.is_absolute() {
                return Err(Error::Config(format!(
                    "LOCALSSL_ROOT must be an absolute path, got: {}",
                    custom_root
                )));
            }
            return Ok(path);
        }

        if let Some(base_dirs) = BaseDirs::new() {
            Ok(base_dirs.home_dir().join(".localssl"))
        } else {
            Err(Error::Config(
                "Could not determine home directory. Set LOCALSSL_ROOT to a custom location."
                    .into(),
            ))
        }
    }

    pub fn ensure_dirs(&self) -> Result<()> {
        if !self.ca_dir.exists() {
            std::fs::create_dir_all(&self.ca_dir).map_err(|e| Error::CreateDir {
                path: self.ca_dir.clone(),
                source: e,
            })?;
        }
        Ok(())
    }

    pub fn ca_exists(&self) -> bool {
        self.ca_key.exists() && self.ca_cert.exists()
    }
}

/// Per-project defaults, mirroring the CLI flags. Read from `localssl.toml`
/// in the working directory, or from `[package.metadata.localssl]` in the
/// project's `Cargo.toml`.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ProjectConfig {
    pub domains: Option<Vec<String>>,
    pub output: Option<PathBuf>,
    pub validity: Option<u32>,
}

impl ProjectConfig {
    /// Look for project configuration in `dir`. Missing files yield the
    /// empty config; a present but malformed file is an error.
    pub fn discover(dir: &Path) -> Result<Self> {
        let standalone = dir.join("localssl.toml");
        if standalone.exists() {
            let content =
                std::fs::read_to_string(&standalone).map_err(|e| Error::ReadFile {
                    path: standalone.clone(),
                    source: e,
                })?;
            return toml::from_str(&content).map_err(|e| Error::Config(e.to_string()));
        }

        let manifest = dir.join("Cargo.toml");
        if manifest.exists() {
            let content = std::fs::read_to_string(&manifest).map_err(|e| Error::ReadFile {
                path: manifest.clone(),
                source: e,
            })?;
            let value: toml::Value =
                toml::from_str(&content).map_err(|e| Error::Config(e.to_string()))?;
            if let Some(section) = value
                .get("package")
                .and_then(|p| p.get("metadata"))
                .and_then(|m| m.get("localssl"))
            {
                return section
                    .clone()
                    .try_into()
                    .map_err(|e: toml::de::Error| Error::Config(e.to_string()));
            }
        }

        Ok(Self::default())
    }
}
