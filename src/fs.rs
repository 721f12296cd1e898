// Copyright 2025 LocalSSL Contributors
// SPDX-License-Identifier: Apache-2.0

use crate::error::{Error, Result};
use std::path::Path;

pub fn path_to_str(path: &Path) -> Result<&str> {
    path.to_str()
        .ok_or_else(|| Error::InvalidPath(path.to_path_buf()))
}

/// File-name base for a certificate: the domain with `*` replaced by `_`.
/// Rejects anything that could escape the output directory.
pub fn cert_file_base(domain: &str) -> Result<String> {
    if domain.is_empty() {
        return Err(Error::InvalidDomain {
            domain: domain.to_string(),
            reason: "domain cannot be empty".into(),
        });
    }
    if domain.contains('\0') {
        return Err(Error::InvalidDomain {
            domain: domain.to_string(),
            reason: "domain contains null byte".into(),
        });
    }
    if domain.contains("..") {
        return Err(Error::InvalidDomain {
            domain: domain.to_string(),
            reason: "domain contains path traversal sequence".into(),
        });
    }
    if domain.contains('/') || domain.contains('\\') {
        return Err(Error::InvalidDomain {
            domain: domain.to_string(),
            reason: "domain contains path separator".into(),
        });
    }

    let base = domain.replace('*', "_");

    for c in base.chars() {
        if !c.is_ascii_alphanumeric() && c != '.' && c != '-' && c != '_' && c != ':' {
            return Err(Error::InvalidDomain {
                domain: domain.to_string(),
                reason: format!("domain contains invalid character: '{}'", c),
            });
        }
    }

    Ok(base)
}

/// Atomically write data to a file using a temporary file and rename, so a
/// reader never observes a half-written certificate.
pub fn atomic_write(path: &Path, contents: &[u8]) -> Result<()> {
    use std::fs;
    use std::io::Write;

    // Temp file must live in the same directory for the rename to be atomic
    let parent = path
        .parent()
        .ok_or_else(|| Error::InvalidPath(path.to_path_buf()))?;
    let suffix: u64 = rand::Rng::gen(&mut rand::thread_rng());
    let temp_path = parent.join(format!(".tmp-{:x}", suffix));

    let mut file = fs::File::create(&temp_path).map_err(|e| Error::WriteFile {
        path: temp_path.clone(),
        source: e,
    })?;
    file.write_all(contents).map_err(|e| Error::WriteFile {
        path: temp_path.clone(),
        source: e,
    })?;
    file.sync_all().map_err(|e| Error::WriteFile {
        path: temp_path.clone(),
        source: e,
    })?;
    drop(file);

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        Error::WriteFile {
            path: path.to_path_buf(),
            source: e,
        }
    })?;

    Ok(())
}

/// Atomic variant of [`write_secret_file`].
pub fn atomic_write_secret(path: &Path, contents: &[u8]) -> Result<()> {
    use std::fs;

    let parent = path
        .parent()
        .ok_or_else(|| Error::InvalidPath(path.to_path_buf()))?;
    let suffix: u64 = rand::Rng::gen(&mut rand::thread_rng());
    let temp_path = parent.join(format!(".tmp-{:x}", suffix));

    write_secret_file(&temp_path, contents)?;

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        Error::WriteFile {
            path: path.to_path_buf(),
            source: e,
        }
    })?;

    Ok(())
}

/// Write a private key readable only by the current user.
#[cfg(unix)]
pub fn write_secret_file(path: &Path, contents: &[u8]) -> Result<()> {
    use std::fs::OpenOptions;
    use std::io::Write;
    use std::os::unix::fs::OpenOptionsExt;

    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)
        .map_err(|e| Error::WriteFile {
            path: path.to_path_buf(),
            source: e,
        })?;

    file.write_all(contents).map_err(|e| Error::WriteFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(())
}

/// Write a private key readable only by the current user.
#[cfg(windows)]
pub fn write_secret_file(path: &Path, contents: &[u8]) -> Result<()> {
    use std::process::Command;

    std::fs::write(path, contents).map_err(|e| Error::WriteFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    // Strip inherited ACLs and grant only the current user
    let path_str = path_to_str(path)?;
    let username = std::env::var("USERNAME")
        .map_err(|_| Error::Config("Cannot determine current user for file permissions".into()))?;

    let output = Command::new("icacls")
        .args([
            path_str,
            "/inheritance:r",
            "/grant:r",
            &format!("{}:F", username),
        ])
        .output()
        .map_err(|e| Error::Config(format!("Failed to run icacls: {}", e)))?;

    if !output.status.success() {
        // Do not leave a world-readable private key behind
        let _ = std::fs::remove_file(path);
        return Err(Error::Config(format!(
            "Failed to set file permissions on {}: {}",
            path.display(),
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    Ok(())
}

#[cfg(not(any(unix, windows)))]
pub fn write_secret_file(path: &Path, contents: &[u8]) -> Result<()> {
    std::fs::write(path, contents).map_err(|e| Error::WriteFile {
        path: path.to_path_buf(),
        source: e,
    })
}
