//! Input resolution: turn a user-supplied path or URL into a local PDF.
//!
//! The converter runs as a separate process and needs a file-system path,
//! so URLs and in-memory buffers are written into a `TempDir` that lives as
//! long as the returned [`ResolvedInput`]. Every input is checked for the
//! `%PDF` magic before the converter ever sees it.

use crate::error::HansardError;
use std::io::Read;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, info};

const PDF_MAGIC: &[u8; 4] = b"%PDF";

/// A local PDF, possibly held in a temporary directory.
#[derive(Debug)]
pub enum ResolvedInput {
    /// Input was already a local file.
    Local(PathBuf),
    /// Input was downloaded or handed over as bytes. The `TempDir` keeps the
    /// file alive until processing completes.
    Temporary { path: PathBuf, _temp_dir: TempDir },
}

impl ResolvedInput {
    pub fn path(&self) -> &Path {
        match self {
            ResolvedInput::Local(p) => p,
            ResolvedInput::Temporary { path, .. } => path,
        }
    }
}

pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Resolve the input string to a local PDF file.
pub async fn resolve_input(input: &str, timeout_secs: u64) -> Result<ResolvedInput, HansardError> {
    if input.trim().is_empty() {
        return Err(HansardError::InvalidInput {
            input: input.to_string(),
        });
    }
    if is_url(input) {
        download_url(input, timeout_secs).await
    } else {
        resolve_local(input)
    }
}

/// Write an in-memory PDF to a temporary file.
pub async fn resolve_bytes(bytes: &[u8], name: &str) -> Result<ResolvedInput, HansardError> {
    let temp_dir = TempDir::new().map_err(|e| HansardError::Internal(e.to_string()))?;
    let path = temp_dir.path().join(name);
    check_magic(&path, bytes)?;

    tokio::fs::write(&path, bytes)
        .await
        .map_err(|e| HansardError::Internal(format!("Failed to write temp file: {}", e)))?;

    Ok(ResolvedInput::Temporary {
        path,
        _temp_dir: temp_dir,
    })
}

fn resolve_local(path_str: &str) -> Result<ResolvedInput, HansardError> {
    let path = PathBuf::from(path_str);

    if !path.exists() {
        return Err(HansardError::FileNotFound { path });
    }

    match std::fs::File::open(&path) {
        Ok(mut f) => {
            let mut magic = [0u8; 4];
            if f.read_exact(&mut magic).is_ok() && &magic != PDF_MAGIC {
                return Err(HansardError::NotAPdf { path, magic });
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(HansardError::PermissionDenied { path });
        }
        Err(_) => {
            return Err(HansardError::FileNotFound { path });
        }
    }

    debug!("Resolved local PDF: {}", path.display());
    Ok(ResolvedInput::Local(path))
}

async fn download_url(url: &str, timeout_secs: u64) -> Result<ResolvedInput, HansardError> {
    info!("Downloading transcript from: {}", url);

    let failed = |reason: String| HansardError::DownloadFailed {
        url: url.to_string(),
        reason,
    };

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| failed(e.to_string()))?;

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            HansardError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            failed(e.to_string())
        }
    })?;

    if !response.status().is_success() {
        return Err(failed(format!("HTTP {}", response.status())));
    }

    let filename = filename_from_url(url);
    let bytes = response.bytes().await.map_err(|e| failed(e.to_string()))?;
    let resolved = resolve_bytes(&bytes, &filename).await?;

    info!("Downloaded to: {}", resolved.path().display());
    Ok(resolved)
}

fn check_magic(path: &Path, bytes: &[u8]) -> Result<(), HansardError> {
    if bytes.len() >= 4 && &bytes[..4] != PDF_MAGIC {
        let mut magic = [0u8; 4];
        magic.copy_from_slice(&bytes[..4]);
        return Err(HansardError::NotAPdf {
            path: path.to_path_buf(),
            magic,
        });
    }
    Ok(())
}

/// Last path segment of the URL if it looks like a file name.
fn filename_from_url(url: &str) -> String {
    if let Ok(parsed) = reqwest::Url::parse(url) {
        if let Some(mut segments) = parsed.path_segments() {
            if let Some(last) = segments.next_back() {
                if !last.is_empty() && last.contains('.') {
                    return last.to_string();
                }
            }
        }
    }

    "transcript.pdf".to_string()
}
