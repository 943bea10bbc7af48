//! Conversion: run pdftohtml (locally or on a remote machine) and clean up
//! its output.
//!
//! The converter is an external process. Locally we first ask it for its
//! version and refuse to continue unless it is the pinned release, since
//! the line heuristics are tuned to one release's layout. Remote conversion
//! goes through a helper script and trusts the remote toolchain.
//!
//! Whatever the route, two byte-level artefacts are always scrubbed from the
//! output: a stray UTF-16 byte-order mark and a Mac Roman mis-decoding of
//! the right single quotation mark.

use crate::config::ConverterConfig;
use crate::error::HansardError;
use std::path::Path;
use std::process::Output;
use tokio::process::Command;
use tracing::{debug, info};

/// Stray UTF-16 big-endian byte-order mark.
const BOM_BYTES: &[u8] = b"\xFE\xFF";

/// `’` (E2 80 99) read as Mac Roman, then re-encoded.
const MOJIBAKE_QUOTE: &str = "\u{201A}\u{00C4}\u{00F4}";

/// Ask the local converter for its version and check it.
///
/// Returns the version text on success.
///
/// # Errors
/// * [`HansardError::ConverterNotFound`] if the binary cannot be started.
/// * [`HansardError::ConverterVersionMismatch`] if the reported version does
///   not contain `expected_version`.
pub async fn check_version(config: &ConverterConfig) -> Result<String, HansardError> {
    let output = run(Command::new(&config.binary).arg("-v"), &config.binary).await?;

    // pdftohtml prints its banner on stderr; some builds use stdout.
    let mut banner = String::from_utf8_lossy(&output.stderr).into_owned();
    banner.push_str(&String::from_utf8_lossy(&output.stdout));
    let banner = banner.trim().to_string();

    if !banner.contains(&config.expected_version) {
        return Err(HansardError::ConverterVersionMismatch {
            found: banner,
            wanted: config.expected_version.clone(),
        });
    }

    debug!("Converter version ok: {}", config.expected_version);
    Ok(banner)
}

/// Check the converter if it runs locally. Remote hosts own their toolchain.
pub async fn ensure_converter(config: &ConverterConfig) -> Result<(), HansardError> {
    if config.remote_host.is_none() {
        check_version(config).await?;
    }
    Ok(())
}

/// Convert the PDF at `pdf_path` to normalised markup.
///
/// Does not check the converter version; call [`ensure_converter`] once per
/// run before converting.
pub async fn convert_to_markup(
    pdf_path: &Path,
    config: &ConverterConfig,
) -> Result<String, HansardError> {
    let raw = match config.remote_host {
        Some(ref host) => convert_remote(pdf_path, host, config).await?,
        None => convert_local(pdf_path, config).await?,
    };
    Ok(normalise_output(&raw))
}

async fn convert_local(pdf_path: &Path, config: &ConverterConfig) -> Result<Vec<u8>, HansardError> {
    info!("Converting {} with {}", pdf_path.display(), config.binary);
    let mut cmd = Command::new(&config.binary);
    cmd.args(["-stdout", "-noframes", "-enc", "UTF-8"]).arg(pdf_path);
    let output = run(&mut cmd, &config.binary).await?;
    ensure_success(&output)?;
    Ok(output.stdout)
}

async fn convert_remote(
    pdf_path: &Path,
    host: &str,
    config: &ConverterConfig,
) -> Result<Vec<u8>, HansardError> {
    info!("Converting {} on {}", pdf_path.display(), host);
    let script = config.remote_script.display().to_string();
    let mut cmd = Command::new(&config.remote_script);
    cmd.arg(host).arg(pdf_path);
    let output = run(&mut cmd, &script).await?;
    ensure_success(&output)?;
    Ok(output.stdout)
}

async fn run(cmd: &mut Command, binary: &str) -> Result<Output, HansardError> {
    cmd.kill_on_drop(true)
        .output()
        .await
        .map_err(|source| HansardError::ConverterNotFound {
            binary: binary.to_string(),
            source,
        })
}

fn ensure_success(output: &Output) -> Result<(), HansardError> {
    if output.status.success() {
        return Ok(());
    }
    Err(HansardError::ConverterFailed {
        status: output.status.to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    })
}

/// Scrub converter artefacts and decode to text.
///
/// Removes every `FE FF` byte pair (and a decoded U+FEFF), then replaces the
/// mis-encoded quote `‚Äô` with `’`. Invalid UTF-8 is replaced, not fatal.
pub fn normalise_output(raw: &[u8]) -> String {
    let mut bytes = Vec::with_capacity(raw.len());
    let mut i = 0;
    while i < raw.len() {
        if raw[i..].starts_with(BOM_BYTES) {
            i += BOM_BYTES.len();
            continue;
        }
        bytes.push(raw[i]);
        i += 1;
    }

    String::from_utf8_lossy(&bytes)
        .replace('\u{FEFF}', "")
        .replace(MOJIBAKE_QUOTE, "\u{2019}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bom_removed() {
        let mut raw = b"\xFE\xFF<html>".to_vec();
        raw.extend_from_slice("\u{FEFF}<body>".as_bytes());
        assert_eq!(normalise_output(&raw), "<html><body>");
    }

    #[test]
    fn test_mojibake_quote_fixed() {
        let raw = "Parliament met at Nine o\u{201A}\u{00C4}\u{00F4}clock".as_bytes();
        assert_eq!(normalise_output(raw), "Parliament met at Nine o’clock");
    }

    #[test]
    fn test_clean_output_untouched() {
        assert_eq!(normalise_output(b"<b>Mr. Speaker:</b>"), "<b>Mr. Speaker:</b>");
    }

    #[tokio::test]
    async fn test_missing_binary() {
        let config = ConverterConfig {
            binary: "definitely-not-a-real-pdftohtml".into(),
            ..ConverterConfig::default()
        };
        let err = check_version(&config).await.unwrap_err();
        assert!(matches!(err, HansardError::ConverterNotFound { .. }), "got: {err:?}");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_version_mismatch() {
        // `echo -v` prints "-v", which is certainly not the pinned version.
        let config = ConverterConfig {
            binary: "echo".into(),
            ..ConverterConfig::default()
        };
        let err = check_version(&config).await.unwrap_err();
        assert!(
            matches!(err, HansardError::ConverterVersionMismatch { ref wanted, .. }
                if wanted == crate::config::DEFAULT_PDFTOHTML_VERSION),
            "got: {err:?}"
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_version_match() {
        let config = ConverterConfig {
            binary: "echo".into(),
            expected_version: "-v".into(),
            ..ConverterConfig::default()
        };
        assert_eq!(check_version(&config).await.unwrap(), "-v");
    }

    #[tokio::test]
    async fn test_remote_skips_version_check() {
        let config = ConverterConfig {
            binary: "definitely-not-a-real-pdftohtml".into(),
            remote_host: Some("hansard-worker".into()),
            ..ConverterConfig::default()
        };
        assert!(ensure_converter(&config).await.is_ok());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failed_conversion() {
        let config = ConverterConfig {
            binary: "false".into(),
            ..ConverterConfig::default()
        };
        let err = convert_to_markup(Path::new("/tmp/none.pdf"), &config)
            .await
            .unwrap_err();
        assert!(matches!(err, HansardError::ConverterFailed { .. }), "got: {err:?}");
    }
}
