//! Configuration types for transcript parsing.
//!
//! Parsing itself has no knobs: the layout heuristics are fixed by the way
//! the transcripts are typeset. What *is* configurable is the world around
//! it: which converter binary to run (and which version it must be), whether
//! to convert on a remote machine, how many documents to handle at once, and
//! how long to wait for downloads. All of it lives in [`ParserConfig`], built
//! via [`ParserConfigBuilder`].

use crate::error::HansardError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// The pdftohtml release whose output layout the line heuristics target.
pub const DEFAULT_PDFTOHTML_VERSION: &str = "pdftohtml version 0.48.0";

/// How to turn a PDF into markup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConverterConfig {
    /// Local converter binary. Default: `pdftohtml` (looked up on `PATH`).
    pub binary: String,

    /// Substring the output of `<binary> -v` must contain. Default:
    /// [`DEFAULT_PDFTOHTML_VERSION`].
    ///
    /// Other releases place bold runs, footers and `<hr>` page breaks
    /// differently, which silently breaks page numbering and speaker
    /// detection, so a mismatch is fatal.
    pub expected_version: String,

    /// Convert on this host instead of locally. Default: None.
    pub remote_host: Option<String>,

    /// Helper invoked as `<remote_script> <host> <pdf>` for remote
    /// conversion; it must print the markup on stdout.
    /// Default: `scripts/pdftohtml-remote.sh`.
    pub remote_script: PathBuf,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            binary: "pdftohtml".to_string(),
            expected_version: DEFAULT_PDFTOHTML_VERSION.to_string(),
            remote_host: None,
            remote_script: PathBuf::from("scripts/pdftohtml-remote.sh"),
        }
    }
}

/// Configuration for parsing one or more transcripts.
///
/// # Example
/// ```rust
/// use hansard_parser::ParserConfig;
///
/// let config = ParserConfig::builder()
///     .concurrency(8)
///     .expected_version("pdftohtml version 0.48.0")
///     .build()
///     .unwrap();
/// assert_eq!(config.concurrency, 8);
/// ```
#[derive(Clone)]
pub struct ParserConfig {
    pub converter: ConverterConfig,

    /// Documents parsed at once by batch entry points. Default: 4.
    ///
    /// Each document spends most of its time in the converter process, so
    /// this is effectively the number of concurrent pdftohtml runs.
    pub concurrency: usize,

    /// Download timeout for URL inputs in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Optional progress callback for batch runs.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            converter: ConverterConfig::default(),
            concurrency: 4,
            download_timeout_secs: 120,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ParserConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParserConfig")
            .field("converter", &self.converter)
            .field("concurrency", &self.concurrency)
            .field("download_timeout_secs", &self.download_timeout_secs)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn ParseProgressCallback>"),
            )
            .finish()
    }
}

impl ParserConfig {
    /// Create a new builder for `ParserConfig`.
    pub fn builder() -> ParserConfigBuilder {
        ParserConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ParserConfig`].
#[derive(Debug)]
pub struct ParserConfigBuilder {
    config: ParserConfig,
}

impl ParserConfigBuilder {
    pub fn converter_binary(mut self, binary: impl Into<String>) -> Self {
        self.config.converter.binary = binary.into();
        self
    }

    pub fn expected_version(mut self, version: impl Into<String>) -> Self {
        self.config.converter.expected_version = version.into();
        self
    }

    pub fn remote_host(mut self, host: impl Into<String>) -> Self {
        self.config.converter.remote_host = Some(host.into());
        self
    }

    pub fn remote_script(mut self, script: impl Into<PathBuf>) -> Self {
        self.config.converter.remote_script = script.into();
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n.max(1);
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ParserConfig, HansardError> {
        let c = &self.config;
        if c.converter.binary.trim().is_empty() {
            return Err(HansardError::InvalidConfig(
                "Converter binary must not be empty".into(),
            ));
        }
        if c.converter.expected_version.trim().is_empty() {
            return Err(HansardError::InvalidConfig(
                "Expected converter version must not be empty".into(),
            ));
        }
        if matches!(c.converter.remote_host.as_deref(), Some(h) if h.trim().is_empty()) {
            return Err(HansardError::InvalidConfig(
                "Remote host must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ParserConfig::default();
        assert_eq!(config.converter.binary, "pdftohtml");
        assert_eq!(config.converter.expected_version, DEFAULT_PDFTOHTML_VERSION);
        assert!(config.converter.remote_host.is_none());
        assert_eq!(config.concurrency, 4);
    }

    #[test]
    fn builder_clamps_concurrency() {
        let config = ParserConfig::builder().concurrency(0).build().unwrap();
        assert_eq!(config.concurrency, 1);
    }

    #[test]
    fn builder_rejects_empty_binary() {
        let err = ParserConfig::builder().converter_binary("  ").build().unwrap_err();
        assert!(matches!(err, HansardError::InvalidConfig(_)));
    }

    #[test]
    fn builder_rejects_empty_remote_host() {
        let err = ParserConfig::builder().remote_host("").build().unwrap_err();
        assert!(matches!(err, HansardError::InvalidConfig(_)));
    }

    #[test]
    fn debug_hides_callback() {
        let dbg = format!("{:?}", ParserConfig::default());
        assert!(dbg.contains("pdftohtml"));
    }
}
