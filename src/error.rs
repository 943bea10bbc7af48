//! Error types for the hansard-parser library.
//!
//! Every fatal condition is a variant of [`HansardError`]. Callers branch on
//! the variant (or on [`HansardError::phase`]) rather than on message text,
//! so a CLI can say *which* stage of the pipeline gave up:
//!
//! * converter problems abort before any parsing happens,
//! * [`HansardError::NoBody`] and [`HansardError::NoVenue`] abort mid-parse,
//! * [`HansardError::UnparseableTime`] is localized to a single time phrase.
//!
//! A duplicate joint-sitting import is *not* an error; see
//! [`crate::store::ImportOutcome::Duplicate`].

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the hansard-parser library.
#[derive(Debug, Error)]
pub enum HansardError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The input string is not a valid file path or URL.
    #[error("Invalid input '{input}': not a file path or a valid HTTP/HTTPS URL")]
    InvalidInput { input: String },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'\nIncrease --download-timeout.")]
    DownloadTimeout { url: String, secs: u64 },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── Converter errors ──────────────────────────────────────────────────
    /// The converter binary could not be started.
    #[error("Could not run converter '{binary}': {source}")]
    ConverterNotFound {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    /// The local converter reported a version other than the pinned one.
    ///
    /// Different pdftohtml releases lay out bold/italic runs and page
    /// footers differently, and the line heuristics depend on that layout.
    #[error("Bad pdftohtml version - got '{found}' but want '{wanted}'")]
    ConverterVersionMismatch { found: String, wanted: String },

    /// The converter ran but exited unsuccessfully.
    #[error("Converter exited with {status}: {stderr}")]
    ConverterFailed { status: String, stderr: String },

    // ── Parse errors ──────────────────────────────────────────────────────
    /// The converter output has no `<body>`; it probably isn't HTML.
    #[error("No <body> was found - output probably isn't HTML")]
    NoBody,

    /// None of the venue announcement grammars matched any chunk.
    #[error("Failed to find the venue: no sitting announcement matched any of {chunks} chunks")]
    NoVenue { chunks: usize },

    /// A time phrase matched a venue grammar but neither time form.
    #[error("bad time string: '{input}'")]
    UnparseableTime { input: String },

    // ── Persistence errors ────────────────────────────────────────────────
    /// The venue row for a parsed transcript does not exist.
    #[error("Venue '{slug}' does not exist in the store")]
    VenueNotFound { slug: String },

    /// The source row being imported does not exist.
    #[error("Source {id} does not exist in the store")]
    SourceNotFound { id: i64 },

    /// Underlying SQLite failure.
    #[error("Store error: {0}")]
    Store(#[from] rusqlite::Error),

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// The pipeline stage a [`HansardError`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Input,
    Convert,
    Parse,
    Metadata,
    Time,
    Persist,
    Config,
    Internal,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Input => "input",
            Phase::Convert => "convert",
            Phase::Parse => "parse",
            Phase::Metadata => "metadata",
            Phase::Time => "time",
            Phase::Persist => "persist",
            Phase::Config => "config",
            Phase::Internal => "internal",
        };
        f.write_str(name)
    }
}

impl HansardError {
    /// Which stage of the pipeline failed.
    pub fn phase(&self) -> Phase {
        match self {
            HansardError::FileNotFound { .. }
            | HansardError::PermissionDenied { .. }
            | HansardError::InvalidInput { .. }
            | HansardError::DownloadFailed { .. }
            | HansardError::DownloadTimeout { .. }
            | HansardError::NotAPdf { .. } => Phase::Input,
            HansardError::ConverterNotFound { .. }
            | HansardError::ConverterVersionMismatch { .. }
            | HansardError::ConverterFailed { .. } => Phase::Convert,
            HansardError::NoBody => Phase::Parse,
            HansardError::NoVenue { .. } => Phase::Metadata,
            HansardError::UnparseableTime { .. } => Phase::Time,
            HansardError::VenueNotFound { .. }
            | HansardError::SourceNotFound { .. }
            | HansardError::Store(_) => Phase::Persist,
            HansardError::InvalidConfig(_) => Phase::Config,
            HansardError::Internal(_) => Phase::Internal,
        }
    }
}
