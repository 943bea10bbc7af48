//! Single-document parsing entry points.
//!
//! [`parse_markup`] is the pure core: markup in, transcript out, no I/O.
//! The `parse_pdf*` functions put the converter in front of it. Use
//! [`crate::stream::parse_stream`] for many documents at once.

use crate::config::{ConverterConfig, ParserConfig};
use crate::error::HansardError;
use crate::output::ParsedTranscript;
use crate::pipeline::{chunk, input, lines, merge, meta, pdftohtml};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Parse already-converted pdftohtml markup.
///
/// # Errors
/// * [`HansardError::NoBody`] if the markup has no `<body>`.
/// * [`HansardError::NoVenue`] if no sitting announcement is found.
/// * [`HansardError::UnparseableTime`] if an announced time is malformed.
pub fn parse_markup(markup: &str) -> Result<ParsedTranscript, HansardError> {
    // ── Step 1: Extract styled lines ─────────────────────────────────────
    let raw = lines::extract_lines(markup)?;
    let raw_count = raw.len();

    // ── Step 2: Undo soft wraps ──────────────────────────────────────────
    let merged = merge::merge_lines(raw);
    debug!("Merged {} lines into {}", raw_count, merged.len());

    // ── Step 3: Classify ─────────────────────────────────────────────────
    let chunks = chunk::chunk_lines(&merged);

    // ── Step 4: Sitting metadata ─────────────────────────────────────────
    let meta = meta::extract_meta(&chunks)?;

    Ok(ParsedTranscript { meta, chunks })
}

/// Parse a transcript PDF given as a local path or HTTP(S) URL.
///
/// Checks the converter version first when converting locally.
pub async fn parse_pdf(
    input_str: impl AsRef<str>,
    config: &ParserConfig,
) -> Result<ParsedTranscript, HansardError> {
    pdftohtml::ensure_converter(&config.converter).await?;
    parse_pdf_unchecked(input_str.as_ref(), config).await
}

/// Synchronous wrapper around [`parse_pdf`].
///
/// Creates a temporary tokio runtime internally.
pub fn parse_pdf_sync(
    input_str: impl AsRef<str>,
    config: &ParserConfig,
) -> Result<ParsedTranscript, HansardError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| HansardError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(parse_pdf(input_str, config))
}

/// Parse a transcript PDF held in memory.
///
/// The bytes are spooled to a managed temp file for the converter and
/// removed again on return.
pub async fn parse_pdf_bytes(
    bytes: &[u8],
    config: &ParserConfig,
) -> Result<ParsedTranscript, HansardError> {
    pdftohtml::ensure_converter(&config.converter).await?;
    let resolved = input::resolve_bytes(bytes, "transcript.pdf").await?;
    parse_resolved(resolved.path(), "<bytes>", config).await
}

/// Run only the converter version check.
///
/// Returns the version banner reported by the binary.
pub async fn check_converter(config: &ConverterConfig) -> Result<String, HansardError> {
    pdftohtml::check_version(config).await
}

/// Resolve, convert and parse one input. The caller has already checked the
/// converter.
pub(crate) async fn parse_pdf_unchecked(
    input_str: &str,
    config: &ParserConfig,
) -> Result<ParsedTranscript, HansardError> {
    info!("Parsing transcript: {}", input_str);
    let resolved = input::resolve_input(input_str, config.download_timeout_secs).await?;
    parse_resolved(resolved.path(), input_str, config).await
}

async fn parse_resolved(
    pdf_path: &Path,
    label: &str,
    config: &ParserConfig,
) -> Result<ParsedTranscript, HansardError> {
    let start = Instant::now();

    let markup = pdftohtml::convert_to_markup(pdf_path, &config.converter).await?;
    debug!("Converter produced {} bytes of markup", markup.len());

    let transcript = parse_markup(&markup)?;

    info!(
        "Parsed {}: {} chunks ({} speeches) over {} pages in {}ms",
        label,
        transcript.chunks.len(),
        transcript.speech_count(),
        transcript.last_page(),
        start.elapsed().as_millis()
    );
    Ok(transcript)
}
