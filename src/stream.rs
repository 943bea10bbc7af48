//! Batch parsing API: emit transcripts as they complete.
//!
//! [`parse_stream`] checks the converter once, then parses up to
//! `config.concurrency` documents at a time and yields each
//! [`DocumentResult`] as soon as it is ready. Results arrive in completion
//! order, not input order; every result carries the input it came from.
//! One bad document never stops the batch.

use crate::config::ParserConfig;
use crate::error::HansardError;
use crate::output::ParsedTranscript;
use crate::parse::parse_pdf_unchecked;
use crate::pipeline::pdftohtml;
use futures::stream::{self, StreamExt};
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio_stream::Stream;
use tracing::{info, warn};

/// The outcome of parsing one input of a batch.
#[derive(Debug)]
pub struct DocumentResult {
    /// The path or URL as given.
    pub input: String,
    pub result: Result<ParsedTranscript, HansardError>,
}

/// A boxed stream of per-document results.
pub type TranscriptStream = Pin<Box<dyn Stream<Item = DocumentResult> + Send>>;

/// Parse many transcript PDFs concurrently.
///
/// # Returns
/// - `Ok(TranscriptStream)` — one [`DocumentResult`] per input
/// - `Err(HansardError)` — the local converter is missing or the wrong
///   version; no document is processed
///
/// # Example
/// ```rust,no_run
/// use hansard_parser::{parse_stream, ParserConfig};
/// use futures::StreamExt;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ParserConfig::default();
/// let inputs = vec!["hansard-2016-03-01.pdf".to_string()];
/// let mut results = parse_stream(inputs, &config).await?;
/// while let Some(doc) = results.next().await {
///     match doc.result {
///         Ok(t) => println!("{}: {} chunks", doc.input, t.chunks.len()),
///         Err(e) => eprintln!("{}: {e}", doc.input),
///     }
/// }
/// # Ok(())
/// # }
/// ```
pub async fn parse_stream(
    inputs: Vec<String>,
    config: &ParserConfig,
) -> Result<TranscriptStream, HansardError> {
    let total = inputs.len();
    info!("Starting batch of {} documents", total);

    // ── Converter check, once for the whole run ──────────────────────────
    pdftohtml::ensure_converter(&config.converter).await?;

    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_start(total);
    }

    // ── Build the stream ─────────────────────────────────────────────────
    let succeeded = Arc::new(AtomicUsize::new(0));
    let concurrency = config.concurrency.max(1);
    let config_clone = config.clone();
    let counter = Arc::clone(&succeeded);

    let documents = stream::iter(inputs.into_iter().map(move |input| {
        let cfg = config_clone.clone();
        let counter = Arc::clone(&counter);
        async move {
            if let Some(ref cb) = cfg.progress_callback {
                cb.on_document_start(&input);
            }
            let result = parse_pdf_unchecked(&input, &cfg).await;
            match result {
                Ok(ref transcript) => {
                    counter.fetch_add(1, Ordering::SeqCst);
                    if let Some(ref cb) = cfg.progress_callback {
                        cb.on_document_complete(&input, transcript.chunks.len());
                    }
                }
                Err(ref e) => {
                    warn!("Failed to parse {} ({} phase): {}", input, e.phase(), e);
                    if let Some(ref cb) = cfg.progress_callback {
                        cb.on_document_error(&input, &e.to_string());
                    }
                }
            }
            DocumentResult { input, result }
        }
    }))
    .buffer_unordered(concurrency);

    let callback = config.progress_callback.clone();
    let finish = stream::once(async move {
        let success_count = succeeded.load(Ordering::SeqCst);
        info!("Batch complete: {}/{} documents parsed", success_count, total);
        if let Some(cb) = callback {
            cb.on_batch_complete(total, success_count);
        }
    })
    .filter_map(|_| async { None::<DocumentResult> });

    Ok(Box::pin(documents.chain(finish)))
}
