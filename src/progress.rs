//! Progress-callback trait for batch parsing events.
//!
//! Inject an [`Arc<dyn ParseProgressCallback>`] via
//! [`crate::config::ParserConfigBuilder::progress_callback`] to receive
//! events as [`crate::parse_stream`] works through its inputs.
//!
//! # Example
//!
//! ```rust
//! use hansard_parser::{ParseProgressCallback, ParserConfig};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     parsed: AtomicUsize,
//! }
//!
//! impl ParseProgressCallback for CountingCallback {
//!     fn on_document_complete(&self, input: &str, chunks: usize) {
//!         self.parsed.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("{input}: {chunks} chunks");
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback { parsed: AtomicUsize::new(0) });
//!
//! let config = ParserConfig::builder()
//!     .progress_callback(counter as Arc<dyn ParseProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called as a batch of transcripts is parsed.
///
/// Documents are parsed concurrently, so the per-document methods may be
/// called from different tasks at once. All methods default to no-ops.
pub trait ParseProgressCallback: Send + Sync {
    /// Called once before any document is touched.
    fn on_batch_start(&self, total_documents: usize) {
        let _ = total_documents;
    }

    /// Called when work on one input begins.
    fn on_document_start(&self, input: &str) {
        let _ = input;
    }

    /// Called when an input has been parsed.
    ///
    /// # Arguments
    /// * `input`  — the path or URL as given
    /// * `chunks` — number of chunks produced
    fn on_document_complete(&self, input: &str, chunks: usize) {
        let _ = (input, chunks);
    }

    /// Called when an input fails at any stage.
    fn on_document_error(&self, input: &str, error: &str) {
        let _ = (input, error);
    }

    /// Called once after every input has been attempted.
    fn on_batch_complete(&self, total_documents: usize, success_count: usize) {
        let _ = (total_documents, success_count);
    }
}

/// The default when no callback is configured.
pub struct NoopProgressCallback;

impl ParseProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ParserConfig`].
pub type ProgressCallback = Arc<dyn ParseProgressCallback>;
