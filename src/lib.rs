//! # hansard-parser
//!
//! Parse Kenyan parliamentary Hansard transcripts (National Assembly,
//! Senate and joint sittings) into structured sittings: which chamber sat,
//! when it met and rose, and an ordered list of scenes, headings and
//! attributed speeches.
//!
//! The transcripts are published as PDFs. The layout, not the text, tells
//! you who is speaking: speaker names are bold runs glued to the speech,
//! stage directions are italic, headings are in capitals. `pdftohtml`
//! preserves exactly that styling, so it is used as the front end and
//! everything after it works on its markup.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input     resolve local file or download from URL
//!  ├─ 2. Convert   pdftohtml (version-pinned) → UTF-8 markup
//!  ├─ 3. Lines     styled lines with break counts and page numbers
//!  ├─ 4. Merge     undo soft wraps
//!  ├─ 5. Chunk     scene / heading / speech / other
//!  ├─ 6. Meta      chamber plus sitting start and end times
//!  └─ 7. Store     (optional) sitting + entries in SQLite
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use hansard_parser::{parse_pdf, ParserConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ParserConfig::default();
//!     let transcript = parse_pdf("hansard-2016-03-01.pdf", &config).await?;
//!     println!("{} sat from {:?}", transcript.meta.venue, transcript.meta.start_time);
//!     for chunk in &transcript.chunks {
//!         println!("[{}] {}", chunk.kind(), chunk.text());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! Markup that has already been converted can be parsed without any I/O
//! via [`parse_markup`].
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `hansard` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod output;
pub mod parse;
pub mod pipeline;
pub mod progress;
pub mod store;
pub mod stream;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConverterConfig, ParserConfig, ParserConfigBuilder, DEFAULT_PDFTOHTML_VERSION};
pub use error::{HansardError, Phase};
pub use output::{Chunk, ParsedTranscript, TranscriptMeta, Venue};
pub use parse::{check_converter, parse_markup, parse_pdf, parse_pdf_bytes, parse_pdf_sync};
pub use progress::{NoopProgressCallback, ParseProgressCallback, ProgressCallback};
pub use store::{Entry, ImportOutcome, Sitting, Source, SqliteStore};
pub use stream::{parse_stream, DocumentResult, TranscriptStream};
