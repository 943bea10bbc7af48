//! Pipeline stages for transcript parsing.
//!
//! Each submodule implements exactly one transformation step. Only
//! [`input`] and [`pdftohtml`] touch the outside world; everything from
//! [`lines`] onwards is a pure function of the markup.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ pdftohtml ──▶ lines ──▶ merge ──▶ chunk ──▶ meta
//! (URL/path) (markup)    (styled)  (unwrap)  (speech)   (venue, times)
//!                                                        │
//!                                                        ▼
//!                                                       time
//! ```
//!
//! 1. [`input`]     — resolve a path or URL to a local PDF
//! 2. [`pdftohtml`] — run the pinned converter and scrub its output
//! 3. [`lines`]     — flatten the `<body>` into styled lines with page numbers
//! 4. [`merge`]     — fold soft-wrapped lines back together
//! 5. [`chunk`]     — classify lines as scene, heading, speech or other
//! 6. [`meta`]      — detect the chamber and the sitting's start/end times
//! 7. [`time`]      — normalise clock and spoken times

pub mod chunk;
pub mod input;
pub mod lines;
pub mod merge;
pub mod meta;
pub mod pdftohtml;
pub mod time;
