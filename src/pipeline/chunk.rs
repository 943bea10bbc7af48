//! Chunking: classify merged lines into scenes, headings, speeches and the
//! rest.
//!
//! The transcripts follow a handful of layout conventions:
//!
//! | Layout                                   | Meaning              |
//! |------------------------------------------|----------------------|
//! | italic                                   | stage direction      |
//! | ALL CAPS                                 | section heading      |
//! | bold, immediately followed by plain text | speaker name         |
//! | plain text after a speaker name          | that speaker's words |
//!
//! The current speaker is carried from line to line in [`Chunker`]. A
//! heading or an unclassifiable line ends the speaker's turn.

use super::lines::{Line, Style};
use crate::output::Chunk;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// `(Mr. Kones): Thank you` — a speaker named in passing inside speech.
static RE_PAREN_SPEAKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\(([^)]+)\):(.*)$").unwrap());

static RE_LEADING_COLON: Lazy<Regex> = Lazy::new(|| Regex::new(r"^:\s*").unwrap());

/// Speaker state threaded through the lines of one document.
#[derive(Debug, Default)]
pub struct Chunker {
    speaker_name: String,
    speaker_title: String,
}

impl Chunker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify one line. `next` is the following line, if any; it is only
    /// peeked at, never consumed.
    pub fn step(&mut self, line: &Line, next: Option<&Line>) -> Option<Chunk> {
        let page_number = line.page_number;

        if line.is(&Style::Italic) {
            return Some(Chunk::Scene {
                text: line.text.clone(),
                page_number,
            });
        }

        let speaker = (line.is(&Style::Bold)
            && next.is_some_and(|n| n.is_untagged() && n.break_count == 0))
        .then(|| line.text.trim_matches(':').trim())
        .filter(|name| !name.is_empty());

        // An all-caps speaker line only escapes the heading rule with its colon.
        let caps_speaker = speaker.is_some() && line.text.trim_end().ends_with(':');
        if !caps_speaker && is_all_caps(&line.text) {
            self.clear();
            return Some(Chunk::Heading {
                text: line.text.clone(),
                page_number,
            });
        }

        if line.is_untagged() && !self.speaker_name.is_empty() {
            let text = self.speech_text(&line.text);
            return Some(Chunk::Speech {
                speaker_name: self.speaker_name.clone(),
                speaker_title: self.speaker_title.clone(),
                text,
                page_number,
            });
        }

        if let Some(name) = speaker {
            self.speaker_name = name.to_string();
            self.speaker_title.clear();
            return None;
        }

        self.clear();
        Some(Chunk::Other {
            text: line.text.clone(),
            page_number,
        })
    }

    /// Pull a parenthetical speaker out of the speech if there is one.
    fn speech_text(&mut self, text: &str) -> String {
        if let Some(caps) = RE_PAREN_SPEAKER.captures(text) {
            let name = caps[1].trim();
            if !name.is_empty() {
                self.speaker_title = std::mem::replace(&mut self.speaker_name, name.to_string());
                return caps[2].trim_start().to_string();
            }
        }
        RE_LEADING_COLON.replace(text, "").into_owned()
    }

    fn clear(&mut self) {
        self.speaker_name.clear();
        self.speaker_title.clear();
    }
}

/// Text that upper-casing leaves unchanged.
fn is_all_caps(text: &str) -> bool {
    !text.is_empty() && text.to_uppercase() == text
}

/// Run the chunker over a whole document.
pub fn chunk_lines(lines: &[Line]) -> Vec<Chunk> {
    let mut chunker = Chunker::new();
    let chunks: Vec<Chunk> = lines
        .iter()
        .enumerate()
        .filter_map(|(i, line)| chunker.step(line, lines.get(i + 1)))
        .collect();
    debug!("Chunked {} lines into {} chunks", lines.len(), chunks.len());
    chunks
}
