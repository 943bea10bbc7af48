//! Output types: what a parse run hands to its caller.
//!
//! These are plain data. Nothing in the pipeline mutates a
//! [`ParsedTranscript`] after the chunker and metadata extractor have built
//! it; the store maps it onto sitting and entry rows without taking
//! ownership.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The legislative chamber a sitting belongs to.
///
/// Joint sittings are published by both Houses and are attributed to the
/// National Assembly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Venue {
    NationalAssembly,
    Senate,
}

impl Venue {
    /// Stable slug used as the venue key in the store.
    pub fn slug(&self) -> &'static str {
        match self {
            Venue::NationalAssembly => "national_assembly",
            Venue::Senate => "senate",
        }
    }

    /// Human-readable chamber name.
    pub fn name(&self) -> &'static str {
        match self {
            Venue::NationalAssembly => "National Assembly",
            Venue::Senate => "Senate",
        }
    }

    /// All venues, in the order they are seeded into the store.
    pub fn all() -> [Venue; 2] {
        [Venue::NationalAssembly, Venue::Senate]
    }
}

impl fmt::Display for Venue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One typed unit of transcript content. Maps 1:1 to a stored entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Chunk {
    /// Stage direction, e.g. *(Applause)*.
    Scene { text: String, page_number: u32 },
    /// All-caps section heading.
    Heading { text: String, page_number: u32 },
    /// Words attributed to a speaker. `speaker_name` is never empty.
    Speech {
        speaker_name: String,
        speaker_title: String,
        text: String,
        page_number: u32,
    },
    /// Anything the chunker could not classify.
    Other { text: String, page_number: u32 },
}

impl Chunk {
    /// Entry type string as persisted: `scene`, `heading`, `speech`, `other`.
    pub fn kind(&self) -> &'static str {
        match self {
            Chunk::Scene { .. } => "scene",
            Chunk::Heading { .. } => "heading",
            Chunk::Speech { .. } => "speech",
            Chunk::Other { .. } => "other",
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Chunk::Scene { text, .. }
            | Chunk::Heading { text, .. }
            | Chunk::Speech { text, .. }
            | Chunk::Other { text, .. } => text,
        }
    }

    pub fn page_number(&self) -> u32 {
        match self {
            Chunk::Scene { page_number, .. }
            | Chunk::Heading { page_number, .. }
            | Chunk::Speech { page_number, .. }
            | Chunk::Other { page_number, .. } => *page_number,
        }
    }

    /// Speaker name for speeches, empty for everything else.
    pub fn speaker_name(&self) -> &str {
        match self {
            Chunk::Speech { speaker_name, .. } => speaker_name,
            _ => "",
        }
    }

    /// Speaker title for speeches, empty for everything else.
    pub fn speaker_title(&self) -> &str {
        match self {
            Chunk::Speech { speaker_title, .. } => speaker_title,
            _ => "",
        }
    }
}

/// Sitting-level metadata. Exactly one per document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptMeta {
    pub venue: Venue,
    /// Time of the last "met" announcement, if any.
    pub start_time: Option<NaiveTime>,
    /// Time of the last "rose" announcement, if any.
    pub end_time: Option<NaiveTime>,
}

/// The complete result of parsing one transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedTranscript {
    pub meta: TranscriptMeta,
    /// Chunks in document order; `page_number` never decreases.
    pub chunks: Vec<Chunk>,
}

impl ParsedTranscript {
    /// Number of speech chunks.
    pub fn speech_count(&self) -> usize {
        self.chunks
            .iter()
            .filter(|c| matches!(c, Chunk::Speech { .. }))
            .count()
    }

    /// Last page number seen, or 0 for an empty transcript.
    pub fn last_page(&self) -> u32 {
        self.chunks.last().map(Chunk::page_number).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_serialises_with_entry_type_tag() {
        let chunk = Chunk::Speech {
            speaker_name: "Mr. Speaker".into(),
            speaker_title: String::new(),
            text: "Order, order.".into(),
            page_number: 3,
        };
        let json = serde_json::to_value(&chunk).unwrap();
        assert_eq!(json["type"], "speech");
        assert_eq!(json["speaker_name"], "Mr. Speaker");
        assert_eq!(json["page_number"], 3);
    }

    #[test]
    fn non_speech_chunks_have_empty_speaker_fields() {
        let chunk = Chunk::Scene {
            text: "(Applause)".into(),
            page_number: 1,
        };
        assert_eq!(chunk.kind(), "scene");
        assert_eq!(chunk.speaker_name(), "");
        assert_eq!(chunk.speaker_title(), "");
    }

    #[test]
    fn venue_slugs_are_stable() {
        assert_eq!(Venue::NationalAssembly.slug(), "national_assembly");
        assert_eq!(Venue::Senate.slug(), "senate");
        let json = serde_json::to_string(&Venue::NationalAssembly).unwrap();
        assert_eq!(json, "\"national_assembly\"");
    }
}
