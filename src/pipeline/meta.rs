//! Sitting metadata: which chamber sat, and when it met and rose.
//!
//! Each chamber announces its sittings in its own words:
//!
//! * National Assembly: `The House met at 10.15 a.m.`
//! * Senate: `The Senate met at the Senate Chamber, Parliament Buildings,
//!   at 2.30 p.m.` (and sometimes `The House met ...`)
//! * Joint sitting: `Parliament met at Fifty eight minutes past Nine
//!   o'clock in the National Assembly Chamber`
//!
//! The Senate grammar also accepts every National Assembly announcement, so
//! the grammars are always tried in [`Grammar::PRIORITY`] order.

use super::time::normalise_time;
use crate::error::HansardError;
use crate::output::{Chunk, TranscriptMeta, Venue};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info};

static RE_NATIONAL_ASSEMBLY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?x)
        The\ House\s
        (?P<action>met|rose)\s
        (?:at\ )?
        (?P<time>\d+\.\d+\ [ap].m.)",
    )
    .unwrap()
});

static RE_SENATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?x)
        The\ (?:House|Senate)\s
        (?P<action>met|rose)
        (?:
            \ at\ the\ Senate\ Chambers?
            (?:,\ (?:Main\ )?Parliament\ Buildings,)?
        )?
        (?:\ at\ )?
        (?P<time>\d+\.\d+\ [ap].m.)",
    )
    .unwrap()
});

static RE_JOINT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?x)
        Parliament\s
        (?P<action>met|rose)\s
        at\s
        (?P<time>
            (?:(?:[A-Za-z\-\ ]+\ minutes?\ (?:past|to)\ )?[A-Za-z]+\ o['’]clock)
            |
            (?:\d+\.\d+\ [ap].m.)
        )
        (?:\ in\ the\ National\ Assembly\ Chamber)?",
    )
    .unwrap()
});

/// A sitting announcement grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grammar {
    NationalAssembly,
    Senate,
    JointSitting,
}

/// Whether an announcement opens or closes the sitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Met,
    Rose,
}

/// One matched announcement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Announcement<'a> {
    pub action: Action,
    pub time: &'a str,
}

impl Grammar {
    /// Detection order. Senate must come after National Assembly.
    pub const PRIORITY: [Grammar; 3] = [
        Grammar::NationalAssembly,
        Grammar::Senate,
        Grammar::JointSitting,
    ];

    fn regex(self) -> &'static Regex {
        match self {
            Grammar::NationalAssembly => &*RE_NATIONAL_ASSEMBLY,
            Grammar::Senate => &*RE_SENATE,
            Grammar::JointSitting => &*RE_JOINT,
        }
    }

    /// Chamber a sitting announced in this grammar belongs to.
    pub fn venue(self) -> Venue {
        match self {
            Grammar::NationalAssembly | Grammar::JointSitting => Venue::NationalAssembly,
            Grammar::Senate => Venue::Senate,
        }
    }

    /// Does the announcement appear anywhere in `text`?
    pub fn found_in(self, text: &str) -> bool {
        self.regex().is_match(text)
    }

    /// Match an announcement at the very start of `text`.
    pub fn announcement(self, text: &str) -> Option<Announcement<'_>> {
        let caps = self.regex().captures(text)?;
        if caps.get(0)?.start() != 0 {
            return None;
        }
        let action = match &caps["action"] {
            "met" => Action::Met,
            _ => Action::Rose,
        };
        Some(Announcement {
            action,
            time: caps.name("time")?.as_str(),
        })
    }

    /// First grammar, in priority order, that `text` contains.
    pub fn classify(text: &str) -> Option<Grammar> {
        Grammar::PRIORITY.into_iter().find(|g| g.found_in(text))
    }
}

/// Work out the venue and sitting times of a chunked transcript.
///
/// The first chunk containing any announcement fixes the grammar. Every
/// chunk that then starts with an announcement in that grammar updates the
/// start (`met`) or end (`rose`) time; later announcements win.
///
/// # Errors
/// * [`HansardError::NoVenue`] when no chunk contains an announcement.
/// * [`HansardError::UnparseableTime`] when an announced time is malformed.
pub fn extract_meta(chunks: &[Chunk]) -> Result<TranscriptMeta, HansardError> {
    let grammar = chunks
        .iter()
        .find_map(|chunk| Grammar::classify(chunk.text()))
        .ok_or(HansardError::NoVenue {
            chunks: chunks.len(),
        })?;
    debug!("Announcement grammar: {:?}", grammar);

    let mut meta = TranscriptMeta {
        venue: grammar.venue(),
        start_time: None,
        end_time: None,
    };

    for chunk in chunks {
        let Some(announcement) = grammar.announcement(chunk.text()) else {
            continue;
        };
        let time = normalise_time(announcement.time)?;
        match announcement.action {
            Action::Met => meta.start_time = Some(time),
            Action::Rose => meta.end_time = Some(time),
        }
    }

    info!(
        "Sitting of the {}: {} to {}",
        meta.venue,
        meta.start_time
            .map(|t| t.to_string())
            .unwrap_or_else(|| "?".into()),
        meta.end_time
            .map(|t| t.to_string())
            .unwrap_or_else(|| "?".into()),
    );
    Ok(meta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn other(text: &str) -> Chunk {
        Chunk::Other {
            text: text.to_string(),
            page_number: 1,
        }
    }

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_national_assembly_grammar() {
        let a = Grammar::NationalAssembly
            .announcement("The House met at 10.15 a.m.")
            .unwrap();
        assert_eq!(a.action, Action::Met);
        assert_eq!(a.time, "10.15 a.m.");
        let a = Grammar::NationalAssembly
            .announcement("The House rose at 6.45 p.m.")
            .unwrap();
        assert_eq!(a.action, Action::Rose);
    }

    #[test]
    fn test_senate_grammar_variants() {
        let g = Grammar::Senate;
        assert_eq!(g.announcement("The Senate met at 10.15 a.m.").unwrap().action, Action::Met);
        assert_eq!(
            g.announcement("The House met at the Senate Chamber at 10.15 a.m.")
                .unwrap()
                .time,
            "10.15 a.m."
        );
        assert_eq!(
            g.announcement("The House met at the Senate Chamber, Parliament Buildings, at 10.15 a.m.")
                .unwrap()
                .time,
            "10.15 a.m."
        );
        assert_eq!(
            g.announcement(
                "The House met at the Senate Chambers, Parliament Buildings, at 2.30 p.m. \
                 [The Speaker (Hon. Ethuro) in the Chair]"
            )
            .unwrap()
            .action,
            Action::Met
        );
        assert_eq!(
            g.announcement("The Senate met at the Senate Chamber, Main Parliament Buildings, at 2.30 p.m.")
                .unwrap()
                .action,
            Action::Met
        );
        assert_eq!(g.announcement("The Senate rose at 6.45 p.m.").unwrap().action, Action::Rose);
    }

    #[test]
    fn test_joint_sitting_grammar() {
        let g = Grammar::JointSitting;
        let a = g.announcement("Parliament rose at 6.45 p.m.").unwrap();
        assert_eq!((a.action, a.time), (Action::Rose, "6.45 p.m."));
        let a = g
            .announcement("Parliament met at Fifty eight minutes past Nine o'clock in the National Assembly Chamber")
            .unwrap();
        assert_eq!(a.action, Action::Met);
        assert_eq!(a.time, "Fifty eight minutes past Nine o'clock");
    }

    #[test]
    fn test_national_assembly_wins_over_senate() {
        let text = "The House met at 10.15 a.m.";
        assert!(Grammar::Senate.found_in(text));
        assert_eq!(Grammar::classify(text), Some(Grammar::NationalAssembly));
        let meta = extract_meta(&[other(text)]).unwrap();
        assert_eq!(meta.venue, Venue::NationalAssembly);
    }

    #[test]
    fn test_senate_venue() {
        let meta = extract_meta(&[
            other("The Senate met at the Senate Chamber, Parliament Buildings, at 2.30 p.m."),
            other("The Senate rose at 6.30 p.m."),
        ])
        .unwrap();
        assert_eq!(meta.venue, Venue::Senate);
        assert_eq!(meta.start_time, Some(hm(14, 30)));
        assert_eq!(meta.end_time, Some(hm(18, 30)));
    }

    #[test]
    fn test_joint_sitting_resolves_to_national_assembly() {
        let meta = extract_meta(&[other(
            "Parliament met at Fifty eight minutes past Nine o'clock in the National Assembly Chamber",
        )])
        .unwrap();
        assert_eq!(meta.venue, Venue::NationalAssembly);
        assert_eq!(meta.start_time, Some(hm(9, 58)));
        assert_eq!(meta.end_time, None);
    }

    #[test]
    fn test_last_announcement_wins() {
        let meta = extract_meta(&[
            other("The House met at 9.30 a.m."),
            other("The House rose at 12.45 p.m."),
            other("The House met at 2.30 p.m."),
            other("The House rose at 6.30 p.m."),
        ])
        .unwrap();
        assert_eq!(meta.start_time, Some(hm(14, 30)));
        assert_eq!(meta.end_time, Some(hm(18, 30)));
    }

    #[test]
    fn test_detection_anywhere_extraction_at_start() {
        let meta = extract_meta(&[
            other("[Note] The House met at 9.30 a.m."),
            other("The House rose at 1.00 p.m."),
        ])
        .unwrap();
        assert_eq!(meta.venue, Venue::NationalAssembly);
        assert_eq!(meta.start_time, None);
        assert_eq!(meta.end_time, Some(hm(13, 0)));
    }

    #[test]
    fn test_no_venue() {
        let err = extract_meta(&[other("Prayers"), other("Nothing here")]).unwrap_err();
        assert!(matches!(err, HansardError::NoVenue { chunks: 2 }), "got: {err:?}");
    }

    #[test]
    fn test_bad_time_is_distinct_from_no_venue() {
        let err = extract_meta(&[other("Parliament met at Umpteen o'clock")]).unwrap_err();
        assert!(
            matches!(err, HansardError::UnparseableTime { ref input } if input == "Umpteen o'clock"),
            "got: {err:?}"
        );
    }
}
