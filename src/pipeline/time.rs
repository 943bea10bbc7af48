//! Time normalisation: turn a sitting announcement's time phrase into a
//! canonical 24-hour [`NaiveTime`].
//!
//! Two phrasings appear in the transcripts:
//!
//! * the clock form, `10.15 a.m.` / `6.45 p.m.`;
//! * the spoken form used for joint sittings,
//!   `Fifty eight minutes past Nine o'clock`.
//!
//! The spoken form carries no a.m./p.m. marker, so any hour before eight is
//! read as an evening hour. Seconds are always zero.

use crate::error::HansardError;
use chrono::NaiveTime;
use once_cell::sync::Lazy;
use regex::Regex;

static RE_CLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]+)\.([0-9]+) ([ap])").unwrap());

static RE_SPOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:(?P<minutes>[A-Za-z\- ]+) minutes? (?P<qualifier>past|to) )?(?P<hour>[A-Za-z]+) o['’]clock",
    )
    .unwrap()
});

/// Hours before this in the spoken form are taken to be p.m.
const SPOKEN_EVENING_CUTOFF: i64 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Meridiem {
    Am,
    Pm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Qualifier {
    Past,
    To,
}

/// A recognised, not yet normalised, time phrase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimePhrase {
    /// `H.MM a.m.` / `H.MM p.m.`
    Clock {
        hour: u32,
        minute: u32,
        meridiem: Meridiem,
    },
    /// `[<minutes> minutes past|to ]<hour> o'clock`
    Spoken {
        minutes: u32,
        qualifier: Qualifier,
        hour: u32,
    },
}

impl TimePhrase {
    /// Recognise either phrasing at the start of `input`.
    ///
    /// The clock form is tried first. Returns `None` when neither form
    /// matches or a spoken number word is not in the table.
    pub fn recognise(input: &str) -> Option<Self> {
        if let Some(caps) = RE_CLOCK.captures(input) {
            let hour = caps[1].parse().ok()?;
            let minute = caps[2].parse().ok()?;
            let meridiem = if &caps[3] == "p" {
                Meridiem::Pm
            } else {
                Meridiem::Am
            };
            return Some(TimePhrase::Clock {
                hour,
                minute,
                meridiem,
            });
        }

        let caps = RE_SPOKEN.captures(input)?;
        let hour = number_words_to_int(&caps["hour"])?;
        let minutes = match caps.name("minutes") {
            Some(m) => number_words_to_int(m.as_str())?,
            None => 0,
        };
        let qualifier = match caps.name("qualifier").map(|q| q.as_str()) {
            Some("to") => Qualifier::To,
            _ => Qualifier::Past,
        };
        Some(TimePhrase::Spoken {
            minutes,
            qualifier,
            hour,
        })
    }

    /// Resolve to a wall-clock time, or `None` if the result is out of range.
    pub fn to_time(self) -> Option<NaiveTime> {
        let (hour, minute) = match self {
            TimePhrase::Clock {
                hour,
                minute,
                meridiem,
            } => {
                let mut hour = i64::from(hour);
                if meridiem == Meridiem::Pm && hour < 12 {
                    hour += 12;
                }
                (hour, i64::from(minute))
            }
            TimePhrase::Spoken {
                minutes,
                qualifier,
                hour,
            } => {
                let (mut hour, minute) = match qualifier {
                    Qualifier::Past => (i64::from(hour), i64::from(minutes)),
                    Qualifier::To => (i64::from(hour) - 1, 60 - i64::from(minutes)),
                };
                if hour < SPOKEN_EVENING_CUTOFF {
                    hour += 12;
                }
                (hour, minute)
            }
        };

        let hour = u32::try_from(hour).ok()?;
        let minute = u32::try_from(minute).ok()?;
        NaiveTime::from_hms_opt(hour, minute, 0)
    }
}

/// Normalise a time phrase to a canonical 24-hour time.
///
/// # Errors
/// [`HansardError::UnparseableTime`] carrying `input` when the phrase is in
/// neither form or resolves outside `00:00–23:59`.
pub fn normalise_time(input: &str) -> Result<NaiveTime, HansardError> {
    TimePhrase::recognise(input)
        .and_then(TimePhrase::to_time)
        .ok_or_else(|| HansardError::UnparseableTime {
            input: input.to_string(),
        })
}

/// Resolve a spelled-out quantity such as `Fifty-eight` or `twenty five`.
///
/// Tokens are summed left to right; there is no multiplicative scale, which
/// is all the minute and hour words in the transcripts need.
fn number_words_to_int(words: &str) -> Option<u32> {
    let words = words.replace('-', " ").to_lowercase();
    words
        .split_whitespace()
        .try_fold(0u32, add_number_word)
}

fn add_number_word(total: u32, word: &str) -> Option<u32> {
    total.checked_add(number_word_value(word)?)
}

fn number_word_value(word: &str) -> Option<u32> {
    const UNITS: [&str; 20] = [
        "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
        "eleven", "twelve", "thirteen", "fourteen", "fifteen", "sixteen", "seventeen",
        "eighteen", "nineteen",
    ];
    const TENS: [&str; 4] = ["twenty", "thirty", "forty", "fifty"];

    if let Some(idx) = UNITS.iter().position(|&u| u == word) {
        return Some(idx as u32);
    }
    TENS.iter()
        .position(|&t| t == word)
        .map(|idx| (idx as u32 + 2) * 10)
}
