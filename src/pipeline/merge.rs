//! Line merging: undo the converter's soft wraps.
//!
//! pdftohtml breaks every visual line, so one sentence of speech arrives as
//! several lines separated by a single `<br>`. A candidate line is folded
//! into the last kept line when either
//!
//! * it has the same style and at most one break before it, or
//! * it is italic, directly follows untagged text with no break, and is
//!   therefore an inline annotation rather than a stage direction.
//!
//! The merged line keeps the style, break count and page of its first part.
//! Neither test looks at anything merging can change, so one forward pass
//! reaches the fixed point.

use super::lines::{Line, Style};
use once_cell::sync::Lazy;
use regex::Regex;

static RE_SPACE_COMMA: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+,").unwrap());

/// Would `candidate` be folded into `previous`?
pub fn should_merge(previous: &Line, candidate: &Line) -> bool {
    let same_style = candidate.break_count <= 1 && candidate.style == previous.style;
    let inline_italic = candidate.break_count == 0
        && candidate.is(&Style::Italic)
        && previous.is_untagged();
    same_style || inline_italic
}

/// Merge soft-wrapped lines.
pub fn merge_lines(lines: Vec<Line>) -> Vec<Line> {
    let mut merged: Vec<Line> = Vec::with_capacity(lines.len());

    for line in lines {
        match merged.last_mut() {
            Some(previous) if should_merge(previous, &line) => {
                previous.text.push(' ');
                previous.text.push_str(&line.text);
                previous.text = RE_SPACE_COMMA.replace_all(&previous.text, ",").into_owned();
            }
            _ => merged.push(line),
        }
    }

    merged
}
