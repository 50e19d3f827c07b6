//! Bracket-aware string splitting.
//!
//! Condition and option cells embed delimiters inside parenthesized,
//! bracketed, braced, or quoted groups; splitting must only honor
//! delimiters at the top level. A single-character stack tracks the
//! currently open groups; quotes are self-closing. Unbalanced input is
//! tolerated: the best-effort split is returned and the imbalance
//! reported.

use tracing::warn;

/// Paired group openers and their closing characters.
const GROUP_PAIRS: &[(char, char)] = &[('(', ')'), ('[', ']'), ('{', '}'), ('"', '"')];

pub(crate) fn closing_for(ch: char) -> Option<char> {
    GROUP_PAIRS
        .iter()
        .find(|(open, _)| *open == ch)
        .map(|(_, close)| *close)
}

/// Result of a bracket-aware split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitOutcome {
    /// Trimmed parts, in input order. Never empty.
    pub parts: Vec<String>,
    /// False when the group stack was not empty at end of input.
    pub balanced: bool,
}

/// Split `input` at top-level occurrences of any delimiter, performing
/// at most `limit` splits when given.
pub fn split_outcome(input: &str, delimiters: &[&str], limit: Option<usize>) -> SplitOutcome {
    let mut stack: Vec<char> = Vec::new();
    let mut parts = Vec::new();
    let mut splits = 0usize;
    let mut last_split = 0usize;
    let mut i = 0usize;

    while i < input.len() {
        let ch = input[i..].chars().next().expect("char at boundary");
        if stack.last() == Some(&ch) {
            stack.pop();
            i += ch.len_utf8();
            continue;
        }
        if let Some(close) = closing_for(ch) {
            stack.push(close);
            i += ch.len_utf8();
            continue;
        }
        if stack.is_empty() && limit.is_none_or(|l| splits < l) {
            let matched = delimiters
                .iter()
                .find(|d| !d.is_empty() && input[i..].starts_with(**d));
            if let Some(delimiter) = matched {
                parts.push(input[last_split..i].trim().to_string());
                i += delimiter.len();
                last_split = i;
                splits += 1;
                continue;
            }
        }
        i += ch.len_utf8();
    }
    parts.push(input[last_split..].trim().to_string());

    SplitOutcome {
        parts,
        balanced: stack.is_empty(),
    }
}

/// Split at every top-level delimiter occurrence, logging a warning on
/// unbalanced input.
pub fn split_balanced(input: &str, delimiters: &[&str]) -> Vec<String> {
    let outcome = split_outcome(input, delimiters, None);
    if !outcome.balanced {
        warn!(input, "unbalanced quote or bracket group while splitting");
    }
    outcome.parts
}

/// Split once at the first top-level occurrence of `delimiter`.
/// Returns `None` when the delimiter never occurs at the top level.
pub fn partition_balanced(input: &str, delimiter: &str) -> Option<(String, String)> {
    let outcome = split_outcome(input, &[delimiter], Some(1));
    if !outcome.balanced {
        warn!(input, "unbalanced quote or bracket group while splitting");
    }
    let mut parts = outcome.parts.into_iter();
    let head = parts.next().expect("split yields at least one part");
    parts.next().map(|tail| (head, tail))
}
