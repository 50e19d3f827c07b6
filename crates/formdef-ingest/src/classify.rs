//! Row classification.
//!
//! Maps a row's declared type cell to one of a closed set of row kinds
//! through an ordered pattern table. Structural markers (section and
//! matrix declarations) come first so that a compound cell like
//! `matrix start decimal` is never mis-read as a decimal question; the
//! trailing sub-type is handed back for the builder to interpret.
//! Unrecognized cells classify as the default kind and are reported as
//! warnings, never errors: unclassifiable rows still become free-text
//! questions.

use formdef_model::DataType;
use tracing::{debug, warn};

use crate::headers::HeaderConfig;
use crate::table::Row;

/// Semantic kind of one input row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    /// Unrecognized or absent type; treated as free text.
    Default,
    Text,
    Date,
    Time,
    Boolean,
    Decimal,
    Long,
    Vocabulary,
    File,
    Computed,
    List,
    Information,
    SectionStart,
    SectionEnd,
    SectionRecurrent,
    SectionRepeated,
    MatrixStart,
    MatrixEnd,
}

impl RowKind {
    pub fn is_section_marker(self) -> bool {
        matches!(
            self,
            Self::SectionStart | Self::SectionEnd | Self::SectionRecurrent | Self::SectionRepeated
        )
    }

    pub fn is_matrix_marker(self) -> bool {
        matches!(self, Self::MatrixStart | Self::MatrixEnd)
    }

    /// Section and matrix markers shape the tree instead of creating
    /// questions.
    pub fn is_structural(self) -> bool {
        self.is_section_marker() || self.is_matrix_marker()
    }

    /// The answer data type implied by this kind, for question-bearing
    /// rows. Computed questions are typed as text; the builder adds the
    /// computed entry mode.
    pub fn data_type(self) -> Option<DataType> {
        match self {
            Self::Default | Self::Text | Self::List | Self::Information | Self::Computed => {
                Some(DataType::Text)
            }
            Self::Date => Some(DataType::Date),
            Self::Time => Some(DataType::Time),
            Self::Boolean => Some(DataType::Boolean),
            Self::Decimal => Some(DataType::Decimal),
            Self::Long => Some(DataType::Long),
            Self::Vocabulary => Some(DataType::Vocabulary),
            Self::File => Some(DataType::File),
            _ => None,
        }
    }
}

/// Answer-count qualifier parsed from a trailing `(single)` /
/// `(multiple)` marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Multiplicity {
    Single,
    Multiple,
}

/// Result of classifying one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedRow {
    pub kind: RowKind,
    /// Trailing text after a prefix-matched keyword: the shared type of
    /// a matrix, a date/time format, or a vocabulary filter list.
    pub subtype: Option<String>,
    pub multiplicity: Option<Multiplicity>,
}

impl ClassifiedRow {
    fn plain(kind: RowKind) -> Self {
        Self {
            kind,
            subtype: None,
            multiplicity: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MatchMode {
    Exact,
    Prefix,
}

struct RowTypePattern {
    pattern: &'static str,
    mode: MatchMode,
    kind: RowKind,
}

const fn exact(pattern: &'static str, kind: RowKind) -> RowTypePattern {
    RowTypePattern {
        pattern,
        mode: MatchMode::Exact,
        kind,
    }
}

const fn prefix(pattern: &'static str, kind: RowKind) -> RowTypePattern {
    RowTypePattern {
        pattern,
        mode: MatchMode::Prefix,
        kind,
    }
}

/// Ordered classification table. Structural markers pre-empt data
/// kinds; longer keywords precede the keywords they start with.
const ROW_TYPE_TABLE: &[RowTypePattern] = &[
    prefix("matrix start", RowKind::MatrixStart),
    exact("matrix end", RowKind::MatrixEnd),
    exact("section start", RowKind::SectionStart),
    exact("section end", RowKind::SectionEnd),
    exact("section", RowKind::SectionStart),
    exact("recurrent section", RowKind::SectionRecurrent),
    exact("repeated section", RowKind::SectionRepeated),
    exact("datetime", RowKind::Date),
    prefix("date", RowKind::Date),
    prefix("time", RowKind::Time),
    prefix("vocabulary", RowKind::Vocabulary),
    exact("info box", RowKind::Information),
    exact("info", RowKind::Information),
    exact("information", RowKind::Information),
    prefix("list", RowKind::List),
    exact("text", RowKind::Text),
    exact("text field", RowKind::Text),
    exact("string", RowKind::Text),
    exact("boolean", RowKind::Boolean),
    exact("decimal", RowKind::Decimal),
    exact("numeric", RowKind::Decimal),
    exact("number", RowKind::Decimal),
    exact("long", RowKind::Long),
    exact("integer", RowKind::Long),
    exact("file", RowKind::File),
    exact("file upload", RowKind::File),
    prefix("computed", RowKind::Computed),
    exact("calculated", RowKind::Computed),
];

/// Split a trailing parenthesized qualifier off a type cell, reading a
/// single/multiple marker when present: `decimal (single)` matches the
/// `decimal` pattern with `Multiplicity::Single`.
fn strip_qualifier(cell: &str) -> (&str, Option<Multiplicity>) {
    let trimmed = cell.trim();
    if !trimmed.ends_with(')') {
        return (trimmed, None);
    }
    let Some(open) = trimmed.rfind('(') else {
        return (trimmed, None);
    };
    let qualifier = trimmed[open + 1..trimmed.len() - 1].to_lowercase();
    let multiplicity = if qualifier.contains("multiple") {
        Some(Multiplicity::Multiple)
    } else if qualifier.contains("single") {
        Some(Multiplicity::Single)
    } else {
        None
    };
    (trimmed[..open].trim_end(), multiplicity)
}

/// Classify a type cell against the pattern table.
pub fn classify_type_cell(cell: &str) -> ClassifiedRow {
    let (stripped, multiplicity) = strip_qualifier(cell);
    let lowered = stripped.to_ascii_lowercase();
    for entry in ROW_TYPE_TABLE {
        let matched = match entry.mode {
            MatchMode::Exact => lowered == entry.pattern,
            MatchMode::Prefix => {
                lowered.starts_with(entry.pattern)
                    && lowered[entry.pattern.len()..]
                        .chars()
                        .next()
                        .is_none_or(char::is_whitespace)
            }
        };
        if matched {
            let rest = stripped[entry.pattern.len()..].trim();
            return ClassifiedRow {
                kind: entry.kind,
                subtype: (!rest.is_empty()).then(|| rest.to_string()),
                multiplicity,
            };
        }
    }
    ClassifiedRow {
        kind: RowKind::Default,
        subtype: None,
        multiplicity,
    }
}

/// Classify one row using the configured type column.
pub fn classify_row(row: &Row<'_>, headers: &HeaderConfig) -> ClassifiedRow {
    match row.value(&headers.question_type) {
        Some(cell) => {
            let classified = classify_type_cell(cell);
            if classified.kind == RowKind::Default {
                warn!(row = row.number(), cell, "unrecognized question type, defaulting to text");
            }
            classified
        }
        None => {
            debug!(row = row.number(), "row carries no question type");
            ClassifiedRow::plain(RowKind::Default)
        }
    }
}
