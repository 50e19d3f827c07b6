//! Option list compilation.
//!
//! Turns an option-list cell into ordered answer options. Authors write
//! lists one-per-line, comma-separated, slash-separated, or
//! semicolon-separated; elements optionally carry a `code=label` or
//! `1 - label` value assignment. The literal element `other` is not an
//! option: it switches the question to a list with a free-text input.

use formdef_model::{AnswerOption, clean_title};

use crate::split::{partition_balanced, split_balanced};

/// Parsed option-list cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionListOutcome {
    pub options: Vec<AnswerOption>,
    /// True when the cell contained an `other` element.
    pub other_present: bool,
}

/// Compile an option-list cell. Parsing is pure: the same cell always
/// yields the same ordered options.
pub fn parse_option_list(cell: &str) -> OptionListOutcome {
    let mut outcome = OptionListOutcome::default();
    for element in split_elements(cell) {
        let element = element.trim();
        if element.is_empty() {
            continue;
        }
        if element.eq_ignore_ascii_case("other") {
            outcome.other_present = true;
            continue;
        }
        let (value, label) = split_value_label(element);
        let order = outcome.options.len() as u32 + 1;
        let mut option = AnswerOption::new(clean_title(&value).to_lowercase(), label, order);
        apply_label_markers(&mut option);
        outcome.options.push(option);
    }
    outcome
}

/// Choose the delimiter strategy: newline when present; otherwise comma
/// (with parenthesized qualifiers stripped first); otherwise slash when
/// slashes occur without commas; otherwise semicolon.
fn split_elements(cell: &str) -> Vec<String> {
    if cell.contains('\n') {
        return split_balanced(cell, &["\n"]);
    }
    if cell.contains(',') {
        let stripped: String = cell.chars().filter(|ch| !matches!(ch, '(' | ')')).collect();
        return split_balanced(&stripped, &[","]);
    }
    if cell.contains('/') {
        return split_balanced(cell, &["/"]);
    }
    split_balanced(cell, &[";"])
}

/// Split one element into value and label: `code=label`, a leading
/// `1 - label` numeric code, or the element itself as both.
fn split_value_label(element: &str) -> (String, String) {
    if let Some((code, label)) = partition_balanced(element, "=") {
        return (code.trim().to_string(), label.trim().to_string());
    }
    if let Some((code, label)) = numeric_code_prefix(element) {
        return (code, label);
    }
    (element.to_string(), element.to_string())
}

/// Match a leading `N - ` numeric code, as in `1 - Mild`.
fn numeric_code_prefix(element: &str) -> Option<(String, String)> {
    let (code, rest) = element.split_once(" - ")?;
    let code = code.trim();
    if code.is_empty() || !code.chars().all(|ch| ch.is_ascii_digit()) {
        return None;
    }
    let rest = rest.trim();
    if rest.is_empty() {
        return None;
    }
    Some((code.to_string(), rest.to_string()))
}

/// Flag sentinel labels used later to exclude options from
/// repeated-section enumeration.
fn apply_label_markers(option: &mut AnswerOption) {
    let label = option.label.trim().to_lowercase();
    if label == "none of the above" {
        option.none_of_the_above = true;
    }
    if matches!(label.as_str(), "n/a" | "not applicable" | "none") {
        option.not_applicable = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newline_separated_with_codes() {
        let outcome = parse_option_list("1=Yes\n2=No\nOther");
        assert!(outcome.other_present);
        assert_eq!(outcome.options.len(), 2);
        assert_eq!(outcome.options[0].value, "1");
        assert_eq!(outcome.options[0].label, "Yes");
        assert_eq!(outcome.options[0].order, 1);
        assert_eq!(outcome.options[1].value, "2");
        assert_eq!(outcome.options[1].label, "No");
        assert_eq!(outcome.options[1].order, 2);
    }

    #[test]
    fn comma_separated_strips_qualifiers() {
        let outcome = parse_option_list("Mild (1), Severe (2)");
        assert_eq!(outcome.options.len(), 2);
        assert_eq!(outcome.options[0].label, "Mild 1");
        assert_eq!(outcome.options[1].label, "Severe 2");
    }

    #[test]
    fn slash_separated_without_commas() {
        let outcome = parse_option_list("Yes/No/Unknown");
        let labels: Vec<&str> = outcome.options.iter().map(|o| o.label.as_str()).collect();
        assert_eq!(labels, vec!["Yes", "No", "Unknown"]);
    }

    #[test]
    fn semicolon_fallback() {
        let outcome = parse_option_list("alpha; beta");
        assert_eq!(outcome.options.len(), 2);
        assert_eq!(outcome.options[1].value, "beta");
    }

    #[test]
    fn numeric_code_prefix_is_split() {
        let outcome = parse_option_list("1 - Mild\n2 - Severe");
        assert_eq!(outcome.options[0].value, "1");
        assert_eq!(outcome.options[0].label, "Mild");
        assert_eq!(outcome.options[1].value, "2");
    }

    #[test]
    fn sentinel_labels_are_marked() {
        let outcome = parse_option_list("1=Yes\n2=None of the above\n3=N/A");
        assert!(!outcome.options[0].is_excluded_from_enumeration());
        assert!(outcome.options[1].none_of_the_above);
        assert!(outcome.options[2].not_applicable);
    }

    #[test]
    fn empty_elements_are_skipped() {
        let outcome = parse_option_list("a\n\nb\n");
        assert_eq!(outcome.options.len(), 2);
        assert_eq!(outcome.options[1].order, 2);
    }

    #[test]
    fn parsing_is_idempotent() {
        let cell = "1=Yes\n2=No\nOther";
        assert_eq!(parse_option_list(cell), parse_option_list(cell));
    }
}
