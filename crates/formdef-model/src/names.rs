//! Name and title normalization for tree nodes.

/// Maximum length of a generated node name.
const NAME_MAX_LENGTH: usize = 40;

/// Clean a title for display: trimmed, with path separators removed.
pub fn clean_title(raw: &str) -> String {
    raw.trim().replace('/', "")
}

/// Clean a string for use as a node name.
///
/// Slashes become dashes; colons, brackets, parentheses, spaces, commas
/// and quotes are dropped; the result is truncated to 40 characters.
pub fn clean_name(raw: &str) -> String {
    raw.trim()
        .replace('/', "-")
        .chars()
        .filter(|ch| !matches!(ch, ':' | '(' | ')' | '[' | ']' | '{' | '}' | ' ' | ',' | '"'))
        .take(NAME_MAX_LENGTH)
        .collect()
}

/// Resolve a name collision against an existing sibling set by
/// suffixing a counter starting at 2.
pub fn unique_name(base: &str, taken: impl Fn(&str) -> bool) -> String {
    if !taken(base) {
        return base.to_string();
    }
    let mut counter = 2u32;
    loop {
        let candidate = format!("{base}{counter}");
        if !taken(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_name_strips_punctuation() {
        assert_eq!(clean_name("Heart rate (bpm)"), "Heartratebpm");
        assert_eq!(clean_name("a/b test"), "a-btest");
        assert_eq!(clean_name("  spaced  "), "spaced");
    }

    #[test]
    fn clean_name_truncates() {
        let long = "x".repeat(60);
        assert_eq!(clean_name(&long).len(), 40);
    }

    #[test]
    fn clean_title_keeps_spaces() {
        assert_eq!(clean_title(" Vital Signs / Baseline "), "Vital Signs  Baseline");
    }

    #[test]
    fn unique_name_suffixes_counter() {
        let taken = ["age".to_string(), "age2".to_string()];
        let is_taken = |name: &str| taken.iter().any(|t| t == name);
        assert_eq!(unique_name("age", is_taken), "age3");
        assert_eq!(unique_name("sex", is_taken), "sex");
    }
}
