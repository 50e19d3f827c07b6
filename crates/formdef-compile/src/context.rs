//! Per-compilation state.
//!
//! Every compilation run owns its own symbol table, pending-reference
//! worklist, and diagnostics; nothing leaks across runs, so independent
//! tables can be compiled in parallel without coordination.

use std::collections::{BTreeMap, BTreeSet};

use formdef_model::Diagnostics;

/// Run-scoped map from question display text to generated internal
/// name, plus the set of all names handed out so far.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    by_text: BTreeMap<String, String>,
    names: BTreeSet<String>,
}

impl SymbolTable {
    /// Register a question under its display text. Lookup is
    /// case-insensitive; the first registration of a text wins.
    pub fn register(&mut self, display_text: &str, name: &str) {
        self.by_text
            .entry(display_text.trim().to_lowercase())
            .or_insert_with(|| name.to_string());
        self.names.insert(name.to_string());
    }

    /// Resolve a display text to the question's internal name.
    pub fn resolve_text(&self, display_text: &str) -> Option<&str> {
        self.by_text
            .get(&display_text.trim().to_lowercase())
            .map(String::as_str)
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Claim an unused internal name, suffixing a counter on collision.
    pub fn claim_name(&mut self, base: &str) -> String {
        let name = formdef_model::unique_name(base, |candidate| self.names.contains(candidate));
        self.names.insert(name.clone());
        name
    }

    pub fn clear(&mut self) {
        self.by_text.clear();
        self.names.clear();
    }
}

/// A conditional operand that referenced a display text not yet in the
/// symbol table when it was parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingReference {
    pub display_text: String,
    pub row: Option<usize>,
}

/// Compile-level options stamped onto each new questionnaire.
#[derive(Debug, Clone)]
pub struct CompileOptions {
    pub paginate: bool,
    pub required_subject_types: Vec<String>,
    pub max_per_subject: Option<u32>,
    /// Default every question to a single answer.
    pub single_answer_default: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            paginate: false,
            required_subject_types: vec!["/SubjectTypes/Patient".to_string()],
            max_per_subject: None,
            single_answer_default: true,
        }
    }
}

impl CompileOptions {
    pub fn with_paginate(mut self, paginate: bool) -> Self {
        self.paginate = paginate;
        self
    }

    pub fn with_subject_types(mut self, types: Vec<String>) -> Self {
        self.required_subject_types = types;
        self
    }

    pub fn with_max_per_subject(mut self, max: Option<u32>) -> Self {
        self.max_per_subject = max;
        self
    }

    pub fn with_single_answer_default(mut self, enabled: bool) -> Self {
        self.single_answer_default = enabled;
        self
    }
}

/// State owned by one compilation run.
#[derive(Debug, Clone, Default)]
pub struct CompileContext {
    pub options: CompileOptions,
    pub symbols: SymbolTable,
    pub pending: Vec<PendingReference>,
    pub diagnostics: Diagnostics,
    /// Spreadsheet row currently being processed, for diagnostics.
    pub current_row: Option<usize>,
}

impl CompileContext {
    pub fn new(options: CompileOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Record a warning against the row being processed.
    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        match self.current_row {
            Some(row) => {
                tracing::warn!(row, "{message}");
                self.diagnostics.warn_at(row, message);
            }
            None => {
                tracing::warn!("{message}");
                self.diagnostics.warn(message);
            }
        }
    }

    /// Note an operand awaiting a question declared later in the input.
    pub fn push_pending(&mut self, display_text: &str) {
        self.pending.push(PendingReference {
            display_text: display_text.to_string(),
            row: self.current_row,
        });
    }

    /// Reset questionnaire-scoped state when a new questionnaire
    /// starts.
    pub fn clear_questionnaire_state(&mut self) {
        self.symbols.clear();
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_lookup_is_case_insensitive() {
        let mut symbols = SymbolTable::default();
        symbols.register("Date of Birth", "date_of_birth");
        assert_eq!(symbols.resolve_text("date of birth"), Some("date_of_birth"));
        assert_eq!(symbols.resolve_text("DATE OF BIRTH "), Some("date_of_birth"));
        assert!(symbols.contains_name("date_of_birth"));
    }

    #[test]
    fn first_registration_wins() {
        let mut symbols = SymbolTable::default();
        symbols.register("Age", "age");
        symbols.register("age", "age2");
        assert_eq!(symbols.resolve_text("Age"), Some("age"));
    }

    #[test]
    fn claim_name_suffixes_on_collision() {
        let mut symbols = SymbolTable::default();
        assert_eq!(symbols.claim_name("age"), "age");
        assert_eq!(symbols.claim_name("age"), "age2");
        assert_eq!(symbols.claim_name("age"), "age3");
    }
}
