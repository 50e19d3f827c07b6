pub mod condition;
pub mod diagnostics;
pub mod names;
pub mod node;
pub mod serialize;

pub use condition::{Comparator, Condition, Conditional, ConditionalGroup, OperandValue};
pub use diagnostics::{Diagnostic, DiagnosticLevel, Diagnostics};
pub use names::{clean_name, clean_title, unique_name};
pub use node::{
    AnswerOption, DataType, DisplayMode, Node, NumericLimit, Question, QuestionKind,
    Questionnaire, RepeatSpec, Section,
};
pub use serialize::questionnaire_to_json;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn section_node_reports_kind_and_name() {
        let section = Section::new("demographics");
        let node = Node::Section(section);
        assert_eq!(node.name(), "demographics");
        assert!(node.as_section().is_some());
        assert!(node.as_question().is_none());
    }

    #[test]
    fn diagnostics_counts() {
        let mut diagnostics = Diagnostics::default();
        diagnostics.warn("ambiguous conditional");
        diagnostics.warn_at(4, "unresolved reference");
        diagnostics.error("missing header");
        assert_eq!(diagnostics.warning_count(), 2);
        assert_eq!(diagnostics.error_count(), 1);
        assert!(diagnostics.has_warnings());
    }
}
