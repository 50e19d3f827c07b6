//! Configuration-driven column-role mapping.
//!
//! The compiler never hard-codes column headers: each logical role
//! (questionnaire name, question text, options, ...) maps to a literal
//! header via a [`HeaderConfig`]. Input sources with different header
//! sets supply a JSON file overriding any subset of the defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{IngestError, Result};

/// Logical column roles mapped to the literal headers of one input
/// source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct HeaderConfig {
    pub questionnaire: String,
    pub section: String,
    pub name: String,
    pub question_type: String,
    pub text: String,
    pub description: String,
    pub options: String,
    pub condition: String,
    pub expression: String,
    pub compact: String,
    pub min_answers: String,
    pub max_answers: String,
    pub units: String,
    pub min_value: String,
    pub min_value_label: String,
    pub max_value: String,
    pub max_value_label: String,
    pub display_mode: String,
    pub slider_step: String,
    pub slider_mark_step: String,
    pub slider_orientation: String,
    pub entry_mode: String,
    pub reference_question: String,
}

impl Default for HeaderConfig {
    fn default() -> Self {
        Self {
            questionnaire: "Questionnaire Name".to_string(),
            section: "Section Name".to_string(),
            name: "Variable Name".to_string(),
            question_type: "Question Type".to_string(),
            text: "Question Text".to_string(),
            description: "Description".to_string(),
            options: "Options".to_string(),
            condition: "Conditional Display".to_string(),
            expression: "Specify Calculation".to_string(),
            compact: "Compact".to_string(),
            min_answers: "Min Answers".to_string(),
            max_answers: "Max Answers".to_string(),
            units: "Units".to_string(),
            min_value: "Min Value".to_string(),
            min_value_label: "Min Value Label".to_string(),
            max_value: "Max Value".to_string(),
            max_value_label: "Max Value Label".to_string(),
            display_mode: "Display Mode".to_string(),
            slider_step: "Slider Step".to_string(),
            slider_mark_step: "Slider Mark Step".to_string(),
            slider_orientation: "Slider Orientation".to_string(),
            entry_mode: "Entry Mode".to_string(),
            reference_question: "Reference Question".to_string(),
        }
    }
}

impl HeaderConfig {
    /// Load a header mapping from a JSON file. Roles not present in the
    /// file keep their default headers; unknown roles are rejected.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        serde_json::from_str(&data).map_err(|error| IngestError::Config(error.to_string()))
    }

    /// All (role, header) pairs, in handler order.
    pub fn entries(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("questionnaire", self.questionnaire.as_str()),
            ("section", self.section.as_str()),
            ("name", self.name.as_str()),
            ("question-type", self.question_type.as_str()),
            ("text", self.text.as_str()),
            ("description", self.description.as_str()),
            ("options", self.options.as_str()),
            ("condition", self.condition.as_str()),
            ("expression", self.expression.as_str()),
            ("compact", self.compact.as_str()),
            ("min-answers", self.min_answers.as_str()),
            ("max-answers", self.max_answers.as_str()),
            ("units", self.units.as_str()),
            ("min-value", self.min_value.as_str()),
            ("min-value-label", self.min_value_label.as_str()),
            ("max-value", self.max_value.as_str()),
            ("max-value-label", self.max_value_label.as_str()),
            ("display-mode", self.display_mode.as_str()),
            ("slider-step", self.slider_step.as_str()),
            ("slider-mark-step", self.slider_mark_step.as_str()),
            ("slider-orientation", self.slider_orientation.as_str()),
            ("entry-mode", self.entry_mode.as_str()),
            ("reference-question", self.reference_question.as_str()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let config: HeaderConfig =
            serde_json::from_str(r#"{"name": "Short name", "text": "Field / Question"}"#)
                .expect("parse config");
        assert_eq!(config.name, "Short name");
        assert_eq!(config.text, "Field / Question");
        assert_eq!(config.question_type, "Question Type");
    }

    #[test]
    fn unknown_roles_are_rejected() {
        let result = serde_json::from_str::<HeaderConfig>(r#"{"no-such-role": "X"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn config_round_trips_through_json() {
        let config = HeaderConfig::default();
        let json = serde_json::to_string(&config).expect("serialize");
        let round: HeaderConfig = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(round, config);
    }
}
