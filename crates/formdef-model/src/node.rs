//! The questionnaire document tree.
//!
//! A compiled document is a [`Questionnaire`] owning an ordered list of
//! child [`Node`]s; each node is either a [`Section`] (plain, matrix,
//! recurrent, or repeated-template) or a [`Question`]. Sections and
//! questions carry a name that is unique within their parent's sibling
//! set; the builder resolves collisions before attaching a node.

use serde::{Deserialize, Serialize};

use crate::condition::Condition;

/// Answer data type of a question.
///
/// Computed questions are encoded as `Text` plus a `computed` entry mode
/// and an expression, matching the downstream store's convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Text,
    Date,
    Time,
    Boolean,
    Decimal,
    Long,
    Vocabulary,
    File,
}

impl DataType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Date => "date",
            Self::Time => "time",
            Self::Boolean => "boolean",
            Self::Decimal => "decimal",
            Self::Long => "long",
            Self::Vocabulary => "vocabulary",
            Self::File => "file",
        }
    }
}

/// How a question or section is rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayMode {
    /// Enumerated answer list.
    List,
    /// Enumerated answer list augmented with a free-text input.
    ListWithInput,
    /// Grid of questions sharing one answer type.
    Matrix,
    /// Formatted output, used by computed questions.
    Formatted,
    /// Any other mode passed through from the display-mode column.
    Custom(String),
}

impl DisplayMode {
    pub fn as_str(&self) -> &str {
        match self {
            Self::List => "list",
            Self::ListWithInput => "list+input",
            Self::Matrix => "matrix",
            Self::Formatted => "formatted",
            Self::Custom(other) => other,
        }
    }

    /// Parse a display-mode cell, mapping known modes and passing the
    /// rest through unchanged.
    pub fn from_cell(cell: &str) -> Self {
        match cell.trim().to_lowercase().as_str() {
            "list" => Self::List,
            "list+input" => Self::ListWithInput,
            "matrix" => Self::Matrix,
            "formatted" => Self::Formatted,
            _ => Self::Custom(cell.trim().to_string()),
        }
    }
}

/// A numeric range limit, kept as an integer when the source cell had no
/// decimal point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumericLimit {
    Integer(i64),
    Float(f64),
}

/// One enumerated answer of a list question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerOption {
    pub value: String,
    pub label: String,
    /// 1-based position within the option list.
    pub order: u32,
    pub none_of_the_above: bool,
    pub not_applicable: bool,
}

impl AnswerOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>, order: u32) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            order,
            none_of_the_above: false,
            not_applicable: false,
        }
    }

    /// True for options excluded from repeated-section enumeration.
    pub fn is_excluded_from_enumeration(&self) -> bool {
        self.none_of_the_above || self.not_applicable
    }
}

/// Question flavor: a data-collection field or a display-only
/// information box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuestionKind {
    #[default]
    Input,
    Information,
}

/// A leaf data-collection node.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Question {
    pub name: String,
    pub text: String,
    pub kind: QuestionKind,
    pub data_type: Option<DataType>,
    pub description: Option<String>,
    pub display_mode: Option<DisplayMode>,
    pub options: Vec<AnswerOption>,
    pub date_format: Option<String>,
    pub expression: Option<String>,
    pub entry_mode: Option<String>,
    pub unit: Option<String>,
    pub min_answers: Option<u32>,
    pub max_answers: Option<u32>,
    pub min_value: Option<NumericLimit>,
    pub max_value: Option<NumericLimit>,
    pub min_value_label: Option<String>,
    pub max_value_label: Option<String>,
    /// Date/time range limits, kept as the raw authored strings.
    pub lower_limit: Option<String>,
    pub upper_limit: Option<String>,
    pub slider_step: Option<NumericLimit>,
    pub slider_mark_step: Option<NumericLimit>,
    pub slider_orientation: Option<String>,
    pub compact: bool,
    pub source_vocabularies: Vec<String>,
}

impl Question {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
            ..Self::default()
        }
    }
}

/// Enumeration source of a repeated-template section.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RepeatSpec {
    /// Question whose answer options enumerate the variants, as authored
    /// (display text or internal name). `None` means the section's own
    /// option list is the enumeration.
    pub source: Option<String>,
}

/// A grouping node: plain section, matrix, recurrent, or repeated
/// template.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Section {
    pub name: String,
    pub label: Option<String>,
    /// Working title; consumed when the section's final name is resolved.
    pub title: Option<String>,
    pub display_mode: Option<DisplayMode>,
    /// Shared answer type of a matrix section.
    pub data_type: Option<DataType>,
    /// Shared matrix options, or the literal enumeration of a repeated
    /// section.
    pub options: Vec<AnswerOption>,
    pub recurrent: bool,
    pub repeat: Option<RepeatSpec>,
    pub max_answers: Option<u32>,
    pub condition: Option<Condition>,
    pub children: Vec<Node>,
}

impl Section {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn is_matrix(&self) -> bool {
        self.display_mode == Some(DisplayMode::Matrix)
    }

    pub fn child_names(&self) -> impl Iterator<Item = &str> {
        self.children.iter().map(Node::name)
    }
}

/// A tree element below the questionnaire root.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Section(Section),
    Question(Question),
}

impl Node {
    pub fn name(&self) -> &str {
        match self {
            Self::Section(section) => &section.name,
            Self::Question(question) => &question.name,
        }
    }

    pub fn as_section(&self) -> Option<&Section> {
        match self {
            Self::Section(section) => Some(section),
            Self::Question(_) => None,
        }
    }

    pub fn as_section_mut(&mut self) -> Option<&mut Section> {
        match self {
            Self::Section(section) => Some(section),
            Self::Question(_) => None,
        }
    }

    pub fn as_question(&self) -> Option<&Question> {
        match self {
            Self::Section(_) => None,
            Self::Question(question) => Some(question),
        }
    }
}

/// Root node describing one clinical form.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Questionnaire {
    pub name: String,
    pub title: String,
    pub description: Option<String>,
    pub required_subject_types: Vec<String>,
    pub paginate: bool,
    pub max_per_subject: Option<u32>,
    pub children: Vec<Node>,
}

impl Questionnaire {
    pub fn new(name: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn child_names(&self) -> impl Iterator<Item = &str> {
        self.children.iter().map(Node::name)
    }

    /// Depth-first lookup of a question by internal name.
    pub fn find_question(&self, name: &str) -> Option<&Question> {
        fn walk<'a>(nodes: &'a [Node], name: &str) -> Option<&'a Question> {
            for node in nodes {
                match node {
                    Node::Question(question) if question.name == name => return Some(question),
                    Node::Question(_) => {}
                    Node::Section(section) => {
                        if let Some(found) = walk(&section.children, name) {
                            return Some(found);
                        }
                    }
                }
            }
            None
        }
        walk(&self.children, name)
    }
}
