//! Document builder.
//!
//! Consumes table rows in order and maintains a stack of open nodes:
//! the questionnaire at the bottom, open sections and matrices above,
//! plus the question currently being assembled. Structural rows push
//! and pop the stack; question-bearing rows fill the question slot,
//! which is attached to the top of the stack when the next row (or the
//! end of input) closes it. No row ever aborts the compilation: rows
//! that cannot be interpreted degrade and are reported.

use formdef_ingest::{
    ClassifiedRow, HeaderConfig, Multiplicity, Row, RowKind, SheetTable, classify_row,
    classify_type_cell,
};
use formdef_model::{
    Condition, Diagnostics, DisplayMode, Node, Question, QuestionKind, Questionnaire, RepeatSpec,
    Section, clean_name, clean_title, unique_name,
};
use tracing::debug;

use crate::condition::compile_condition;
use crate::context::{CompileContext, CompileOptions};
use crate::expand::expand_repeated_sections;
use crate::expression::rewrite_expression;
use crate::limits::{date_limit_parses, parse_count, parse_numeric_limit, time_limit_parses};
use crate::options::parse_option_list;
use crate::resolve::resolve_references;

/// A questionnaire under construction.
struct OpenQuestionnaire {
    questionnaire: Questionnaire,
    /// Open sections, outermost first.
    stack: Vec<Section>,
    /// The question currently being assembled.
    question: Option<Question>,
    /// Condition that wraps the current question in a one-off section
    /// when it completes.
    pending_wrap: Option<Condition>,
    /// Counter for auto-generated section labels.
    auto_section_index: u32,
}

impl OpenQuestionnaire {
    fn new(questionnaire: Questionnaire) -> Self {
        Self {
            questionnaire,
            stack: Vec::new(),
            question: None,
            pending_wrap: None,
            auto_section_index: 0,
        }
    }
}

/// Row-driven builder producing finished questionnaires.
pub struct DocumentBuilder<'a> {
    headers: &'a HeaderConfig,
    ctx: CompileContext,
    finished: Vec<Questionnaire>,
    current: Option<OpenQuestionnaire>,
}

impl<'a> DocumentBuilder<'a> {
    pub fn new(headers: &'a HeaderConfig, options: CompileOptions) -> Self {
        Self {
            headers,
            ctx: CompileContext::new(options),
            finished: Vec::new(),
            current: None,
        }
    }

    /// Consume the whole table. `fallback_title` names the
    /// questionnaire when the first row does not.
    pub fn build(
        mut self,
        table: &SheetTable,
        fallback_title: &str,
    ) -> (Vec<Questionnaire>, Diagnostics) {
        for row in table.rows() {
            self.ctx.current_row = Some(row.number());
            self.process_row(&row, fallback_title);
        }
        self.ctx.current_row = None;
        self.finish_questionnaire();
        (self.finished, self.ctx.diagnostics)
    }

    fn process_row(&mut self, row: &Row<'_>, fallback_title: &str) {
        if row.is_empty() {
            debug!(row = row.number(), "skipping blank row");
            return;
        }
        if let Some(title) = row.value(&self.headers.questionnaire) {
            self.start_questionnaire(title);
        } else if self.current.is_none() {
            self.start_questionnaire(fallback_title);
        }

        let classified = classify_row(row, self.headers);
        if classified.kind == RowKind::Default
            && let Some(cell) = row.value(&self.headers.question_type)
        {
            self.ctx
                .warn(format!("unrecognized question type '{cell}', treating as text"));
        }

        match classified.kind {
            RowKind::SectionStart => self.handle_section_start(row, false, false),
            RowKind::SectionRecurrent => self.handle_section_start(row, true, false),
            RowKind::SectionRepeated => self.handle_section_start(row, false, true),
            RowKind::SectionEnd => self.handle_section_end(),
            RowKind::MatrixStart => self.handle_matrix_start(row, &classified),
            RowKind::MatrixEnd => self.handle_matrix_end(),
            _ => self.handle_question_row(row, &classified),
        }
    }

    fn start_questionnaire(&mut self, title: &str) {
        self.finish_questionnaire();
        let title = clean_title(title);
        let mut questionnaire = Questionnaire::new(clean_name(&title), title);
        questionnaire.required_subject_types = self.ctx.options.required_subject_types.clone();
        questionnaire.paginate = self.ctx.options.paginate;
        questionnaire.max_per_subject = self.ctx.options.max_per_subject;
        debug!(title = %questionnaire.title, "starting questionnaire");
        self.current = Some(OpenQuestionnaire::new(questionnaire));
    }

    /// Close the current questionnaire: attach any open nodes, resolve
    /// forward references, and expand repeated sections.
    fn finish_questionnaire(&mut self) {
        self.complete_question();
        while self.complete_section() {}
        let Some(open) = self.current.take() else {
            return;
        };
        let mut questionnaire = open.questionnaire;
        resolve_references(&mut questionnaire, &mut self.ctx);
        expand_repeated_sections(&mut questionnaire, &mut self.ctx);
        self.finished.push(questionnaire);
        self.ctx.clear_questionnaire_state();
    }

    fn top_is_matrix(&self) -> bool {
        self.current
            .as_ref()
            .is_some_and(|open| open.stack.last().is_some_and(Section::is_matrix))
    }

    /// Label for a new section: the section cell, else the question
    /// text, else an auto-generated placeholder.
    fn section_label(&mut self, row: &Row<'_>) -> String {
        if let Some(cell) = row.value(&self.headers.section) {
            return clean_title(cell);
        }
        if let Some(cell) = row.value(&self.headers.text) {
            return clean_title(cell);
        }
        let open = self.current.as_mut().expect("open questionnaire");
        open.auto_section_index += 1;
        format!("Section {}", open.auto_section_index)
    }

    fn handle_section_start(&mut self, row: &Row<'_>, recurrent: bool, repeated: bool) {
        self.complete_question();
        let label = self.section_label(row);
        let condition = row
            .value(&self.headers.condition)
            .and_then(|cell| compile_condition(cell, &mut self.ctx));

        let mut section = Section::new("");
        section.label = Some(label);
        section.recurrent = recurrent;
        if repeated {
            section.repeat = Some(RepeatSpec {
                source: row
                    .value(&self.headers.reference_question)
                    .map(str::to_string),
            });
        }
        if let Some(cell) = row.value(&self.headers.options) {
            section.options = parse_option_list(cell).options;
        }
        section.condition = condition;

        let open = self.current.as_mut().expect("open questionnaire");
        open.stack.push(section);
    }

    fn handle_section_end(&mut self) {
        // Matrices cannot span section borders; close one first.
        if self.top_is_matrix() {
            self.complete_section();
        }
        if !self.complete_section() {
            self.ctx.warn("section end without an open section");
        }
    }

    fn handle_matrix_start(&mut self, row: &Row<'_>, classified: &ClassifiedRow) {
        // Matrices do not nest.
        if self.top_is_matrix() {
            self.complete_section();
        }
        self.complete_question();

        let label = self.section_label(row);
        let condition = row
            .value(&self.headers.condition)
            .and_then(|cell| compile_condition(cell, &mut self.ctx));

        let mut section = Section::new("");
        section.label = Some(label);
        section.display_mode = Some(DisplayMode::Matrix);
        if self.ctx.options.single_answer_default {
            section.max_answers = Some(1);
        }
        match &classified.subtype {
            Some(subtype) => {
                let sub = classify_type_cell(subtype);
                if sub.kind == RowKind::Default {
                    self.ctx.warn(format!(
                        "unrecognized matrix type '{subtype}', defaulting to text"
                    ));
                }
                section.data_type = sub.kind.data_type();
            }
            None => section.data_type = None,
        }
        if let Some(cell) = row.value(&self.headers.options) {
            section.options = parse_option_list(cell).options;
        }
        section.condition = condition;

        let open = self.current.as_mut().expect("open questionnaire");
        open.stack.push(section);
    }

    fn handle_matrix_end(&mut self) {
        if self.top_is_matrix() {
            self.complete_section();
        } else {
            self.ctx.warn("matrix end without an open matrix");
        }
    }

    fn handle_question_row(&mut self, row: &Row<'_>, classified: &ClassifiedRow) {
        // A section cell on a question row is the simpler inline
        // definition style: the previous section completes
        // automatically.
        if let Some(cell) = row.value(&self.headers.section) {
            let label = clean_title(cell);
            self.complete_section();
            let mut section = Section::new("");
            section.label = Some(label);
            let open = self.current.as_mut().expect("open questionnaire");
            open.stack.push(section);
        }
        self.complete_question();

        let name_cell = row.value(&self.headers.name);
        let text_cell = row.value(&self.headers.text);
        let Some(raw_text) = text_cell.or(name_cell) else {
            self.ctx.warn("skipped row with no question name or text");
            return;
        };
        if name_cell.is_some_and(|cell| cell.contains('\n')) {
            self.ctx.warn("skipped row with a newline in its name");
            return;
        }

        let (text, required) = strip_required_marker(raw_text);
        let mut description = row.value(&self.headers.description).map(str::to_string);
        let text = if description.is_some() {
            text
        } else {
            let (main, extracted) = extract_trailing_description(&text);
            description = extracted;
            main
        };

        let base_name = name_cell
            .map(|cell| clean_name(&cell.to_lowercase()))
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| clean_name(&text.to_lowercase()));
        if base_name.is_empty() {
            self.ctx.warn("skipped row whose name reduces to nothing");
            return;
        }
        let name = self.ctx.symbols.claim_name(&base_name);
        self.ctx.symbols.register(&text, &name);
        debug!(name = %name, "creating question");

        let mut question = Question::new(name, text);
        if classified.kind == RowKind::Information {
            question.kind = QuestionKind::Information;
        }
        question.data_type = classified.kind.data_type();
        question.description = description;
        if self.top_is_matrix() || self.ctx.options.single_answer_default {
            question.max_answers = Some(1);
        }
        if required {
            question.min_answers = Some(1);
        }

        self.apply_type_effects(row, &mut question, classified);
        self.apply_column_values(row, &mut question, classified);

        let wrap = row
            .value(&self.headers.condition)
            .and_then(|cell| compile_condition(cell, &mut self.ctx));

        let open = self.current.as_mut().expect("open questionnaire");
        open.pending_wrap = wrap;
        open.question = Some(question);
    }

    /// Kind-specific side effects on a fresh question.
    fn apply_type_effects(
        &mut self,
        row: &Row<'_>,
        question: &mut Question,
        classified: &ClassifiedRow,
    ) {
        match classified.kind {
            RowKind::Date => {
                if let Some(format) = &classified.subtype {
                    question.date_format = Some(normalize_date_format(format));
                }
            }
            RowKind::Time => {
                question.date_format = classified.subtype.clone();
            }
            RowKind::Vocabulary => {
                if let Some(filter) = &classified.subtype {
                    question.source_vocabularies =
                        filter.split_whitespace().map(str::to_string).collect();
                }
            }
            RowKind::Computed => {
                question.entry_mode = Some("computed".to_string());
                question.display_mode = Some(DisplayMode::Formatted);
                match row.value(&self.headers.expression) {
                    Some(cell) => question.expression = Some(rewrite_expression(cell)),
                    None => self
                        .ctx
                        .warn(format!("computed question '{}' has no calculation", question.name)),
                }
            }
            RowKind::List => {
                question.display_mode = Some(DisplayMode::List);
            }
            _ => {}
        }
        match classified.multiplicity {
            // Matrix rows stay single-answer regardless.
            Some(Multiplicity::Multiple) if !self.top_is_matrix() => {
                question.max_answers = Some(0);
            }
            Some(Multiplicity::Single) => question.max_answers = Some(1),
            _ => {}
        }
    }

    /// Remaining column handlers, in declared order.
    fn apply_column_values(
        &mut self,
        row: &Row<'_>,
        question: &mut Question,
        classified: &ClassifiedRow,
    ) {
        let in_matrix = self.top_is_matrix();
        if let Some(cell) = row.value(&self.headers.options) {
            let outcome = parse_option_list(cell);
            question.options = outcome.options;
            if !in_matrix {
                question.display_mode = Some(if outcome.other_present {
                    DisplayMode::ListWithInput
                } else {
                    DisplayMode::List
                });
            }
        }
        if question.expression.is_none()
            && let Some(cell) = row.value(&self.headers.expression)
        {
            question.expression = Some(cell.to_string());
        }
        if let Some(cell) = row.value(&self.headers.compact) {
            question.compact = cell.starts_with(['Y', 'y']);
        }
        if let Some(cell) = row.value(&self.headers.min_answers) {
            match parse_count(cell) {
                Some(count) => question.min_answers = Some(count),
                None => self.ctx.warn(format!("unparseable min answers '{cell}'")),
            }
        }
        if let Some(cell) = row.value(&self.headers.max_answers) {
            match parse_count(cell) {
                Some(count) => question.max_answers = Some(count),
                None => self.ctx.warn(format!("unparseable max answers '{cell}'")),
            }
        }
        if let Some(cell) = row.value(&self.headers.units) {
            question.unit = Some(cell.to_string());
        }
        self.apply_range_limit(row, question, classified, true);
        self.apply_range_limit(row, question, classified, false);
        if let Some(cell) = row.value(&self.headers.min_value_label) {
            question.min_value_label = Some(cell.to_string());
        }
        if let Some(cell) = row.value(&self.headers.max_value_label) {
            question.max_value_label = Some(cell.to_string());
        }
        if let Some(cell) = row.value(&self.headers.display_mode) {
            question.display_mode = Some(DisplayMode::from_cell(cell));
        }
        if let Some(cell) = row.value(&self.headers.slider_step) {
            question.slider_step = parse_numeric_limit(cell);
        }
        if let Some(cell) = row.value(&self.headers.slider_mark_step) {
            question.slider_mark_step = parse_numeric_limit(cell);
        }
        if let Some(cell) = row.value(&self.headers.slider_orientation) {
            question.slider_orientation = Some(cell.to_string());
        }
        if question.entry_mode.is_none()
            && let Some(cell) = row.value(&self.headers.entry_mode)
        {
            question.entry_mode = Some(cell.to_string());
        }
    }

    /// Min/max value cells: raw limit strings for date and time kinds
    /// (validated), parsed numbers otherwise.
    fn apply_range_limit(
        &mut self,
        row: &Row<'_>,
        question: &mut Question,
        classified: &ClassifiedRow,
        lower: bool,
    ) {
        let header = if lower {
            &self.headers.min_value
        } else {
            &self.headers.max_value
        };
        let Some(cell) = row.value(header) else {
            return;
        };
        match classified.kind {
            RowKind::Date | RowKind::Time => {
                let parses = if classified.kind == RowKind::Date {
                    date_limit_parses(cell)
                } else {
                    time_limit_parses(cell)
                };
                if !parses {
                    self.ctx
                        .warn(format!("unparseable date/time limit '{cell}'"));
                }
                if lower {
                    question.lower_limit = Some(cell.to_string());
                } else {
                    question.upper_limit = Some(cell.to_string());
                }
            }
            _ => match parse_numeric_limit(cell) {
                Some(limit) => {
                    if lower {
                        question.min_value = Some(limit);
                    } else {
                        question.max_value = Some(limit);
                    }
                }
                None => self.ctx.warn(format!("unparseable numeric limit '{cell}'")),
            },
        }
    }

    /// Attach the current question (wrapped in its one-off conditional
    /// section when a condition was present) to the top of the stack.
    fn complete_question(&mut self) {
        let Some(open) = self.current.as_mut() else {
            return;
        };
        let Some(mut question) = open.question.take() else {
            open.pending_wrap = None;
            return;
        };
        if open.stack.last().is_some_and(Section::is_matrix) {
            question.max_answers = Some(1);
        }
        let node = match open.pending_wrap.take() {
            Some(condition) => {
                let mut wrapper = Section::new(format!("{}_section", question.name));
                wrapper.condition = Some(condition);
                wrapper.children.push(Node::Question(question));
                Node::Section(wrapper)
            }
            None => Node::Question(question),
        };
        let target = match open.stack.last_mut() {
            Some(section) => &mut section.children,
            None => &mut open.questionnaire.children,
        };
        let name = unique_name(node.name(), |candidate| {
            target.iter().any(|sibling| sibling.name() == candidate)
        });
        let node = rename_node(node, name);
        target.push(node);
    }

    /// Pop the top section, resolve its final name against its new
    /// siblings, and attach it. Returns false when no section is open.
    fn complete_section(&mut self) -> bool {
        self.complete_question();
        let Some(open) = self.current.as_mut() else {
            return false;
        };
        let Some(mut section) = open.stack.pop() else {
            return false;
        };
        let source = section
            .title
            .take()
            .or_else(|| section.label.clone())
            .unwrap_or_default();
        let base = clean_name(&source);
        let base = if base.is_empty() {
            "section".to_string()
        } else {
            base
        };
        let target = match open.stack.last_mut() {
            Some(parent) => &mut parent.children,
            None => &mut open.questionnaire.children,
        };
        section.name = unique_name(&base, |candidate| {
            target.iter().any(|sibling| sibling.name() == candidate)
        });
        debug!(name = %section.name, "completed section");
        target.push(Node::Section(section));
        true
    }
}

fn rename_node(node: Node, name: String) -> Node {
    match node {
        Node::Section(mut section) => {
            section.name = name;
            Node::Section(section)
        }
        Node::Question(mut question) => {
            question.name = name;
            Node::Question(question)
        }
    }
}

/// Normalize a date format cell to the renderer's conventions.
fn normalize_date_format(format: &str) -> String {
    format.replace('D', "d").replace('Y', "y").replace('-', "/")
}

/// Strip a trailing required marker, returning the remaining text and
/// whether the marker was present.
fn strip_required_marker(text: &str) -> (String, bool) {
    let trimmed = text.trim();
    let lowered = trimmed.to_ascii_lowercase();
    for marker in ["(required)", "required field"] {
        if lowered.ends_with(marker) {
            let stripped = trimmed[..trimmed.len() - marker.len()]
                .trim_end_matches([' ', '-', ':', ','])
                .to_string();
            return (stripped, true);
        }
    }
    (trimmed.to_string(), false)
}

/// Extract a trailing ` (...)` or ` [...]` suffix as the description.
fn extract_trailing_description(text: &str) -> (String, Option<String>) {
    let trimmed = text.trim();
    let dividers = if trimmed.ends_with(']') && trimmed.contains(" [") {
        Some((" [", ']'))
    } else if trimmed.ends_with(')') && trimmed.contains(" (") {
        Some((" (", ')'))
    } else {
        None
    };
    let Some((open, _close)) = dividers else {
        return (trimmed.to_string(), None);
    };
    let Some(start) = trimmed.rfind(open) else {
        return (trimmed.to_string(), None);
    };
    let description = trimmed[start + open.len()..trimmed.len() - 1].trim();
    let main = trimmed[..start].trim();
    if main.is_empty() || description.is_empty() {
        return (trimmed.to_string(), None);
    }
    (main.to_string(), Some(description.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_marker_is_stripped() {
        let (text, required) = strip_required_marker("Date of birth (required)");
        assert_eq!(text, "Date of birth");
        assert!(required);

        let (text, required) = strip_required_marker("Date of birth");
        assert_eq!(text, "Date of birth");
        assert!(!required);
    }

    #[test]
    fn trailing_description_is_extracted() {
        let (text, description) = extract_trailing_description("Weight (in kilograms)");
        assert_eq!(text, "Weight");
        assert_eq!(description.as_deref(), Some("in kilograms"));

        let (text, description) = extract_trailing_description("Score [0-10]");
        assert_eq!(text, "Score");
        assert_eq!(description.as_deref(), Some("0-10"));

        let (text, description) = extract_trailing_description("Plain question");
        assert_eq!(text, "Plain question");
        assert_eq!(description, None);
    }

    #[test]
    fn date_format_normalizes() {
        assert_eq!(normalize_date_format("MM-DD-YYYY"), "MM/dd/yyyy");
        assert_eq!(normalize_date_format("yyyy/MM/dd"), "yyyy/MM/dd");
    }
}
