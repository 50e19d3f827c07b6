//! Serializer: walks a finished tree and emits the nested document.
//!
//! Children are inlined into their parent object keyed by node name, so
//! the emitted JSON mirrors the tree one-to-one. Maps keep insertion
//! order, making the output deterministic for a given input table.

use serde_json::{Map, Value, json};

use crate::condition::{Condition, Conditional, OperandValue};
use crate::node::{
    AnswerOption, Node, NumericLimit, Question, QuestionKind, Questionnaire, Section,
};

/// Serialize one questionnaire to its nested document form.
pub fn questionnaire_to_json(questionnaire: &Questionnaire) -> Value {
    let mut object = Map::new();
    object.insert("kind".into(), json!("questionnaire"));
    object.insert("title".into(), json!(questionnaire.title));
    if let Some(description) = &questionnaire.description {
        object.insert("description".into(), json!(description));
    }
    object.insert(
        "requiredSubjectTypes".into(),
        json!(questionnaire.required_subject_types),
    );
    object.insert("paginate".into(), json!(questionnaire.paginate));
    if let Some(max) = questionnaire.max_per_subject {
        object.insert("maxPerSubject".into(), json!(max));
    }
    insert_children(&mut object, &questionnaire.children);
    Value::Object(object)
}

fn insert_children(object: &mut Map<String, Value>, children: &[Node]) {
    for child in children {
        let value = match child {
            Node::Section(section) => section_to_json(section),
            Node::Question(question) => question_to_json(question),
        };
        object.insert(child.name().to_string(), value);
    }
}

fn section_to_json(section: &Section) -> Value {
    let mut object = Map::new();
    object.insert("kind".into(), json!("section"));
    if let Some(label) = &section.label {
        object.insert("label".into(), json!(label));
    }
    if let Some(mode) = &section.display_mode {
        object.insert("displayMode".into(), json!(mode.as_str()));
    }
    if let Some(data_type) = section.data_type {
        object.insert("dataType".into(), json!(data_type.as_str()));
    }
    if section.recurrent {
        object.insert("recurrent".into(), json!(true));
    }
    if let Some(max) = section.max_answers {
        object.insert("maxAnswers".into(), json!(max));
    }
    if let Some(condition) = &section.condition {
        object.insert("condition".into(), condition_to_json(condition));
    }
    if !section.options.is_empty() {
        object.insert("options".into(), options_to_json(&section.options));
    }
    insert_children(&mut object, &section.children);
    Value::Object(object)
}

fn question_to_json(question: &Question) -> Value {
    let mut object = Map::new();
    let kind = match question.kind {
        QuestionKind::Input => "question",
        QuestionKind::Information => "information",
    };
    object.insert("kind".into(), json!(kind));
    object.insert("text".into(), json!(question.text));
    if let Some(description) = &question.description {
        object.insert("description".into(), json!(description));
    }
    if let Some(data_type) = question.data_type {
        object.insert("dataType".into(), json!(data_type.as_str()));
    }
    if let Some(mode) = &question.display_mode {
        object.insert("displayMode".into(), json!(mode.as_str()));
    }
    if let Some(min) = question.min_answers {
        object.insert("minAnswers".into(), json!(min));
    }
    if let Some(max) = question.max_answers {
        object.insert("maxAnswers".into(), json!(max));
    }
    if let Some(format) = &question.date_format {
        object.insert("dateFormat".into(), json!(format));
    }
    if let Some(expression) = &question.expression {
        object.insert("expression".into(), json!(expression));
    }
    if let Some(entry_mode) = &question.entry_mode {
        object.insert("entryMode".into(), json!(entry_mode));
    }
    if let Some(unit) = &question.unit {
        object.insert("unitOfMeasurement".into(), json!(unit));
    }
    if let Some(limit) = question.min_value {
        object.insert("minValue".into(), numeric_limit_to_json(limit));
    }
    if let Some(limit) = question.max_value {
        object.insert("maxValue".into(), numeric_limit_to_json(limit));
    }
    if let Some(label) = &question.min_value_label {
        object.insert("minValueLabel".into(), json!(label));
    }
    if let Some(label) = &question.max_value_label {
        object.insert("maxValueLabel".into(), json!(label));
    }
    if let Some(limit) = &question.lower_limit {
        object.insert("lowerLimit".into(), json!(limit));
    }
    if let Some(limit) = &question.upper_limit {
        object.insert("upperLimit".into(), json!(limit));
    }
    if let Some(step) = question.slider_step {
        object.insert("sliderStep".into(), numeric_limit_to_json(step));
    }
    if let Some(step) = question.slider_mark_step {
        object.insert("sliderMarkStep".into(), numeric_limit_to_json(step));
    }
    if let Some(orientation) = &question.slider_orientation {
        object.insert("sliderOrientation".into(), json!(orientation));
    }
    if question.compact {
        object.insert("compact".into(), json!(true));
    }
    if !question.source_vocabularies.is_empty() {
        object.insert(
            "sourceVocabularies".into(),
            json!(question.source_vocabularies),
        );
    }
    if !question.options.is_empty() {
        object.insert("options".into(), options_to_json(&question.options));
    }
    Value::Object(object)
}

fn options_to_json(options: &[AnswerOption]) -> Value {
    Value::Array(options.iter().map(option_to_json).collect())
}

fn option_to_json(option: &AnswerOption) -> Value {
    let mut object = Map::new();
    object.insert("value".into(), json!(option.value));
    object.insert("label".into(), json!(option.label));
    object.insert("order".into(), json!(option.order));
    if option.none_of_the_above {
        object.insert("noneOfTheAbove".into(), json!(true));
    }
    if option.not_applicable {
        object.insert("notApplicable".into(), json!(true));
    }
    Value::Object(object)
}

fn numeric_limit_to_json(limit: NumericLimit) -> Value {
    match limit {
        NumericLimit::Integer(value) => json!(value),
        NumericLimit::Float(value) => json!(value),
    }
}

fn condition_to_json(condition: &Condition) -> Value {
    match condition {
        Condition::Single(conditional) => conditional_to_json(conditional),
        Condition::Group(group) => {
            let mut object = Map::new();
            object.insert("kind".into(), json!("conditionalGroup"));
            object.insert("requireAll".into(), json!(group.require_all));
            object.insert(
                "conditions".into(),
                Value::Array(group.children.iter().map(condition_to_json).collect()),
            );
            Value::Object(object)
        }
    }
}

fn conditional_to_json(conditional: &Conditional) -> Value {
    let mut object = Map::new();
    object.insert("kind".into(), json!("conditional"));
    object.insert("operandA".into(), operand_to_json(&conditional.operand_a));
    object.insert(
        "comparator".into(),
        json!(conditional.comparator.as_str()),
    );
    object.insert("operandB".into(), operand_to_json(&conditional.operand_b));
    Value::Object(object)
}

fn operand_to_json(operand: &OperandValue) -> Value {
    let mut object = Map::new();
    object.insert("value".into(), json!(operand.raw()));
    object.insert("isReference".into(), json!(operand.is_reference()));
    Value::Object(object)
}
