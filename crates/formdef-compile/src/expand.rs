//! Repeated-section expansion.
//!
//! A section flagged as a repeated template is cloned once per
//! enumerated value after the whole tree is built and references are
//! resolved. Enumeration comes from the section's own option list or
//! from the answer options of a referenced question (minus options
//! marked none-of-the-above / not-applicable). Cloning is a pure walk:
//! every descendant is deep-copied under a variant-prefixed name and
//! every reference operand that points inside the template is rewritten
//! with the same prefix, so each clone stays self-contained.

use std::collections::BTreeSet;

use formdef_model::{
    AnswerOption, Comparator, Condition, Conditional, Node, OperandValue, Questionnaire, Section,
    clean_name, unique_name,
};
use tracing::debug;

use crate::context::CompileContext;

/// Expand every repeated-template section in the questionnaire.
pub fn expand_repeated_sections(questionnaire: &mut Questionnaire, ctx: &mut CompileContext) {
    // Enumeration sources may live anywhere in the tree; look them up
    // against a pre-expansion snapshot while the tree is rewritten.
    let snapshot = questionnaire.clone();
    let mut children = std::mem::take(&mut questionnaire.children);
    for node in &mut children {
        expand_node(node, &snapshot, ctx);
    }
    questionnaire.children = children;
}

fn expand_node(node: &mut Node, snapshot: &Questionnaire, ctx: &mut CompileContext) {
    let Node::Section(section) = node else {
        return;
    };
    for child in &mut section.children {
        expand_node(child, snapshot, ctx);
    }
    if section.repeat.is_some() {
        expand_section(section, snapshot, ctx);
    }
}

fn expand_section(section: &mut Section, snapshot: &Questionnaire, ctx: &mut CompileContext) {
    let repeat = section.repeat.take().expect("checked by caller");

    let (variants, source_name) = if !section.options.is_empty() {
        let variants: Vec<AnswerOption> = section
            .options
            .drain(..)
            .filter(|option| !option.is_excluded_from_enumeration())
            .collect();
        (variants, None)
    } else if let Some(source) = &repeat.source {
        let name = ctx
            .symbols
            .resolve_text(source)
            .map(str::to_string)
            .unwrap_or_else(|| source.trim().to_lowercase());
        let Some(question) = snapshot.find_question(&name) else {
            ctx.diagnostics.warn(format!(
                "repeated section '{}' references unknown question '{}'",
                section.name, source
            ));
            return;
        };
        let variants: Vec<AnswerOption> = question
            .options
            .iter()
            .filter(|option| !option.is_excluded_from_enumeration())
            .cloned()
            .collect();
        (variants, Some(name))
    } else {
        ctx.diagnostics.warn(format!(
            "repeated section '{}' has no enumeration source",
            section.name
        ));
        return;
    };

    if variants.is_empty() {
        ctx.diagnostics.warn(format!(
            "repeated section '{}' enumerates no values",
            section.name
        ));
        return;
    }

    let template = std::mem::take(&mut section.children);
    let internal_names = collect_names(&template);
    let mut clones: Vec<Node> = Vec::with_capacity(variants.len());

    for option in &variants {
        let slug = variant_slug(option);
        let base = format!("{}_{}", section.name, slug);
        let clone_name =
            unique_name(&base, |candidate| clones.iter().any(|n| n.name() == candidate));
        let mut clone = Section::new(clone_name);
        clone.label = Some(option.label.clone());
        if let Some(source) = &source_name {
            clone.condition = Some(Condition::Single(Conditional::new(
                OperandValue::Reference(source.clone()),
                Comparator::Eq,
                OperandValue::Literal(option.value.clone()),
            )));
        }
        clone.children = template
            .iter()
            .map(|child| clone_with_prefix(child, &slug, &internal_names))
            .collect();
        clones.push(Node::Section(clone));
    }

    debug!(section = %section.name, count = clones.len(), "expanded repeated section");
    section.children = clones;
}

fn variant_slug(option: &AnswerOption) -> String {
    let slug = clean_name(&option.value);
    if slug.is_empty() {
        format!("variant{}", option.order)
    } else {
        slug
    }
}

/// Names of every node inside the template, at any depth.
fn collect_names(nodes: &[Node]) -> BTreeSet<String> {
    let mut names = BTreeSet::new();
    fn walk(nodes: &[Node], names: &mut BTreeSet<String>) {
        for node in nodes {
            names.insert(node.name().to_string());
            if let Node::Section(section) = node {
                walk(&section.children, names);
            }
        }
    }
    walk(nodes, &mut names);
    names
}

/// Deep-copy a node under a variant prefix, rewriting every reference
/// operand that targets a template-internal name.
fn clone_with_prefix(node: &Node, prefix: &str, internal_names: &BTreeSet<String>) -> Node {
    match node {
        Node::Question(question) => {
            let mut clone = question.clone();
            clone.name = format!("{prefix}_{}", question.name);
            Node::Question(clone)
        }
        Node::Section(section) => {
            let mut clone = section.clone();
            clone.name = format!("{prefix}_{}", section.name);
            if let Some(condition) = &mut clone.condition {
                rewrite_condition(condition, prefix, internal_names);
            }
            clone.children = section
                .children
                .iter()
                .map(|child| clone_with_prefix(child, prefix, internal_names))
                .collect();
            Node::Section(clone)
        }
    }
}

fn rewrite_condition(condition: &mut Condition, prefix: &str, internal_names: &BTreeSet<String>) {
    condition.for_each_conditional_mut(&mut |conditional| {
        for operand in [&mut conditional.operand_a, &mut conditional.operand_b] {
            if let OperandValue::Reference(name) = operand
                && internal_names.contains(name.as_str())
            {
                let renamed = format!("{prefix}_{name}");
                *operand = OperandValue::Reference(renamed);
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use formdef_model::Question;

    fn option(value: &str, label: &str, order: u32) -> AnswerOption {
        AnswerOption::new(value, label, order)
    }

    /// Template with an internal conditional referencing a sibling.
    fn template_section() -> Section {
        let mut template = Section::new("visit");
        template.repeat = Some(formdef_model::RepeatSpec { source: None });
        template.options = vec![
            option("left", "Left", 1),
            option("right", "Right", 2),
            option("both", "Both", 3),
        ];

        let trigger = Question::new("affected", "Affected?");
        template.children.push(Node::Question(trigger));

        let mut conditional_wrap = Section::new("detail_section");
        conditional_wrap.condition = Some(Condition::Single(Conditional::new(
            OperandValue::Reference("affected".to_string()),
            Comparator::Eq,
            OperandValue::Literal("1".to_string()),
        )));
        conditional_wrap
            .children
            .push(Node::Question(Question::new("detail", "Details")));
        template.children.push(Node::Section(conditional_wrap));
        template
    }

    #[test]
    fn literal_enumeration_produces_self_contained_clones() {
        let mut questionnaire = Questionnaire::new("q", "Q");
        questionnaire
            .children
            .push(Node::Section(template_section()));
        let mut ctx = CompileContext::default();

        expand_repeated_sections(&mut questionnaire, &mut ctx);

        let container = questionnaire.children[0].as_section().expect("section");
        assert!(container.repeat.is_none());
        assert_eq!(container.children.len(), 3);

        let clone_names: Vec<&str> = container.child_names().collect();
        assert_eq!(clone_names, vec!["visit_left", "visit_right", "visit_both"]);

        for (clone, slug) in container.children.iter().zip(["left", "right", "both"]) {
            let clone = clone.as_section().expect("clone section");
            let wrap = clone.children[1].as_section().expect("wrapped detail");
            let Some(Condition::Single(conditional)) = &wrap.condition else {
                panic!("expected conditional");
            };
            // Each clone's reference points at its own sibling.
            assert_eq!(
                conditional.operand_a,
                OperandValue::Reference(format!("{slug}_affected"))
            );
        }
    }

    #[test]
    fn question_enumeration_excludes_marked_options_and_adds_conditions() {
        let mut source = Question::new("side", "Which side?");
        source.options = vec![option("left", "Left", 1), option("right", "Right", 2), {
            let mut none = option("none", "None", 3);
            none.not_applicable = true;
            none
        }];

        let mut template = Section::new("sidedetail");
        template.repeat = Some(formdef_model::RepeatSpec {
            source: Some("Which side?".to_string()),
        });
        template
            .children
            .push(Node::Question(Question::new("notes", "Notes")));

        let mut questionnaire = Questionnaire::new("q", "Q");
        questionnaire.children.push(Node::Question(source));
        questionnaire.children.push(Node::Section(template));

        let mut ctx = CompileContext::default();
        ctx.symbols.register("Which side?", "side");

        expand_repeated_sections(&mut questionnaire, &mut ctx);

        let container = questionnaire.children[1].as_section().expect("section");
        assert_eq!(container.children.len(), 2);

        let first = container.children[0].as_section().expect("clone");
        let Some(Condition::Single(conditional)) = &first.condition else {
            panic!("expected clone condition");
        };
        assert_eq!(
            conditional.operand_a,
            OperandValue::Reference("side".to_string())
        );
        assert_eq!(
            conditional.operand_b,
            OperandValue::Literal("left".to_string())
        );
        // Cloned question renamed under the variant prefix.
        assert_eq!(first.children[0].name(), "left_notes");
    }

    #[test]
    fn unknown_enumeration_source_degrades_with_warning() {
        let mut template = Section::new("broken");
        template.repeat = Some(formdef_model::RepeatSpec {
            source: Some("No such question".to_string()),
        });
        let mut questionnaire = Questionnaire::new("q", "Q");
        questionnaire.children.push(Node::Section(template));

        let mut ctx = CompileContext::default();
        expand_repeated_sections(&mut questionnaire, &mut ctx);

        let section = questionnaire.children[0].as_section().expect("section");
        assert!(section.repeat.is_none());
        assert!(ctx.diagnostics.has_warnings());
    }
}
