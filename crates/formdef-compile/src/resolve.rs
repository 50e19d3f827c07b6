//! Forward-reference resolution.
//!
//! Conditionals may reference questions declared later in the table.
//! Once the whole table has been consumed the symbol table is complete,
//! so a single walk over the finished tree patches every pending
//! operand. Texts that never resolved degrade: operand A stays a
//! reference under its raw text (the author meant a question), operand
//! B becomes a literal.

use formdef_model::{Condition, Node, OperandValue, Questionnaire};
use tracing::warn;

use crate::context::CompileContext;

/// Patch pending operands across the questionnaire and report texts
/// that never resolved.
pub fn resolve_references(questionnaire: &mut Questionnaire, ctx: &mut CompileContext) {
    let CompileContext {
        symbols,
        pending,
        diagnostics,
        ..
    } = ctx;

    for node in &mut questionnaire.children {
        resolve_node(node, symbols);
    }

    for entry in pending.drain(..) {
        if symbols.resolve_text(&entry.display_text).is_none() {
            warn!(text = %entry.display_text, "conditional references an unknown question");
            let message = format!(
                "conditional references '{}', which matches no question in this questionnaire",
                entry.display_text
            );
            match entry.row {
                Some(row) => diagnostics.warn_at(row, message),
                None => diagnostics.warn(message),
            }
        }
    }
}

fn resolve_node(node: &mut Node, symbols: &crate::context::SymbolTable) {
    if let Node::Section(section) = node {
        if let Some(condition) = &mut section.condition {
            resolve_condition(condition, symbols);
        }
        for child in &mut section.children {
            resolve_node(child, symbols);
        }
    }
}

fn resolve_condition(condition: &mut Condition, symbols: &crate::context::SymbolTable) {
    condition.for_each_conditional_mut(&mut |conditional| {
        if let OperandValue::Pending(text) = &conditional.operand_a {
            conditional.operand_a = match symbols.resolve_text(text) {
                Some(name) => OperandValue::Reference(name.to_string()),
                None => OperandValue::Reference(text.clone()),
            };
        }
        if let OperandValue::Pending(text) = &conditional.operand_b {
            conditional.operand_b = match symbols.resolve_text(text) {
                Some(name) => OperandValue::Reference(name.to_string()),
                None => OperandValue::Literal(text.clone()),
            };
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use formdef_model::{Comparator, Conditional, Section};

    #[test]
    fn pending_operands_are_patched() {
        let mut section = Section::new("wrap");
        section.condition = Some(Condition::Single(Conditional::new(
            OperandValue::Pending("has symptoms".to_string()),
            Comparator::Eq,
            OperandValue::Literal("1".to_string()),
        )));
        let mut questionnaire = Questionnaire::new("q", "Q");
        questionnaire.children.push(Node::Section(section));

        let mut ctx = CompileContext::default();
        ctx.symbols.register("Has symptoms", "has_symptoms");
        ctx.push_pending("has symptoms");

        resolve_references(&mut questionnaire, &mut ctx);

        let section = questionnaire.children[0].as_section().expect("section");
        let Some(Condition::Single(conditional)) = &section.condition else {
            panic!("expected single conditional");
        };
        assert_eq!(
            conditional.operand_a,
            OperandValue::Reference("has_symptoms".to_string())
        );
        assert!(ctx.pending.is_empty());
        assert!(!ctx.diagnostics.has_warnings());
    }

    #[test]
    fn unresolved_texts_degrade_and_warn() {
        let mut section = Section::new("wrap");
        section.condition = Some(Condition::Single(Conditional::new(
            OperandValue::Pending("never declared".to_string()),
            Comparator::Eq,
            OperandValue::Literal("1".to_string()),
        )));
        let mut questionnaire = Questionnaire::new("q", "Q");
        questionnaire.children.push(Node::Section(section));

        let mut ctx = CompileContext::default();
        ctx.push_pending("never declared");

        resolve_references(&mut questionnaire, &mut ctx);

        let section = questionnaire.children[0].as_section().expect("section");
        let Some(Condition::Single(conditional)) = &section.condition else {
            panic!("expected single conditional");
        };
        // Operand A keeps reference semantics under its raw text.
        assert_eq!(
            conditional.operand_a,
            OperandValue::Reference("never declared".to_string())
        );
        assert!(ctx.diagnostics.has_warnings());
    }
}
