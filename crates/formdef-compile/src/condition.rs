//! Conditional expression compilation.
//!
//! Turns a free-text condition cell into a boolean expression tree over
//! question references. Authors mix natural-language lead-ins
//! (`show only if ...`), comparator synonyms (`... was 3`), and/or
//! chains, and comma-separated operand lists; all of it normalizes to
//! single comparisons or AND/OR groups. A cell that mixes `and` and
//! `or` without explicit grouping is ambiguous: it is reported and
//! skipped, never guessed at.

use formdef_model::{Comparator, Condition, Conditional, OperandValue};

use crate::context::CompileContext;
use crate::split::{split_balanced, split_outcome};

/// Lead-in phrases stripped before parsing, longest first.
const LEAD_IN_PHRASES: &[&str] = &[
    "show the field only if:",
    "show the field only if",
    "show this field only if",
    "show this field if",
    "show field only if",
    "show field if",
    "show only if:",
    "show only if",
    "displayed if:",
    "displayed if",
    "if",
];

/// Natural-language comparator synonyms normalized to `=`.
const COMPARATOR_SYNONYMS: &[&str] = &[
    " selection was ",
    " selections is ",
    " selection is ",
    " response is ",
    " was ",
    " is ",
];

/// Comparison tokens in scan order: longer tokens before the tokens
/// they start with.
const OPERATOR_TOKENS: &[(&str, Comparator)] = &[
    ("is not empty", Comparator::IsNotEmpty),
    ("is empty", Comparator::IsEmpty),
    ("<=", Comparator::Le),
    (">=", Comparator::Ge),
    ("<>", Comparator::Neq),
    ("=", Comparator::Eq),
    ("<", Comparator::Lt),
    (">", Comparator::Gt),
];

/// Compile a condition cell into a visibility rule. Returns `None` on
/// unparseable or ambiguous input, recording the problem in the
/// context's diagnostics.
pub fn compile_condition(cell: &str, ctx: &mut CompileContext) -> Option<Condition> {
    let normalized = normalize_condition_cell(cell);
    if normalized.is_empty() {
        ctx.warn(format!("empty conditional after normalizing '{}'", cell.trim()));
        return None;
    }
    compile_block(&normalized, ctx)
}

/// Strip one lead-in phrase and rewrite comparator synonyms.
fn normalize_condition_cell(cell: &str) -> String {
    let mut text = cell.trim().to_string();
    let lowered = text.to_ascii_lowercase();
    for phrase in LEAD_IN_PHRASES {
        if lowered.starts_with(phrase) {
            let boundary_ok = phrase.ends_with(':')
                || lowered[phrase.len()..]
                    .chars()
                    .next()
                    .is_none_or(|ch| ch.is_whitespace() || ch == '(');
            if boundary_ok {
                text = text[phrase.len()..].trim().to_string();
                break;
            }
        }
    }
    let lowered = text.to_ascii_lowercase();
    if !lowered.ends_with("is empty") && !lowered.ends_with("is not empty") {
        for synonym in COMPARATOR_SYNONYMS {
            text = replace_ignore_case(&text, synonym, " = ");
        }
    }
    text
}

fn replace_ignore_case(text: &str, pattern: &str, replacement: &str) -> String {
    let lowered = text.to_ascii_lowercase();
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0usize;
    while let Some(found) = lowered[cursor..].find(pattern) {
        let start = cursor + found;
        out.push_str(&text[cursor..start]);
        out.push_str(replacement);
        cursor = start + pattern.len();
    }
    out.push_str(&text[cursor..]);
    out
}

fn compile_block(text: &str, ctx: &mut CompileContext) -> Option<Condition> {
    let text = strip_enclosing_parens(text);
    let or_parts = split_balanced(text, &[" or "]);
    let and_parts = split_balanced(text, &[" and "]);
    if or_parts.len() > 1 && and_parts.len() > 1 {
        ctx.warn(format!(
            "ambiguous conditional '{text}': separate 'and' and 'or' statements into groups using '()'"
        ));
        return None;
    }
    if or_parts.len() > 1 {
        return compile_group(&or_parts, false, ctx);
    }
    if and_parts.len() > 1 {
        return compile_group(&and_parts, true, ctx);
    }
    compile_single(text, ctx)
}

fn compile_group(parts: &[String], require_all: bool, ctx: &mut CompileContext) -> Option<Condition> {
    let children: Vec<Condition> = parts
        .iter()
        .filter_map(|part| compile_block(part, ctx))
        .collect();
    if children.is_empty() {
        None
    } else {
        Some(Condition::group(require_all, children))
    }
}

/// Strip one layer of parentheses when they wrap the whole string.
fn strip_enclosing_parens(text: &str) -> &str {
    let trimmed = text.trim();
    if !(trimmed.starts_with('(') && trimmed.ends_with(')')) {
        return trimmed;
    }
    let mut depth = 0i32;
    for (index, ch) in trimmed.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                // the opening paren closes before the end: not a wrap
                if depth == 0 && index != trimmed.len() - 1 {
                    return trimmed;
                }
            }
            _ => {}
        }
    }
    if depth == 0 {
        trimmed[1..trimmed.len() - 1].trim()
    } else {
        trimmed
    }
}

/// Locate the first top-level comparison operator, left to right.
fn find_operator(text: &str) -> Option<(usize, &'static str, Comparator)> {
    let mut stack: Vec<char> = Vec::new();
    let mut i = 0usize;
    while i < text.len() {
        let ch = text[i..].chars().next().expect("char at boundary");
        if stack.last() == Some(&ch) {
            stack.pop();
        } else if let Some(close) = crate::split::closing_for(ch) {
            stack.push(close);
        } else if stack.is_empty() {
            for (token, comparator) in OPERATOR_TOKENS {
                if text[i..].starts_with(token) {
                    return Some((i, token, *comparator));
                }
            }
        }
        i += ch.len_utf8();
    }
    None
}

fn compile_single(text: &str, ctx: &mut CompileContext) -> Option<Condition> {
    let Some((index, token, comparator)) = find_operator(text) else {
        ctx.warn(format!("could not parse conditional '{text}'"));
        return None;
    };
    let left = text[..index].trim();
    let right = text[index + token.len()..].trim();
    if left.is_empty() {
        ctx.warn(format!("conditional '{text}' is missing its left operand"));
        return None;
    }
    if comparator.is_unary() {
        return build_comparison(left, comparator, None, ctx);
    }
    if right.is_empty() {
        ctx.warn(format!("conditional '{text}' is missing its right operand"));
        return None;
    }
    build_comparison(left, comparator, Some(right), ctx)
}

/// Build the comparison, expanding comma-separated operands into a
/// group. The `all` keyword on the expanded operand selects AND
/// semantics for the group.
fn build_comparison(
    left: &str,
    comparator: Comparator,
    right: Option<&str>,
    ctx: &mut CompileContext,
) -> Option<Condition> {
    let (left, left_all) = strip_all_keyword(left);
    let left_parts = operand_list(&left);
    let Some(right) = right else {
        return Some(Condition::Single(make_conditional(&left, comparator, None, ctx)));
    };
    let (right, right_all) = strip_all_keyword(right);
    let right_parts = operand_list(&right);

    if left_parts.len() > 1 {
        let children = left_parts
            .iter()
            .map(|item| {
                Condition::Single(make_conditional(item, comparator, Some(right.as_str()), ctx))
            })
            .collect();
        return Some(Condition::group(left_all, children));
    }
    if right_parts.len() > 1 {
        let children = right_parts
            .iter()
            .map(|item| {
                Condition::Single(make_conditional(&left, comparator, Some(item.as_str()), ctx))
            })
            .collect();
        return Some(Condition::group(right_all, children));
    }
    Some(Condition::Single(make_conditional(
        &left,
        comparator,
        Some(right.as_str()),
        ctx,
    )))
}

fn operand_list(operand: &str) -> Vec<String> {
    split_outcome(operand, &[","], None)
        .parts
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect()
}

fn strip_all_keyword(operand: &str) -> (String, bool) {
    let trimmed = operand.trim();
    let lowered = trimmed.to_ascii_lowercase();
    if lowered.starts_with("all ") {
        return (trimmed[4..].trim().to_string(), true);
    }
    if lowered.ends_with(" all") {
        return (trimmed[..trimmed.len() - 4].trim().to_string(), true);
    }
    (trimmed.to_string(), false)
}

fn make_conditional(
    left: &str,
    comparator: Comparator,
    right: Option<&str>,
    ctx: &mut CompileContext,
) -> Conditional {
    let left = strip_quotes(left);
    let operand_a = resolve_operand_a(left, ctx);
    let operand_b = match right {
        None => operand_a.clone(),
        Some(right) => resolve_operand_b(strip_quotes(right), ctx),
    };
    Conditional::new(operand_a, comparator, operand_b)
}

fn strip_quotes(value: &str) -> &str {
    let trimmed = value.trim();
    if trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"') {
        &trimmed[1..trimmed.len() - 1]
    } else {
        trimmed
    }
}

/// Operand A is always a question reference: resolved through the
/// symbol table when possible, otherwise registered as pending and
/// patched once the referenced question is declared.
fn resolve_operand_a(raw: &str, ctx: &mut CompileContext) -> OperandValue {
    if let Some(name) = ctx.symbols.resolve_text(raw) {
        return OperandValue::Reference(name.to_string());
    }
    let lowered = raw.to_lowercase();
    if ctx.symbols.contains_name(&lowered) {
        return OperandValue::Reference(lowered);
    }
    ctx.push_pending(&lowered);
    OperandValue::Pending(lowered)
}

/// Operand B is a literal unless it names a known question; yes/no
/// literals normalize to the store's boolean encoding.
fn resolve_operand_b(raw: &str, ctx: &CompileContext) -> OperandValue {
    let lowered = raw.to_lowercase();
    match lowered.as_str() {
        "yes" => return OperandValue::Literal("1".to_string()),
        "no" => return OperandValue::Literal("0".to_string()),
        _ => {}
    }
    if ctx.symbols.contains_name(&lowered) {
        OperandValue::Reference(lowered)
    } else {
        OperandValue::Literal(lowered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formdef_model::ConditionalGroup;

    fn context() -> CompileContext {
        CompileContext::default()
    }

    fn group(condition: Condition) -> ConditionalGroup {
        match condition {
            Condition::Group(group) => group,
            Condition::Single(_) => panic!("expected a group"),
        }
    }

    fn single(condition: Condition) -> Conditional {
        match condition {
            Condition::Single(conditional) => conditional,
            Condition::Group(_) => panic!("expected a single conditional"),
        }
    }

    #[test]
    fn and_chain_requires_all() {
        let mut ctx = context();
        let condition = compile_condition("if A = 1 and B = 2", &mut ctx).expect("condition");
        let group = group(condition);
        assert!(group.require_all);
        assert_eq!(group.children.len(), 2);
    }

    #[test]
    fn or_chain_requires_any() {
        let mut ctx = context();
        let condition = compile_condition("if A = 1 or B = 2", &mut ctx).expect("condition");
        let group = group(condition);
        assert!(!group.require_all);
        assert_eq!(group.children.len(), 2);
    }

    #[test]
    fn mixed_and_or_is_skipped_with_warning() {
        let mut ctx = context();
        let condition = compile_condition("A = 1 and B = 2 or C = 3", &mut ctx);
        assert!(condition.is_none());
        assert!(ctx.diagnostics.has_warnings());
    }

    #[test]
    fn explicit_grouping_disambiguates() {
        let mut ctx = context();
        let condition =
            compile_condition("(A = 1 and B = 2) or C = 3", &mut ctx).expect("condition");
        let outer = group(condition);
        assert!(!outer.require_all);
        assert_eq!(outer.children.len(), 2);
        let inner = group(outer.children[0].clone());
        assert!(inner.require_all);
    }

    #[test]
    fn longer_operators_win_over_prefixes() {
        let mut ctx = context();
        let conditional = single(compile_condition("score <= 10", &mut ctx).expect("condition"));
        assert_eq!(conditional.comparator, Comparator::Le);
        assert_eq!(conditional.operand_b, OperandValue::Literal("10".to_string()));

        let conditional = single(compile_condition("score <> 10", &mut ctx).expect("condition"));
        assert_eq!(conditional.comparator, Comparator::Neq);
    }

    #[test]
    fn unary_phrases_reuse_operand_a() {
        let mut ctx = context();
        let conditional = single(compile_condition("consent is empty", &mut ctx).expect("condition"));
        assert_eq!(conditional.comparator, Comparator::IsEmpty);
        assert_eq!(conditional.operand_a, conditional.operand_b);
    }

    #[test]
    fn yes_no_literals_are_encoded() {
        let mut ctx = context();
        let conditional = single(compile_condition("smoker = Yes", &mut ctx).expect("condition"));
        assert_eq!(conditional.operand_b, OperandValue::Literal("1".to_string()));
        let conditional = single(compile_condition("smoker = no", &mut ctx).expect("condition"));
        assert_eq!(conditional.operand_b, OperandValue::Literal("0".to_string()));
    }

    #[test]
    fn comma_operand_expands_with_all_keyword() {
        let mut ctx = context();
        let condition =
            compile_condition("flags = all 1, 2, 3", &mut ctx).expect("condition");
        let group = group(condition);
        assert!(group.require_all);
        assert_eq!(group.children.len(), 3);
    }

    #[test]
    fn resolved_references_use_internal_names() {
        let mut ctx = context();
        ctx.symbols.register("Any symptoms?", "any_symptoms");
        let conditional =
            single(compile_condition("if Any symptoms? = yes", &mut ctx).expect("condition"));
        assert_eq!(
            conditional.operand_a,
            OperandValue::Reference("any_symptoms".to_string())
        );
    }

    #[test]
    fn forward_reference_is_registered_pending() {
        let mut ctx = context();
        let conditional =
            single(compile_condition("if Later question = 1", &mut ctx).expect("condition"));
        assert_eq!(
            conditional.operand_a,
            OperandValue::Pending("later question".to_string())
        );
        assert_eq!(ctx.pending.len(), 1);
        assert_eq!(ctx.pending[0].display_text, "later question");
    }

    #[test]
    fn synonyms_normalize_to_equals() {
        let mut ctx = context();
        let conditional =
            single(compile_condition("show only if severity was 3", &mut ctx).expect("condition"));
        assert_eq!(conditional.comparator, Comparator::Eq);
        assert_eq!(conditional.operand_b, OperandValue::Literal("3".to_string()));
    }

    #[test]
    fn quoted_operands_keep_embedded_delimiters() {
        let mut ctx = context();
        let conditional = single(
            compile_condition(r#"status = "red, amber""#, &mut ctx).expect("condition"),
        );
        assert_eq!(
            conditional.operand_b,
            OperandValue::Literal("red, amber".to_string())
        );
    }
}
