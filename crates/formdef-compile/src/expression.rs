//! Computed-expression rewriting.
//!
//! Authors write calculations over question names in plain infix form
//! (`weight / height`); the store executes expressions with variable
//! references wrapped as `@{name}` and a leading `return`. Expressions
//! already starting with `return` are taken as-is.

/// Characters that delimit variable references.
const CONTROL_CHARS: &str = "+-/* ()\"";
/// Characters that belong to either side and never open a reference.
const NEUTRAL_CHARS: &str = ".0123456789:-";

/// Rewrite a calculation cell into executable form.
pub fn rewrite_expression(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with("return") {
        return trimmed.to_string();
    }
    let mut out = String::with_capacity(trimmed.len() + 16);
    out.push_str("return ");
    let mut in_reference = false;
    for ch in trimmed.chars() {
        let neutral = NEUTRAL_CHARS.contains(ch);
        let control = CONTROL_CHARS.contains(ch);
        if !neutral {
            if !in_reference && !control {
                out.push_str("@{");
                in_reference = true;
            } else if in_reference && control {
                out.push('}');
                in_reference = false;
            }
        }
        out.push(ch);
    }
    if in_reference {
        out.push('}');
    }
    out
}
