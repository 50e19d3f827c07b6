//! Boolean visibility rules attached to sections.
//!
//! A condition is either a single comparison or a group of
//! sub-conditions combined with AND (`require_all`) or OR semantics.
//! Operands reference other questions by internal name; operands whose
//! referenced question has not been declared yet stay [`Pending`] until
//! the resolution pass patches them.
//!
//! [`Pending`]: OperandValue::Pending

use serde::{Deserialize, Serialize};

/// Comparison operator of a conditional.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Comparator {
    Eq,
    Neq,
    Lt,
    Gt,
    Le,
    Ge,
    IsEmpty,
    IsNotEmpty,
}

impl Comparator {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Neq => "<>",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::Le => "<=",
            Self::Ge => ">=",
            Self::IsEmpty => "is empty",
            Self::IsNotEmpty => "is not empty",
        }
    }

    /// Unary comparators reuse operand A on both sides.
    pub fn is_unary(self) -> bool {
        matches!(self, Self::IsEmpty | Self::IsNotEmpty)
    }
}

/// One side of a comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperandValue {
    /// A plain value compared against an answer.
    Literal(String),
    /// A resolved reference to another question's answer, by internal
    /// name.
    Reference(String),
    /// A reference by display text that could not be resolved when the
    /// conditional was parsed; patched by the resolution pass.
    Pending(String),
}

impl OperandValue {
    pub fn is_reference(&self) -> bool {
        matches!(self, Self::Reference(_) | Self::Pending(_))
    }

    pub fn raw(&self) -> &str {
        match self {
            Self::Literal(value) | Self::Reference(value) | Self::Pending(value) => value,
        }
    }
}

/// A single comparison between an answer and a value or another answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conditional {
    pub operand_a: OperandValue,
    pub comparator: Comparator,
    pub operand_b: OperandValue,
}

impl Conditional {
    pub fn new(operand_a: OperandValue, comparator: Comparator, operand_b: OperandValue) -> Self {
        Self {
            operand_a,
            comparator,
            operand_b,
        }
    }
}

/// AND/OR combination of sub-conditions, in authored order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionalGroup {
    pub require_all: bool,
    pub children: Vec<Condition>,
}

/// A visibility rule: one comparison or a group of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    Single(Conditional),
    Group(ConditionalGroup),
}

impl Condition {
    pub fn group(require_all: bool, children: Vec<Condition>) -> Self {
        Self::Group(ConditionalGroup {
            require_all,
            children,
        })
    }

    /// Visit every conditional in the rule, depth-first.
    pub fn for_each_conditional_mut(&mut self, visit: &mut impl FnMut(&mut Conditional)) {
        match self {
            Self::Single(conditional) => visit(conditional),
            Self::Group(group) => {
                for child in &mut group.children {
                    child.for_each_conditional_mut(visit);
                }
            }
        }
    }

    pub fn for_each_conditional(&self, visit: &mut impl FnMut(&Conditional)) {
        match self {
            Self::Single(conditional) => visit(conditional),
            Self::Group(group) => {
                for child in &group.children {
                    child.for_each_conditional(visit);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comparator_strings() {
        assert_eq!(Comparator::Neq.as_str(), "<>");
        assert!(Comparator::IsEmpty.is_unary());
        assert!(!Comparator::Le.is_unary());
    }

    #[test]
    fn visits_nested_conditionals() {
        let leaf = |name: &str| {
            Condition::Single(Conditional::new(
                OperandValue::Reference(name.to_string()),
                Comparator::Eq,
                OperandValue::Literal("1".to_string()),
            ))
        };
        let condition = Condition::group(true, vec![leaf("a"), Condition::group(false, vec![leaf("b")])]);
        let mut seen = Vec::new();
        condition.for_each_conditional(&mut |conditional| {
            seen.push(conditional.operand_a.raw().to_string());
        });
        assert_eq!(seen, vec!["a", "b"]);
    }
}
