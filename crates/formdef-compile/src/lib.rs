//! Questionnaire definition compiler.
//!
//! Turns a flat tabular form specification into nested questionnaire
//! documents. Compilation is best-effort by design: malformed cells
//! degrade to safe defaults and are reported as diagnostics, so form
//! authors always get a document to review. Each call owns all of its
//! state; independent tables compile in parallel with no coordination.

pub mod builder;
pub mod condition;
pub mod context;
pub mod expand;
pub mod expression;
pub mod limits;
pub mod options;
pub mod resolve;
pub mod split;

use formdef_ingest::{HeaderConfig, SheetTable};
use formdef_model::{Diagnostics, Questionnaire};

pub use builder::DocumentBuilder;
pub use condition::compile_condition;
pub use context::{CompileContext, CompileOptions, PendingReference, SymbolTable};
pub use expression::rewrite_expression;
pub use options::{OptionListOutcome, parse_option_list};
pub use split::{SplitOutcome, partition_balanced, split_balanced, split_outcome};

/// Result of compiling one input table.
#[derive(Debug)]
pub struct CompileOutput {
    pub questionnaires: Vec<Questionnaire>,
    pub diagnostics: Diagnostics,
}

/// Compile a loaded table into questionnaire documents.
///
/// `fallback_title` names the questionnaire when the table's first row
/// does not; callers typically pass the input file stem.
pub fn compile_table(
    table: &SheetTable,
    fallback_title: &str,
    headers: &HeaderConfig,
    options: CompileOptions,
) -> CompileOutput {
    let builder = DocumentBuilder::new(headers, options);
    let (questionnaires, diagnostics) = builder.build(table, fallback_title);
    CompileOutput {
        questionnaires,
        diagnostics,
    }
}
