//! Command implementations.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use comfy_table::Table;
use tracing::{debug, info};

use formdef_compile::{CompileOptions, compile_table};
use formdef_ingest::{HeaderConfig, read_table};
use formdef_model::{Diagnostics, Node, Questionnaire, questionnaire_to_json};

use crate::cli::{CompileArgs, HeadersArgs};
use crate::summary::apply_table_style;

/// Outcome of compiling one input file.
pub struct FileSummary {
    pub input: PathBuf,
    pub forms: Vec<FormSummary>,
    pub diagnostics: Diagnostics,
}

/// Outcome for one questionnaire within an input file.
pub struct FormSummary {
    pub name: String,
    pub title: String,
    pub sections: usize,
    pub questions: usize,
    pub output: Option<PathBuf>,
}

/// Compile every input table and write one JSON document per
/// questionnaire.
pub fn run_compile(args: &CompileArgs) -> Result<Vec<FileSummary>> {
    let headers = load_headers(args.headers.as_deref())?;
    let options = compile_options(args);

    let mut summaries = Vec::new();
    for input in &args.inputs {
        let table = read_table(input)
            .with_context(|| format!("read form specification {}", input.display()))?;
        let title = input
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "questionnaire".to_string());
        info!(input = %input.display(), rows = table.row_count(), "compiling");

        let output = compile_table(&table, &title, &headers, options.clone());
        let output_dir = output_directory(args, input);

        let mut forms = Vec::new();
        for questionnaire in &output.questionnaires {
            let (sections, questions) = count_nodes(questionnaire);
            let written = if args.dry_run {
                None
            } else {
                Some(write_document(questionnaire, &output_dir)?)
            };
            forms.push(FormSummary {
                name: questionnaire.name.clone(),
                title: questionnaire.title.clone(),
                sections,
                questions,
                output: written,
            });
        }
        summaries.push(FileSummary {
            input: input.clone(),
            forms,
            diagnostics: output.diagnostics,
        });
    }
    Ok(summaries)
}

/// Print the active column-role mapping.
pub fn run_headers(args: &HeadersArgs) -> Result<()> {
    let headers = load_headers(args.headers.as_deref())?;
    let mut table = Table::new();
    table.set_header(vec!["Role", "Column header"]);
    apply_table_style(&mut table);
    for (role, header) in headers.entries() {
        table.add_row(vec![role, header]);
    }
    println!("{table}");
    Ok(())
}

fn load_headers(path: Option<&Path>) -> Result<HeaderConfig> {
    match path {
        Some(path) => HeaderConfig::from_json_file(path)
            .with_context(|| format!("load header configuration {}", path.display())),
        None => Ok(HeaderConfig::default()),
    }
}

fn compile_options(args: &CompileArgs) -> CompileOptions {
    let mut options = CompileOptions::default()
        .with_paginate(args.paginate)
        .with_max_per_subject(args.max_per_subject)
        .with_single_answer_default(!args.multi_answer);
    if !args.subject_types.is_empty() {
        options = options.with_subject_types(args.subject_types.clone());
    }
    options
}

fn output_directory(args: &CompileArgs, input: &Path) -> PathBuf {
    args.output_dir.clone().unwrap_or_else(|| {
        input
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    })
}

fn write_document(questionnaire: &Questionnaire, output_dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("create output directory {}", output_dir.display()))?;
    let path = output_dir.join(format!("{}.json", questionnaire.name));
    let document = questionnaire_to_json(questionnaire);
    let mut text = serde_json::to_string_pretty(&document).context("serialize document")?;
    text.push('\n');
    std::fs::write(&path, text).with_context(|| format!("write {}", path.display()))?;
    debug!(path = %path.display(), "wrote document");
    Ok(path)
}

fn count_nodes(questionnaire: &Questionnaire) -> (usize, usize) {
    fn walk(nodes: &[Node], sections: &mut usize, questions: &mut usize) {
        for node in nodes {
            match node {
                Node::Section(section) => {
                    *sections += 1;
                    walk(&section.children, sections, questions);
                }
                Node::Question(_) => *questions += 1,
            }
        }
    }
    let mut sections = 0;
    let mut questions = 0;
    walk(&questionnaire.children, &mut sections, &mut questions);
    (sections, questions)
}
