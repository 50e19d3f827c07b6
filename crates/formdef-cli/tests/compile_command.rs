//! File-roundtrip tests for the compile command.

use std::fs;

use formdef_cli::cli::CompileArgs;
use formdef_cli::commands::run_compile;

fn compile_args(inputs: Vec<std::path::PathBuf>, output_dir: std::path::PathBuf) -> CompileArgs {
    CompileArgs {
        inputs,
        output_dir: Some(output_dir),
        headers: None,
        paginate: false,
        subject_types: Vec::new(),
        max_per_subject: None,
        multi_answer: false,
        dry_run: false,
    }
}

#[test]
fn compiles_csv_to_json_document() {
    let dir = tempfile::tempdir().expect("temp dir");
    let input = dir.path().join("Intake Form.csv");
    fs::write(
        &input,
        "Variable Name,Question Type,Question Text\n\
         ,section start,Basics\n\
         name,text,Name\n\
         ,section end,\n",
    )
    .expect("write input");

    let output_dir = dir.path().join("out");
    let summaries =
        run_compile(&compile_args(vec![input], output_dir.clone())).expect("compile");

    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].forms.len(), 1);
    let form = &summaries[0].forms[0];
    assert_eq!(form.title, "Intake Form");
    assert_eq!(form.sections, 1);
    assert_eq!(form.questions, 1);

    let output_path = form.output.as_ref().expect("output path");
    assert!(output_path.starts_with(&output_dir));
    let document: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(output_path).expect("read output"))
            .expect("parse output");
    assert_eq!(document["kind"], "questionnaire");
    assert_eq!(document["title"], "Intake Form");
    assert_eq!(document["Basics"]["kind"], "section");
    assert_eq!(document["Basics"]["name"]["kind"], "question");
}

#[test]
fn dry_run_writes_nothing() {
    let dir = tempfile::tempdir().expect("temp dir");
    let input = dir.path().join("form.csv");
    fs::write(
        &input,
        "Variable Name,Question Type,Question Text\nage,long,Age\n",
    )
    .expect("write input");

    let output_dir = dir.path().join("out");
    let mut args = compile_args(vec![input], output_dir.clone());
    args.dry_run = true;
    let summaries = run_compile(&args).expect("compile");

    assert!(summaries[0].forms[0].output.is_none());
    assert!(!output_dir.exists());
}

#[test]
fn missing_input_is_an_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let args = compile_args(
        vec![dir.path().join("no-such-file.csv")],
        dir.path().join("out"),
    );
    assert!(run_compile(&args).is_err());
}

#[test]
fn warnings_do_not_fail_the_run() {
    let dir = tempfile::tempdir().expect("temp dir");
    let input = dir.path().join("form.csv");
    fs::write(
        &input,
        "Variable Name,Question Type,Question Text,Conditional Display\n\
         q,text,Q,A = 1 and B = 2 or C = 3\n",
    )
    .expect("write input");

    let summaries =
        run_compile(&compile_args(vec![input], dir.path().join("out"))).expect("compile");
    assert!(summaries[0].diagnostics.has_warnings());
    assert!(summaries[0].forms[0].output.is_some());
}
