//! The `quizforge parse` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use quizforge_core::builder::build_questions;
use quizforge_core::model::CanonicalQuestion;
use quizforge_core::normalizer::recover;

pub fn execute(input: PathBuf, format: String) -> Result<()> {
    let raw = std::fs::read_to_string(&input)
        .with_context(|| format!("failed to read {}", input.display()))?;

    let Some((strategy, payload)) = recover(&raw) else {
        anyhow::bail!("no quiz content could be recovered from {}", input.display());
    };
    let questions = build_questions(&payload);
    eprintln!(
        "Recovered {} of {} entries ({strategy})",
        questions.len(),
        payload.questions.len()
    );

    if questions.is_empty() {
        anyhow::bail!("no valid questions in {}", input.display());
    }

    match format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&questions)?),
        "table" => println!("{}", question_table(&questions)),
        other => anyhow::bail!("unknown format: {other} (expected json or table)"),
    }

    Ok(())
}

fn question_table(questions: &[CanonicalQuestion]) -> comfy_table::Table {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec!["#", "Id", "Question", "Options", "Answer"]);

    for (i, q) in questions.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(&q.id),
            Cell::new(&q.prompt_text),
            Cell::new(q.options.join("\n")),
            Cell::new(&q.correct_answer_text),
        ]);
    }

    table
}
