//! The `quizforge attempt` command.

use std::io::BufRead;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::mpsc;

use quizforge_core::model::{CanonicalQuestion, QuestionReview};
use quizforge_core::session::AttemptSession;
use quizforge_providers::config::load_config_from;

pub async fn execute(quiz_id: String, time_limit: Option<u64>, config: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config.as_deref())?;
    let runner = config.create_runner()?;

    let mut session = AttemptSession::new(quiz_id).with_content_type(&config.generator.content_type);
    runner
        .prepare(&mut session)
        .await
        .with_context(|| format!("quiz {} could not be prepared", session.quiz_id()))?;

    if let Some(meta) = session.meta() {
        println!("{} ({}, {})\n", meta.title, meta.difficulty, meta.effective_topic());
    }

    let mut answers = spawn_stdin_reader();
    match time_limit {
        Some(secs) => {
            println!("You have {secs}s. Unanswered questions count as wrong.\n");
            let answering = answer_questions(&mut session, &mut answers);
            match tokio::time::timeout(Duration::from_secs(secs), answering).await {
                Ok(result) => result?,
                Err(_) => println!("\nTime is up, submitting."),
            }
        }
        None => answer_questions(&mut session, &mut answers).await?,
    }

    let score = session.submit()?;
    let total = session.questions().len();

    println!("\n{}", review_table(&session.review()));
    println!("Score: {score}/{total}");
    if let Some(recommendation) = session.recommendation() {
        println!("Recommended next quiz: {recommendation}");
    }

    Ok(())
}

/// Read stdin lines on a dedicated thread, off the runtime, so a timed-out
/// attempt leaves no uncancellable read behind. The thread stops once the
/// receiver is dropped or stdin closes.
fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<std::io::Result<String>> {
    let (sender, receiver) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            if sender.send(line).is_err() {
                break;
            }
        }
    });
    receiver
}

/// Prompt for each question and record the selections read from `answers`.
async fn answer_questions(
    session: &mut AttemptSession,
    answers: &mut mpsc::UnboundedReceiver<std::io::Result<String>>,
) -> Result<()> {
    let questions: Vec<CanonicalQuestion> = session.questions().to_vec();

    for (position, question) in questions.iter().enumerate() {
        println!("Question {}/{}", position + 1, questions.len());
        println!("{}", question.prompt_text);
        for option in &question.options {
            println!("  {option}");
        }

        loop {
            let Some(line) = answers.recv().await else {
                return Ok(());
            };
            let line = line.context("failed to read answer")?;
            if line.trim().is_empty() {
                break;
            }
            match pick_option(&question.options, &line) {
                Some(option) => {
                    session.select_answer(position, option)?;
                    break;
                }
                None => println!("Answer with a letter, a number, or leave empty to skip."),
            }
        }
        println!();
    }

    Ok(())
}

/// Interpret typed input as an option: a letter (`b`), a 1-based number
/// (`2`), or the option text itself.
fn pick_option<'a>(options: &'a [String], input: &str) -> Option<&'a str> {
    let input = input.trim();

    let index = match input.parse::<usize>() {
        Ok(n) => n.checked_sub(1),
        Err(_) => {
            let mut chars = input.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if c.is_ascii_alphabetic() => {
                    Some(usize::from(c.to_ascii_uppercase() as u8 - b'A'))
                }
                _ => None,
            }
        }
    };

    match index {
        Some(i) => options.get(i).map(String::as_str),
        None => options
            .iter()
            .find(|option| option.trim() == input)
            .map(String::as_str),
    }
}

fn review_table(reviews: &[QuestionReview]) -> comfy_table::Table {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec!["#", "Your answer", "Correct answer", "Result"]);

    for review in reviews {
        table.add_row(vec![
            Cell::new(review.position + 1),
            Cell::new(review.selected.as_deref().unwrap_or("-")),
            Cell::new(&review.correct_answer_text),
            Cell::new(if review.is_correct { "OK" } else { "WRONG" }),
        ]);
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> Vec<String> {
        vec!["A) red".into(), "B) green".into(), "C) blue".into()]
    }

    #[test]
    fn pick_by_letter_and_number() {
        let options = options();
        assert_eq!(pick_option(&options, "b"), Some("B) green"));
        assert_eq!(pick_option(&options, " C "), Some("C) blue"));
        assert_eq!(pick_option(&options, "1"), Some("A) red"));
    }

    #[test]
    fn pick_by_text() {
        assert_eq!(pick_option(&options(), "B) green"), Some("B) green"));
    }

    #[test]
    fn out_of_range_or_unknown() {
        let options = options();
        assert_eq!(pick_option(&options, "0"), None);
        assert_eq!(pick_option(&options, "4"), None);
        assert_eq!(pick_option(&options, "z"), None);
        assert_eq!(pick_option(&options, "purple"), None);
    }

    #[test]
    fn review_table_marks_results() {
        let reviews = vec![
            QuestionReview {
                position: 0,
                prompt_text: "Sky?".into(),
                selected: Some("C) blue".into()),
                correct_answer_text: "C) blue".into(),
                is_correct: true,
            },
            QuestionReview {
                position: 1,
                prompt_text: "Grass?".into(),
                selected: None,
                correct_answer_text: "B) green".into(),
                is_correct: false,
            },
        ];
        let rendered = review_table(&reviews).to_string();
        assert!(rendered.contains("OK"));
        assert!(rendered.contains("WRONG"));
        assert!(rendered.contains("B) green"));
    }
}
