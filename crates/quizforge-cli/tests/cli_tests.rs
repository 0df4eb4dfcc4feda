//! CLI integration tests using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn quizforge() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("quizforge").unwrap()
}

const FENCED: &str = r#"```json
{
  "questions": [
    {"id": "Q1", "scenario": "A table has 10M rows.", "question": "Which index helps range scans?", "options": ["A) Hash", "B) B-tree", "C) Bitmap"]},
    {"id": "Q2", "question": "Primary key implies?", "options": ["A) Unique", "B) Nullable"]}
  ],
  "answer_key": {"Q1": "B", "Q2": "A"}
}
```"#;

/// Raw line break inside a string, LaTeX backslashes, and chatter around the object.
const BROKEN: &str = "Here is your quiz:\n{\"questions\": [{\"question\": \"Simplify \\frac{a}{a}\nfor a != 0\", \"options\": [\"A) 0\", \"B) 1\"]},], \"answer_key\": {\"1\": \"B\"}}\nEnjoy!";

fn write_input(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn parse_fenced_json() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "fenced.txt", FENCED);

    quizforge()
        .arg("parse")
        .arg("--input")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"correct_answer_text\": \"B) B-tree\""))
        .stdout(predicate::str::contains("A table has 10M rows.\\n\\nWhich index"))
        .stderr(predicate::str::contains("Recovered 2 of 2 entries (strict)"));
}

#[test]
fn parse_table_shows_full_prompt() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "fenced.txt", FENCED);

    quizforge()
        .arg("parse")
        .arg("--input")
        .arg(&input)
        .arg("--format")
        .arg("table")
        .assert()
        .success()
        .stdout(predicate::str::contains("A table has 10M rows."))
        .stdout(predicate::str::contains("Which index helps range scans?"))
        .stdout(predicate::str::contains("B) B-tree"));
}

#[test]
fn parse_broken_output_as_table() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "broken.txt", BROKEN);

    quizforge()
        .arg("parse")
        .arg("--input")
        .arg(&input)
        .arg("--format")
        .arg("table")
        .assert()
        .success()
        .stdout(predicate::str::contains("B) 1"))
        .stderr(predicate::str::contains("extract-object"));
}

#[test]
fn parse_without_valid_questions_fails() {
    let dir = TempDir::new().unwrap();
    let input = write_input(
        &dir,
        "lonely.json",
        r#"{"questions": [{"question": "Only one option?", "options": ["A) yes"]}]}"#,
    );

    quizforge()
        .arg("parse")
        .arg("--input")
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("no valid questions"));
}

#[test]
fn parse_unrecoverable_text_fails() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "prose.txt", "Sorry, I cannot help with that.");

    quizforge()
        .arg("parse")
        .arg("--input")
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("no quiz content could be recovered"));
}

#[test]
fn parse_unknown_format() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "fenced.txt", FENCED);

    quizforge()
        .arg("parse")
        .arg("--input")
        .arg(&input)
        .arg("--format")
        .arg("yaml")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown format"));
}

#[test]
fn parse_nonexistent_file() {
    quizforge()
        .arg("parse")
        .arg("--input")
        .arg("nonexistent.txt")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn init_creates_config() {
    let dir = TempDir::new().unwrap();

    quizforge()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created quizforge.toml"));

    assert!(dir.path().join("quizforge.toml").exists());
}

#[test]
fn init_skips_existing() {
    let dir = TempDir::new().unwrap();

    quizforge()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success();

    quizforge()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn attempt_with_missing_config_fails() {
    quizforge()
        .arg("attempt")
        .arg("--quiz-id")
        .arg("abc")
        .arg("--config")
        .arg("no_such_config.toml")
        .assert()
        .failure()
        .stderr(predicate::str::contains("config file not found"));
}

#[test]
fn help_output() {
    quizforge()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("AI-generated quiz attempts"));
}

#[test]
fn version_output() {
    quizforge()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("quizforge"));
}
