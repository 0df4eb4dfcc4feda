//! The `quizforge init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("quizforge.toml").exists() {
        println!("quizforge.toml already exists, skipping.");
    } else {
        std::fs::write("quizforge.toml", SAMPLE_CONFIG)?;
        println!("Created quizforge.toml");
    }

    println!("\nNext steps:");
    println!("  1. Point [metadata] and [generator] at your services");
    println!("  2. Export QUIZFORGE_TOKEN with your bearer token");
    println!("  3. Run: quizforge attempt --quiz-id <ID>");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# quizforge configuration

[metadata]
base_url = "http://localhost:5000"
quiz_path = "/api/aquizzes/a/{id}"
token = "${QUIZFORGE_TOKEN}"

[generator]
base_url = "http://localhost:8000"
content_type = "quiz"
timeout_secs = 120
"#;
