//! quizforge CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "quizforge", version, about = "AI-generated quiz attempts")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse raw generator output into validated questions
    Parse {
        /// File holding the raw generated text
        #[arg(long)]
        input: PathBuf,

        /// Output format: json, table
        #[arg(long, default_value = "json")]
        format: String,
    },

    /// Take an interactive quiz attempt
    Attempt {
        /// Quiz id in the metadata store
        #[arg(long)]
        quiz_id: String,

        /// Submit automatically after this many seconds
        #[arg(long)]
        time_limit: Option<u64>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create a starter config
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("quizforge=info")),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Parse { input, format } => commands::parse::execute(input, format),
        Commands::Attempt {
            quiz_id,
            time_limit,
            config,
        } => commands::attempt::execute(quiz_id, time_limit, config).await,
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
