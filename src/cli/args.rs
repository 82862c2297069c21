//! Command line argument parsing for the Concierge CLI using clap.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::config::ClassifierKind;

/// Concierge - intent resolution and query dispatch for campus questions
#[derive(Parser, Debug, Clone)]
#[command(name = "concierge")]
#[command(about = "Answer campus questions from structured data")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct ConciergeArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human", global = true)]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Engine configuration file (JSON)
    #[arg(short, long, value_name = "CONFIG_FILE", env = "CONCIERGE_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Campus dataset file (JSON); the built-in sample data otherwise
    #[arg(short, long, value_name = "DATA_FILE", env = "CONCIERGE_DATA", global = true)]
    pub data: Option<PathBuf>,

    /// Override the configured classifier backend
    #[arg(long, global = true)]
    pub classifier: Option<ClassifierKind>,

    /// Resolve relative dates against this day (YYYY-MM-DD)
    #[arg(long, value_name = "DATE", global = true)]
    pub today: Option<NaiveDate>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl ConciergeArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1, // Default to normal
                n => n,
            }
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Interactive conversation on stdin
    Chat(ChatArgs),

    /// Send one or more utterances to a single session
    Ask(AskArgs),

    /// Show how an utterance is classified and which slots it fills
    Classify(ClassifyArgs),

    /// List intents and their slot schemas
    Schema(SchemaArgs),
}

/// Arguments for the interactive chat
#[derive(Parser, Debug, Clone)]
pub struct ChatArgs {
    /// Session identifier (a fresh one is generated when omitted)
    #[arg(short, long)]
    pub session: Option<String>,
}

impl ChatArgs {
    /// The session id to chat under.
    pub fn session_id(&self) -> String {
        self.session
            .clone()
            .unwrap_or_else(|| format!("chat-{}", uuid::Uuid::new_v4()))
    }
}

/// Arguments for one-shot questions
#[derive(Parser, Debug, Clone)]
pub struct AskArgs {
    /// Utterances, handled in order as consecutive turns
    #[arg(value_name = "UTTERANCE", required = true)]
    pub utterances: Vec<String>,

    /// Session identifier
    #[arg(short, long, default_value = "cli")]
    pub session: String,
}

/// Arguments for classification inspection
#[derive(Parser, Debug, Clone)]
pub struct ClassifyArgs {
    /// Utterance to classify
    #[arg(value_name = "UTTERANCE")]
    pub utterance: String,

    /// Number of scored candidates to show
    #[arg(short = 'n', long, default_value = "3")]
    pub top: usize,
}

/// Arguments for schema listing
#[derive(Parser, Debug, Clone)]
pub struct SchemaArgs {
    /// Only show this intent
    #[arg(value_name = "INTENT")]
    pub intent: Option<String>,
}

/// Output format options
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Human-readable text
    Human,
    /// JSON format
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ask_command() {
        let args = ConciergeArgs::try_parse_from([
            "concierge",
            "ask",
            "Exam schedule",
            "for CS101",
            "--session",
            "s1",
        ])
        .unwrap();

        if let Command::Ask(ask_args) = args.command {
            assert_eq!(ask_args.utterances, vec!["Exam schedule", "for CS101"]);
            assert_eq!(ask_args.session, "s1");
        } else {
            panic!("Expected Ask command");
        }
    }

    #[test]
    fn test_chat_session_default() {
        let args = ConciergeArgs::try_parse_from(["concierge", "chat"]).unwrap();
        let Command::Chat(chat_args) = args.command else {
            panic!("Expected Chat command");
        };
        let first = chat_args.session_id();
        assert!(first.starts_with("chat-"));
        assert_ne!(first, chat_args.session_id());

        let args = ConciergeArgs::try_parse_from(["concierge", "chat", "-s", "desk"]).unwrap();
        let Command::Chat(chat_args) = args.command else {
            panic!("Expected Chat command");
        };
        assert_eq!(chat_args.session_id(), "desk");
    }

    #[test]
    fn test_ask_requires_utterance() {
        assert!(ConciergeArgs::try_parse_from(["concierge", "ask"]).is_err());
    }

    #[test]
    fn test_global_options() {
        let args = ConciergeArgs::try_parse_from([
            "concierge",
            "classify",
            "where is the gym",
            "--classifier",
            "tfidf",
            "--today",
            "2026-10-17",
            "--data",
            "campus.json",
        ])
        .unwrap();

        assert_eq!(args.classifier, Some(ClassifierKind::Tfidf));
        assert_eq!(args.today, NaiveDate::from_ymd_opt(2026, 10, 17));
        assert_eq!(args.data, Some(PathBuf::from("campus.json")));
        if let Command::Classify(classify_args) = args.command {
            assert_eq!(classify_args.top, 3);
        } else {
            panic!("Expected Classify command");
        }
    }

    #[test]
    fn test_verbosity_levels() {
        // Default verbosity
        let args = ConciergeArgs::try_parse_from(["concierge", "schema"]).unwrap();
        assert_eq!(args.verbosity(), 1);

        // Multiple verbose flags
        let args = ConciergeArgs::try_parse_from(["concierge", "-vv", "schema"]).unwrap();
        assert_eq!(args.verbosity(), 2);

        // Quiet flag
        let args = ConciergeArgs::try_parse_from(["concierge", "--quiet", "schema"]).unwrap();
        assert_eq!(args.verbosity(), 0);
    }

    #[test]
    fn test_output_format() {
        let args =
            ConciergeArgs::try_parse_from(["concierge", "--format", "json", "schema"]).unwrap();
        assert_eq!(args.output_format, OutputFormat::Json);
    }
}
