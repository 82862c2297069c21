//! Command implementations for the Concierge CLI.

use std::sync::Arc;

use log::debug;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::cli::args::*;
use crate::cli::output::*;
use crate::config::EngineConfig;
use crate::dispatch::{DataSource, InMemoryCampusStore};
use crate::engine::ConciergeEngine;
use crate::error::Result;
use crate::intent::Intent;
use crate::slot::SlotSchema;

/// Execute a CLI command.
pub async fn execute_command(args: ConciergeArgs) -> Result<()> {
    match &args.command {
        Command::Chat(chat_args) => chat(chat_args.clone(), &args).await,
        Command::Ask(ask_args) => ask(ask_args.clone(), &args).await,
        Command::Classify(classify_args) => classify(classify_args.clone(), &args),
        Command::Schema(schema_args) => show_schema(schema_args.clone(), &args),
    }
}

/// Build an engine from the global options.
pub fn build_engine(cli_args: &ConciergeArgs) -> Result<ConciergeEngine> {
    let mut config = match &cli_args.config {
        Some(path) => EngineConfig::from_json_file(path)?,
        None => EngineConfig::default(),
    };
    if let Some(kind) = cli_args.classifier {
        config.classifier = kind;
    }

    let source: Arc<dyn DataSource> = match &cli_args.data {
        Some(path) => Arc::new(InMemoryCampusStore::from_path(path)?),
        None => Arc::new(InMemoryCampusStore::builtin()?),
    };

    let mut builder = ConciergeEngine::builder(source).config(config);
    if let Some(today) = cli_args.today {
        builder = builder.reference_date(today);
    }
    builder.build()
}

/// Interactive conversation until EOF or `/quit`.
async fn chat(args: ChatArgs, cli_args: &ConciergeArgs) -> Result<()> {
    let engine = build_engine(cli_args)?;
    let sweeper = engine.spawn_sweeper();
    let session_id = args.session_id();
    debug!("Chatting as session {session_id}");

    if cli_args.verbosity() > 0 && cli_args.output_format == OutputFormat::Human {
        println!("Ask about library hours, exams, classes, facilities, dining, books or procedures.");
        println!("Type /reset to start over, /quit to leave.");
    }

    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        if cli_args.output_format == OutputFormat::Human {
            stdout.write_all(b"> ").await?;
            stdout.flush().await?;
        }
        let Some(line) = lines.next_line().await? else {
            break;
        };
        match line.trim() {
            "" => continue,
            "/quit" | "/exit" => break,
            "/reset" => {
                engine.end_session(&session_id).await;
                continue;
            }
            text => {
                let payload = engine.handle_utterance(&session_id, text).await;
                output_payload(&payload, cli_args)?;
            }
        }
    }

    engine.end_session(&session_id).await;
    sweeper.shutdown().await;
    Ok(())
}

async fn ask(args: AskArgs, cli_args: &ConciergeArgs) -> Result<()> {
    let engine = build_engine(cli_args)?;
    for utterance in &args.utterances {
        if cli_args.verbosity() > 1 && cli_args.output_format == OutputFormat::Human {
            println!("> {utterance}");
        }
        let payload = engine.handle_utterance(&args.session, utterance).await;
        output_payload(&payload, cli_args)?;
    }
    Ok(())
}

fn classify(args: ClassifyArgs, cli_args: &ConciergeArgs) -> Result<()> {
    let engine = build_engine(cli_args)?;
    let classification = engine.classify(&args.utterance);

    let target = if classification.is_unknown() {
        classification.raw_intent
    } else {
        classification.intent
    };
    let slots = engine.extract(target, &args.utterance);

    let report = ClassificationReport::new(&classification, &slots, args.top, engine.config());
    output_result(&report, cli_args)
}

fn show_schema(args: SchemaArgs, cli_args: &ConciergeArgs) -> Result<()> {
    let intents: Vec<Intent> = match &args.intent {
        Some(name) => vec![name.parse()?],
        None => Intent::SUPPORTED.to_vec(),
    };
    let schemas: Vec<SchemaListing> = intents
        .into_iter()
        .map(|intent| SchemaListing::new(SlotSchema::for_intent(intent)))
        .collect();
    output_result(&schemas, cli_args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_build_engine_with_overrides() {
        let args = ConciergeArgs::try_parse_from([
            "concierge",
            "--classifier",
            "tfidf",
            "--today",
            "2026-10-17",
            "schema",
        ])
        .unwrap();
        let engine = build_engine(&args).unwrap();
        assert_eq!(engine.config().classifier, crate::config::ClassifierKind::Tfidf);
    }

    #[test]
    fn test_build_engine_missing_data_file() {
        let args = ConciergeArgs::try_parse_from([
            "concierge",
            "--data",
            "/nonexistent/campus.json",
            "schema",
        ])
        .unwrap();
        assert!(build_engine(&args).is_err());
    }
}
