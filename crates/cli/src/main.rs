mod cli;
mod config;
mod terminal;

use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use quibly_chat::{ChatSession, SendOutcome};
use quibly_core::config::load_dotenv;
use quibly_core::SendRejected;
use quibly_ingest::ExtractionError;
use quibly_llm::{create_provider, GenerationConfig};

use crate::cli::CliArgs;
use crate::config::CliConfig;
use crate::terminal::{Input, Terminal};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();

    load_dotenv();
    let args = CliArgs::parse();
    let terminal = Terminal::new();

    // Load config
    let file_config = CliConfig::load(args.config.as_deref())
        .context("failed to load configuration")?;
    let config = file_config.resolve(&args);
    config.log_summary();

    let gemini = &config.gemini;
    let provider = create_provider(gemini)
        .context("failed to create Gemini provider (set GEMINI_API_KEY or pass --api-key)")?;
    info!(model = %gemini.model, profile = config.profile_label(), "Provider ready");

    let mut chat = ChatSession::new(Box::new(provider)).with_generation_config(
        GenerationConfig::from_settings(gemini.temperature, gemini.max_output_tokens),
    );

    terminal.print_banner(&gemini.model)?;

    if let Some(ref path) = args.file {
        upload(&mut chat, &terminal, Path::new(path)).await?;
    }

    // REPL loop
    loop {
        match terminal.read_input()? {
            Input::Exit => {
                terminal.print_info("Goodbye.")?;
                break;
            }
            Input::Help => terminal.print_help()?,
            Input::History => terminal.print_history(chat.messages())?,
            Input::ShowFile => match chat.pending_document() {
                Some(doc) => terminal.print_file(
                    &doc.file_name,
                    &format!("({} chars of extracted text)", doc.text.chars().count()),
                )?,
                None => terminal.print_info("No document loaded. Use /upload <path>.")?,
            },
            Input::UploadMissingPath => terminal.print_error("usage: /upload <path-to-pdf>")?,
            Input::Upload(path) => upload(&mut chat, &terminal, Path::new(&path)).await?,
            Input::Unknown(command) => {
                terminal.print_error(&format!("unknown command {} (try /help)", command))?
            }
            Input::Message(text) => match chat.check_submission(&text) {
                Err(rejected) => report_rejected(&terminal, rejected)?,
                Ok(()) => {
                    let spinner = terminal.start_typing_indicator()?;
                    let outcome = chat.send_message(&text).await;
                    spinner.stop();

                    match outcome {
                        SendOutcome::Replied(reply) => terminal.print_message(&reply)?,
                        SendOutcome::Ignored(rejected) => report_rejected(&terminal, rejected)?,
                    }
                }
            },
        }
    }

    Ok(())
}

fn report_rejected(terminal: &Terminal, rejected: SendRejected) -> Result<()> {
    match rejected {
        SendRejected::EmptyInput => Ok(()),
        SendRejected::Busy => terminal.print_info("Still waiting for the previous reply."),
    }
}

/// Load a PDF into the session and report the result.
async fn upload(chat: &mut ChatSession, terminal: &Terminal, path: &Path) -> Result<()> {
    match chat.upload_path(path).await {
        Ok(summary) => terminal.print_file(
            &summary.file_name,
            &format!(
                "({} pages, {} chars extracted)",
                summary.page_count, summary.total_chars
            ),
        )?,
        Err(ExtractionError::InvalidDocumentType(mime)) => terminal.print_error(&format!(
            "Please upload a PDF file. {} is {}.",
            path.display(),
            mime
        ))?,
        // Extraction failures are not shown in the conversation.
        Err(ExtractionError::ExtractionFailed(_)) => terminal.print_info(&format!(
            "Could not read text from {}; keeping the current document.",
            path.display()
        ))?,
        Err(ExtractionError::Io(e)) => {
            terminal.print_error(&format!("cannot read {}: {}", path.display(), e))?
        }
    }
    Ok(())
}
