use clap::Parser;

/// Chat with Gemini about a PDF.
///
/// Provides a terminal REPL: load a PDF with `/upload <path>`, then ask
/// questions about it. The extracted text travels with each new question.
#[derive(Parser, Debug)]
#[command(name = "quibly", version, about = "Ask questions about a PDF from the terminal")]
pub struct CliArgs {
    /// Gemini API key (overrides env var and config file)
    #[arg(long)]
    pub api_key: Option<String>,

    /// Model name override (e.g. gemini-2.0-flash)
    #[arg(long)]
    pub model: Option<String>,

    /// Base URL of the generative language API
    #[arg(long)]
    pub base_url: Option<String>,

    /// Sampling temperature sent with each request
    #[arg(long)]
    pub temperature: Option<f32>,

    /// Upper bound on reply length, in tokens
    #[arg(long)]
    pub max_output_tokens: Option<u32>,

    /// Path to config file (default: ~/.config/quibly/config.toml)
    #[arg(long)]
    pub config: Option<String>,

    /// PDF to load before the first prompt
    #[arg(long)]
    pub file: Option<String>,
}
