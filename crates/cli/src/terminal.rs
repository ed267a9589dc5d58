use anyhow::Result;
use crossterm::{
    execute,
    style::{Color, Print, ResetColor, SetForegroundColor},
};
use quibly_core::{Message, Role};
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Color scheme for terminal output.
struct Colors;

impl Colors {
    const USER_PROMPT: Color = Color::Green;
    const USER_TEXT: Color = Color::Blue;
    const ASSISTANT_TEXT: Color = Color::Cyan;
    const FILE: Color = Color::DarkGreen;
    const ERROR: Color = Color::Red;
    const DIM: Color = Color::DarkGrey;
    const HEADER: Color = Color::Magenta;
}

/// One line of user input, classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Text to send as a chat message (may be blank).
    Message(String),
    /// `/upload <path>`
    Upload(String),
    /// `/upload` with no path
    UploadMissingPath,
    /// `/file`
    ShowFile,
    /// `/history`
    History,
    /// `/help`
    Help,
    /// Unrecognized slash command
    Unknown(String),
    Exit,
}

impl Input {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        match trimmed {
            "exit" | "quit" | "/exit" | "/quit" => return Input::Exit,
            "/file" => return Input::ShowFile,
            "/history" => return Input::History,
            "/help" | "/?" => return Input::Help,
            "/upload" => return Input::UploadMissingPath,
            _ => {}
        }
        if let Some(path) = trimmed.strip_prefix("/upload ") {
            let path = path.trim().trim_matches('"');
            if path.is_empty() {
                return Input::UploadMissingPath;
            }
            return Input::Upload(path.to_string());
        }
        if trimmed.starts_with('/') {
            let name = trimmed.split_whitespace().next().unwrap_or(trimmed);
            return Input::Unknown(name.to_string());
        }
        // Sent as typed; blank lines are filtered by the session.
        Input::Message(line.trim_end_matches(['\r', '\n']).to_string())
    }
}

/// Manages terminal I/O for the interactive REPL.
pub struct Terminal;

impl Terminal {
    pub fn new() -> Self {
        Self
    }

    /// Print the startup banner.
    pub fn print_banner(&self, model: &str) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::HEADER),
            Print("quibly"),
            ResetColor,
            Print(" - Ask smart questions from your PDF\n"),
            SetForegroundColor(Colors::DIM),
            Print(format!("Model: {}\n", model)),
            Print("Type /upload <file.pdf> to load a document, /help for commands, 'exit' to quit.\n"),
            Print("---\n"),
            ResetColor,
        )?;
        stdout.flush()?;
        Ok(())
    }

    /// Read a line of user input with prompt. End of input counts as exit.
    pub fn read_input(&self) -> Result<Input> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            Print("\n"),
            SetForegroundColor(Colors::USER_PROMPT),
            Print("you> "),
            ResetColor,
        )?;
        stdout.flush()?;

        let mut line = String::new();
        if io::stdin().read_line(&mut line)? == 0 {
            return Ok(Input::Exit);
        }
        Ok(Input::parse(&line))
    }

    /// Print one chat message with its role label.
    pub fn print_message(&self, message: &Message) -> Result<()> {
        let mut stdout = io::stdout();
        let (label, color) = match message.role() {
            Role::User => ("you", Colors::USER_TEXT),
            Role::Assistant => ("quibly", Colors::ASSISTANT_TEXT),
        };
        execute!(
            stdout,
            SetForegroundColor(color),
            Print(format!("{}> ", label)),
            ResetColor,
            Print(message.content()),
            Print("\n"),
        )?;
        stdout.flush()?;
        Ok(())
    }

    /// Reprint the whole conversation in order.
    pub fn print_history(&self, messages: &[Message]) -> Result<()> {
        if messages.is_empty() {
            return self.print_info("No messages yet.");
        }
        for message in messages {
            self.print_message(message)?;
        }
        Ok(())
    }

    pub fn print_file(&self, file_name: &str, detail: &str) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::FILE),
            Print(format!("File: {} ", file_name)),
            SetForegroundColor(Colors::DIM),
            Print(format!("{}\n", detail)),
            ResetColor,
        )?;
        stdout.flush()?;
        Ok(())
    }

    pub fn print_help(&self) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::DIM),
            Print("  /upload <path>  load a PDF; its text is sent with each question\n"),
            Print("  /file           show the loaded document\n"),
            Print("  /history        reprint the conversation\n"),
            Print("  /help           this list\n"),
            Print("  exit, quit      leave\n"),
            ResetColor,
        )?;
        stdout.flush()?;
        Ok(())
    }

    /// Show the "Typing..." indicator. Returns a handle to stop it.
    pub fn start_typing_indicator(&self) -> Result<SpinnerHandle> {
        let running = Arc::new(AtomicBool::new(true));
        let running_clone = running.clone();

        let handle = std::thread::spawn(move || {
            let frames = ['|', '/', '-', '\\'];
            let mut i = 0;
            while running_clone.load(Ordering::SeqCst) {
                let mut stdout = io::stdout();
                execute!(
                    stdout,
                    SetForegroundColor(Colors::DIM),
                    Print(format!("\r{} Typing...", frames[i % frames.len()])),
                    ResetColor,
                )
                .ok();
                stdout.flush().ok();
                i += 1;
                std::thread::sleep(std::time::Duration::from_millis(100));
            }
            // Clear indicator
            let mut stdout = io::stdout();
            execute!(stdout, Print("\r            \r")).ok();
            stdout.flush().ok();
        });

        Ok(SpinnerHandle {
            running,
            thread: Some(handle),
        })
    }

    /// Print an error message.
    pub fn print_error(&self, msg: &str) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::ERROR),
            Print(format!("Error: {}\n", msg)),
            ResetColor,
        )?;
        stdout.flush()?;
        Ok(())
    }

    /// Print an info message.
    pub fn print_info(&self, msg: &str) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::DIM),
            Print(format!("{}\n", msg)),
            ResetColor,
        )?;
        stdout.flush()?;
        Ok(())
    }
}

/// Handle to a running indicator. Drop or call stop() to terminate it.
pub struct SpinnerHandle {
    running: Arc<AtomicBool>,
    thread: Option<std::thread::JoinHandle<()>>,
}

impl SpinnerHandle {
    /// Stop the animation and wait until the line is cleared.
    pub fn stop(mut self) {
        self.halt();
    }

    fn halt(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(thread) = self.thread.take() {
            thread.join().ok();
        }
    }
}

impl Drop for SpinnerHandle {
    fn drop(&mut self) {
        self.halt();
    }
}
