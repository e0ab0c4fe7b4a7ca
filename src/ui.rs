//! Terminal presentation, interactive input, and speech output.
//!
//! The core logic never touches stdin/stdout directly. It talks to three
//! capability traits defined here ([`PresentationAdapter`] for rendering,
//! [`InteractivePrompt`] for reading user input, and [`SpeechSink`] for
//! text-to-speech) so sessions can run against recorded fakes in tests.

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, warn};

use crate::providers::Role;

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// Render commands issued by the session. Fire-and-forget; no return values.
pub trait PresentationAdapter: Send + Sync {
    /// Render a chat message from the given role.
    fn append_message(&self, role: Role, text: &str);

    /// Show or hide the typing indicator.
    fn set_typing(&self, typing: bool);

    /// Enable or disable input while a request is in flight.
    fn set_processing(&self, processing: bool);

    /// Reflect the current text-to-speech toggle state.
    fn toggle_tts_indicator(&self, enabled: bool);
}

/// One question, one answer. Implementations block until the user replies.
#[async_trait]
pub trait InteractivePrompt: Send + Sync {
    /// Display `prompt` and return the user's raw input line.
    ///
    /// # Errors
    ///
    /// Returns an error when input is closed (EOF) or unreadable.
    async fn ask(&self, prompt: &str) -> std::io::Result<String>;
}

/// Vocalizes assistant output. Best-effort; failures are swallowed.
pub trait SpeechSink: Send + Sync {
    /// Speak the given text. No acknowledgment.
    fn speak(&self, text: &str);
}

// ---------------------------------------------------------------------------
// Terminal implementations
// ---------------------------------------------------------------------------

/// Renders chat output as role-tagged lines on stdout.
#[derive(Debug, Default)]
pub struct TerminalPresenter;

impl TerminalPresenter {
    /// Create a terminal presenter.
    pub fn new() -> Self {
        Self
    }
}

impl PresentationAdapter for TerminalPresenter {
    fn append_message(&self, role: Role, text: &str) {
        match role {
            Role::User => println!("You: {text}"),
            Role::Assistant => println!("Rapport: {text}"),
            Role::System => debug!(text, "suppressed system message render"),
        }
    }

    fn set_typing(&self, typing: bool) {
        if typing {
            println!("Rapport is typing...");
        }
    }

    fn set_processing(&self, _processing: bool) {
        // Input gating happens naturally in the line-based loop.
    }

    fn toggle_tts_indicator(&self, enabled: bool) {
        if enabled {
            println!("[speech on]");
        } else {
            println!("[speech off]");
        }
    }
}

/// Reads answers line-by-line from stdin.
#[derive(Debug, Default)]
pub struct TerminalPrompt;

impl TerminalPrompt {
    /// Create a terminal prompt reader.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl InteractivePrompt for TerminalPrompt {
    async fn ask(&self, prompt: &str) -> std::io::Result<String> {
        let mut stdout = tokio::io::stdout();
        stdout.write_all(prompt.as_bytes()).await?;
        stdout.flush().await?;

        let mut line = String::new();
        let mut reader = BufReader::new(tokio::io::stdin());
        let read = reader.read_line(&mut line).await?;
        if read == 0 {
            return Err(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "input closed",
            ));
        }
        Ok(line.trim_end_matches(['\n', '\r']).to_owned())
    }
}

// ---------------------------------------------------------------------------
// Speech sinks
// ---------------------------------------------------------------------------

/// Speech sink that does nothing. Used when TTS is unavailable and in tests.
#[derive(Debug, Default)]
pub struct NullSpeechSink;

impl SpeechSink for NullSpeechSink {
    fn speak(&self, _text: &str) {}
}

/// Speech sink that hands text to an external TTS command (`say`, `espeak`).
///
/// The child process is detached and awaited on a background task so it
/// never blocks the chat loop. Spawn failures are logged and dropped.
#[derive(Debug)]
pub struct CommandSpeechSink {
    program: String,
}

impl CommandSpeechSink {
    /// Create a sink that invokes the given program with the text as its
    /// sole argument.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl SpeechSink for CommandSpeechSink {
    fn speak(&self, text: &str) {
        let spawned = tokio::process::Command::new(&self.program)
            .arg(text)
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .spawn();
        match spawned {
            Ok(mut child) => {
                tokio::spawn(async move {
                    let _ = child.wait().await;
                });
            }
            Err(e) => warn!(program = %self.program, error = %e, "speech command failed to start"),
        }
    }
}
