//! Conversation session: transcript window and the send state machine.
//!
//! The [`SessionManager`] owns the rolling transcript, enforces the
//! single-flight guard (at most one completion request outstanding), and
//! converts every provider failure into a user-facing apology. Nothing in
//! here is fatal: every path returns the session to `Idle`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use crate::profile::Profile;
use crate::providers::{CompletionProvider, CompletionRequest, Message, ProviderError, Role};
use crate::style::derive_prompt;
use crate::ui::{PresentationAdapter, SpeechSink};

/// Maximum retained transcript entries (10 exchanges).
pub const MAX_TRANSCRIPT_TURNS: usize = 20;

/// Greeting rendered when a chat starts with an existing profile.
pub const WELCOME_MESSAGE: &str = "Hey! I'm Rapport and I've learned your communication style. \
     Ready to chat? I'll respond in a way that matches how you naturally talk!";

// ---------------------------------------------------------------------------
// Transcript
// ---------------------------------------------------------------------------

/// Bounded rolling history of chat turns.
///
/// Grows by two entries per completed exchange and evicts oldest-first once
/// past [`MAX_TRANSCRIPT_TURNS`].
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    turns: Vec<Message>,
}

impl Transcript {
    /// Create an empty transcript.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a turn without trimming.
    pub fn push(&mut self, turn: Message) {
        self.turns.push(turn);
    }

    /// Drop oldest turns until within the retention cap.
    pub fn trim(&mut self) {
        let excess = self.turns.len().saturating_sub(MAX_TRANSCRIPT_TURNS);
        if excess > 0 {
            self.turns.drain(0..excess);
        }
    }

    /// All retained turns, oldest first.
    pub fn turns(&self) -> &[Message] {
        &self.turns
    }

    /// Number of retained turns.
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Whether the transcript is empty.
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Forget everything.
    pub fn clear(&mut self) {
        self.turns.clear();
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors surfaced at the session boundary.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// No usable credential; completion requests cannot proceed.
    #[error("no API credential available")]
    CredentialUnavailable,
    /// Empty or whitespace-only input; nothing was sent.
    #[error("message is empty")]
    EmptyMessage,
    /// A completion request is already outstanding.
    #[error("a request is already in flight")]
    Busy,
    /// Transport-level failure reaching the completion endpoint.
    #[error("network failure: {0}")]
    Network(String),
    /// The completion endpoint rejected the request or returned a
    /// malformed body.
    #[error("completion endpoint rejected request: {detail}")]
    RemoteRejected {
        /// Whether the rejection is attributable to the credential.
        credential_related: bool,
        /// Sanitized diagnostic detail.
        detail: String,
    },
}

impl From<ProviderError> for SessionError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Request(e) => Self::Network(e.to_string()),
            ProviderError::HttpStatus { status, body } => Self::RemoteRejected {
                credential_related: matches!(status, 401 | 403),
                detail: format!("status {status}: {body}"),
            },
            ProviderError::Parse(detail) => Self::RemoteRejected {
                credential_related: false,
                detail,
            },
        }
    }
}

/// User-facing apology for a failed exchange.
///
/// Credential problems and connectivity problems get distinguishable
/// wording; everything else stays generic. Never includes raw error bodies.
pub fn apology_for(error: &SessionError) -> String {
    let base = "Sorry, I'm having trouble connecting right now. ";
    let hint = match error {
        SessionError::CredentialUnavailable
        | SessionError::RemoteRejected {
            credential_related: true,
            ..
        } => {
            "It looks like there might be an issue with the API key. \
             Please check your OpenRouter API key and try again."
        }
        SessionError::Network(_) => "Please check your internet connection and try again.",
        _ => "Please try again in a moment.",
    };
    format!("{base}{hint}")
}

// ---------------------------------------------------------------------------
// Session manager
// ---------------------------------------------------------------------------

/// Send state. `AwaitingResponse` while one completion request is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Ready to accept a message.
    Idle,
    /// A completion request is outstanding; new sends are refused.
    AwaitingResponse,
}

/// Owns the transcript and drives the completion exchange.
///
/// Methods take `&self`; the state flag and transcript sit behind short
/// mutexes that are never held across an await. The flag, not the locks, is
/// what enforces single-flight.
pub struct SessionManager {
    provider: Arc<dyn CompletionProvider>,
    presenter: Arc<dyn PresentationAdapter>,
    speech: Arc<dyn SpeechSink>,
    profile: Mutex<Option<Profile>>,
    transcript: Mutex<Transcript>,
    state: Mutex<SessionState>,
    tts_enabled: AtomicBool,
}

impl SessionManager {
    /// Create a session over the given collaborators.
    pub fn new(
        provider: Arc<dyn CompletionProvider>,
        presenter: Arc<dyn PresentationAdapter>,
        speech: Arc<dyn SpeechSink>,
        profile: Option<Profile>,
    ) -> Self {
        Self {
            provider,
            presenter,
            speech,
            profile: Mutex::new(profile),
            transcript: Mutex::new(Transcript::new()),
            state: Mutex::new(SessionState::Idle),
            tts_enabled: AtomicBool::new(false),
        }
    }

    /// Current send state.
    pub fn state(&self) -> SessionState {
        self.state.lock().map(|s| *s).unwrap_or(SessionState::Idle)
    }

    /// Replace the profile used for prompt derivation.
    pub fn set_profile(&self, profile: Option<Profile>) {
        if let Ok(mut slot) = self.profile.lock() {
            *slot = profile;
        }
    }

    /// Snapshot of the retained transcript, oldest first.
    pub fn transcript(&self) -> Vec<Message> {
        self.transcript
            .lock()
            .map(|t| t.turns().to_vec())
            .unwrap_or_default()
    }

    /// Whether speech output is currently enabled.
    pub fn tts_enabled(&self) -> bool {
        self.tts_enabled.load(Ordering::Relaxed)
    }

    /// Flip the speech toggle; returns the new state.
    ///
    /// Enabling speaks a short confirmation so the user hears the voice
    /// immediately.
    pub fn toggle_tts(&self) -> bool {
        let enabled = !self.tts_enabled.fetch_xor(true, Ordering::Relaxed);
        self.presenter.toggle_tts_indicator(enabled);
        if enabled {
            self.speech.speak("Text to speech enabled");
        }
        enabled
    }

    /// Render (and optionally speak) the welcome greeting.
    pub fn welcome(&self) {
        self.presenter.append_message(Role::Assistant, WELCOME_MESSAGE);
        if self.tts_enabled() {
            self.speech.speak(WELCOME_MESSAGE);
        }
    }

    /// Clear the transcript. The profile is the profile store's concern.
    pub fn reset(&self) {
        if let Ok(mut transcript) = self.transcript.lock() {
            transcript.clear();
        }
        debug!("transcript cleared");
    }

    /// Send a user message and await the assistant reply.
    ///
    /// The user turn is appended optimistically before the network call and
    /// is never rolled back on failure. On failure an apology message is
    /// rendered through the presentation adapter (it does not enter the
    /// transcript) and the error is returned for logging. The session is
    /// back in `Idle` on every exit path.
    ///
    /// # Errors
    ///
    /// [`SessionError::EmptyMessage`] for blank input, [`SessionError::Busy`]
    /// when a request is already outstanding (no second request is issued),
    /// or the classified completion failure.
    pub async fn send_message(&self, text: &str) -> Result<String, SessionError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(SessionError::EmptyMessage);
        }

        self.begin_send()?;
        let result = self.run_exchange(text).await;
        self.finish_send();

        match result {
            Ok(reply) => {
                self.presenter.append_message(Role::Assistant, &reply);
                if self.tts_enabled() {
                    self.speech.speak(&reply);
                }
                Ok(reply)
            }
            Err(e) => {
                warn!(error = %e, "exchange failed");
                self.presenter.append_message(Role::Assistant, &apology_for(&e));
                Err(e)
            }
        }
    }

    /// Claim the single-flight slot or refuse.
    fn begin_send(&self) -> Result<(), SessionError> {
        let mut state = self.state.lock().map_err(|_| SessionError::Busy)?;
        if *state == SessionState::AwaitingResponse {
            return Err(SessionError::Busy);
        }
        *state = SessionState::AwaitingResponse;
        Ok(())
    }

    fn finish_send(&self) {
        if let Ok(mut state) = self.state.lock() {
            *state = SessionState::Idle;
        }
        self.presenter.set_typing(false);
        self.presenter.set_processing(false);
    }

    /// One optimistic-append exchange against the completion endpoint.
    async fn run_exchange(&self, text: &str) -> Result<String, SessionError> {
        // Optimistic append; prior history is snapshotted first so the
        // request carries history + new turn without double-counting.
        let prior = {
            let mut transcript = self.transcript.lock().map_err(|_| SessionError::Busy)?;
            let prior = transcript.turns().to_vec();
            transcript.push(Message::user(text));
            prior
        };

        self.presenter.append_message(Role::User, text);
        self.presenter.set_processing(true);
        self.presenter.set_typing(true);

        let system = {
            let profile = self.profile.lock().map_err(|_| SessionError::Busy)?;
            derive_prompt(profile.as_ref())
        };

        let mut messages = prior;
        messages.push(Message::user(text));

        let request = CompletionRequest { system, messages };
        debug!(model = self.provider.model_id(), turns = request.messages.len(), "sending completion request");

        let reply = self.provider.complete(request).await?;

        let mut transcript = self.transcript.lock().map_err(|_| SessionError::Busy)?;
        transcript.push(Message::assistant(reply.clone()));
        transcript.trim();

        Ok(reply)
    }
}
