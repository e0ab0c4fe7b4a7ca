//! Shared fakes for session tests: scripted provider, gated provider,
//! recording presenter, counting speech sink.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rapport::providers::{CompletionProvider, CompletionRequest, ProviderError, Role};
use rapport::ui::{PresentationAdapter, SpeechSink};
use tokio::sync::Notify;

/// A scripted provider outcome. `ProviderError` is not `Clone`, so outcomes
/// are materialized on each call.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// Reply with this text.
    Reply(String),
    /// Fail with this HTTP status.
    Status(u16),
    /// Fail with a parse error.
    Parse(String),
}

/// Provider fake that replays scripted outcomes and records requests.
pub struct ScriptedProvider {
    outcomes: Mutex<VecDeque<Outcome>>,
    default: Option<Outcome>,
    pub requests: Mutex<Vec<CompletionRequest>>,
    calls: AtomicUsize,
}

impl ScriptedProvider {
    pub fn new(outcomes: Vec<Outcome>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into()),
            default: None,
            requests: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Provider that always replies with the same text.
    pub fn always(reply: &str) -> Self {
        let mut provider = Self::new(Vec::new());
        provider.default = Some(Outcome::Reply(reply.to_owned()));
        provider
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.requests
            .lock()
            .ok()
            .and_then(|reqs| reqs.last().cloned())
    }
}

#[async_trait]
impl CompletionProvider for ScriptedProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }

        let outcome = self
            .outcomes
            .lock()
            .ok()
            .and_then(|mut q| q.pop_front())
            .or_else(|| self.default.clone())
            .unwrap_or_else(|| Outcome::Parse("no scripted outcome".to_owned()));

        match outcome {
            Outcome::Reply(text) => Ok(text),
            Outcome::Status(status) => Err(ProviderError::HttpStatus {
                status,
                body: "scripted failure".to_owned(),
            }),
            Outcome::Parse(detail) => Err(ProviderError::Parse(detail)),
        }
    }

    fn model_id(&self) -> &str {
        "test/scripted"
    }
}

/// Provider fake that blocks until released, for single-flight tests.
pub struct GatedProvider {
    pub release: Notify,
    calls: AtomicUsize,
}

impl GatedProvider {
    pub fn new() -> Self {
        Self {
            release: Notify::new(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionProvider for GatedProvider {
    async fn complete(&self, _request: CompletionRequest) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.release.notified().await;
        Ok("released".to_owned())
    }

    fn model_id(&self) -> &str {
        "test/gated"
    }
}

/// Presentation fake recording every command.
#[derive(Default)]
pub struct RecordingPresenter {
    pub rendered: Mutex<Vec<(Role, String)>>,
    pub typing: Mutex<Vec<bool>>,
    pub tts_indicator: Mutex<Vec<bool>>,
}

impl RecordingPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rendered_messages(&self) -> Vec<(Role, String)> {
        self.rendered.lock().map(|m| m.clone()).unwrap_or_default()
    }
}

impl PresentationAdapter for RecordingPresenter {
    fn append_message(&self, role: Role, text: &str) {
        if let Ok(mut rendered) = self.rendered.lock() {
            rendered.push((role, text.to_owned()));
        }
    }

    fn set_typing(&self, typing: bool) {
        if let Ok(mut events) = self.typing.lock() {
            events.push(typing);
        }
    }

    fn set_processing(&self, _processing: bool) {}

    fn toggle_tts_indicator(&self, enabled: bool) {
        if let Ok(mut events) = self.tts_indicator.lock() {
            events.push(enabled);
        }
    }
}

/// Speech fake recording spoken lines.
#[derive(Default)]
pub struct RecordingSpeech {
    pub spoken: Mutex<Vec<String>>,
}

impl RecordingSpeech {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spoken_lines(&self) -> Vec<String> {
        self.spoken.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

impl SpeechSink for RecordingSpeech {
    fn speak(&self, text: &str) {
        if let Ok(mut spoken) = self.spoken.lock() {
            spoken.push(text.to_owned());
        }
    }
}

/// Convenience bundle wiring a session's collaborators together.
pub struct Harness {
    pub presenter: Arc<RecordingPresenter>,
    pub speech: Arc<RecordingSpeech>,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            presenter: Arc::new(RecordingPresenter::new()),
            speech: Arc::new(RecordingSpeech::new()),
        }
    }
}
