//! Credential resolution order, corruption discard, and persistence.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use rapport::credentials::{Credential, CredentialResolver, CREDENTIAL_KEY};
use rapport::storage::{InMemoryStore, StorageProvider};
use rapport::ui::InteractivePrompt;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::Mutex;

/// 64-char token, comfortably past the corruption threshold.
const VALID_TOKEN: &str = "sk-or-v1-0123456789abcdef0123456789abcdef0123456789abcdef01234567";

/// Prompt fake that replays scripted answers and counts invocations.
struct ScriptedPrompt {
    answers: Mutex<VecDeque<std::io::Result<String>>>,
    calls: AtomicUsize,
}

impl ScriptedPrompt {
    fn new(answers: Vec<std::io::Result<String>>) -> Self {
        Self {
            answers: Mutex::new(answers.into()),
            calls: AtomicUsize::new(0),
        }
    }

    fn never() -> Self {
        Self::new(Vec::new())
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl InteractivePrompt for ScriptedPrompt {
    async fn ask(&self, _prompt: &str) -> std::io::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.answers.lock().await.pop_front().unwrap_or_else(|| {
            Err(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "no scripted answer",
            ))
        })
    }
}

/// Resolver with the remote fetch step disabled (empty config URL).
fn resolver(storage: Arc<dyn StorageProvider>) -> CredentialResolver {
    CredentialResolver::new(storage, "")
}

/// One-shot HTTP server answering a single request with a canned response.
async fn serve_once(status_line: &str, body: &str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("listener binds");
    let addr = listener.local_addr().expect("listener exposes local addr");

    let status_line = status_line.to_owned();
    let body = body.to_owned();
    tokio::spawn(async move {
        if let Ok((mut socket, _)) = listener.accept().await {
            let mut read_buf = [0_u8; 1024];
            let _ = socket.read(&mut read_buf).await;

            let response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = socket.write_all(response.as_bytes()).await;
        }
    });

    format!("http://{addr}/")
}

#[tokio::test]
async fn stored_credential_is_used_without_prompting() {
    let storage = Arc::new(InMemoryStore::new());
    storage
        .put(CREDENTIAL_KEY, VALID_TOKEN)
        .await
        .expect("seed storage");

    let prompt = ScriptedPrompt::never();
    let resolved = resolver(storage).resolve(&prompt).await;

    assert_eq!(resolved.expect("credential resolved").expose(), VALID_TOKEN);
    assert_eq!(prompt.calls(), 0, "stored credential must short-circuit");
}

#[tokio::test]
async fn short_stored_credential_is_discarded_then_prompt_wins() {
    let storage = Arc::new(InMemoryStore::new());
    storage
        .put(CREDENTIAL_KEY, "too-short")
        .await
        .expect("seed storage");

    let prompt = ScriptedPrompt::new(vec![Ok(format!("  {VALID_TOKEN}  "))]);
    let resolved = resolver(Arc::clone(&storage) as Arc<dyn StorageProvider>)
        .resolve(&prompt)
        .await;

    // Prompt input is trimmed, returned, and persisted for next time.
    assert_eq!(resolved.expect("credential resolved").expose(), VALID_TOKEN);
    assert_eq!(prompt.calls(), 1);
    let persisted = storage.get(CREDENTIAL_KEY).await.expect("readable");
    assert_eq!(persisted.as_deref(), Some(VALID_TOKEN));
}

#[tokio::test]
async fn empty_prompt_answer_resolves_to_absent() {
    let storage = Arc::new(InMemoryStore::new());
    let prompt = ScriptedPrompt::new(vec![Ok("   ".to_owned())]);

    let resolved = resolver(Arc::clone(&storage) as Arc<dyn StorageProvider>)
        .resolve(&prompt)
        .await;

    assert!(resolved.is_none());
    let persisted = storage.get(CREDENTIAL_KEY).await.expect("readable");
    assert_eq!(persisted, None, "nothing to persist when absent");
}

#[tokio::test]
async fn prompt_failure_resolves_to_absent() {
    let storage = Arc::new(InMemoryStore::new());
    let prompt = ScriptedPrompt::never();

    let resolved = resolver(storage).resolve(&prompt).await;
    assert!(resolved.is_none());
}

#[tokio::test]
async fn config_endpoint_key_is_persisted_and_used_without_prompting() {
    let storage = Arc::new(InMemoryStore::new());
    let url = serve_once(
        "200 OK",
        &format!(r#"{{"openrouter_api_key":"{VALID_TOKEN}"}}"#),
    )
    .await;

    let prompt = ScriptedPrompt::never();
    let resolver =
        CredentialResolver::new(Arc::clone(&storage) as Arc<dyn StorageProvider>, url);
    let resolved = resolver.resolve(&prompt).await;

    assert_eq!(resolved.expect("credential resolved").expose(), VALID_TOKEN);
    assert_eq!(prompt.calls(), 0, "remote key must short-circuit the prompt");

    // Acquisitions persist so the next run hits the stored-credential step.
    let persisted = storage.get(CREDENTIAL_KEY).await.expect("readable");
    assert_eq!(persisted.as_deref(), Some(VALID_TOKEN));
}

#[tokio::test]
async fn config_endpoint_body_without_key_falls_through_to_prompt() {
    let storage = Arc::new(InMemoryStore::new());
    let url = serve_once("200 OK", r#"{"motd":"hello"}"#).await;

    let prompt = ScriptedPrompt::new(vec![Ok(VALID_TOKEN.to_owned())]);
    let resolver =
        CredentialResolver::new(Arc::clone(&storage) as Arc<dyn StorageProvider>, url);
    let resolved = resolver.resolve(&prompt).await;

    assert_eq!(resolved.expect("credential resolved").expose(), VALID_TOKEN);
    assert_eq!(prompt.calls(), 1);
}

#[tokio::test]
async fn unreachable_config_endpoint_falls_through_to_prompt() {
    let storage = Arc::new(InMemoryStore::new());
    // Discard port; connection is refused immediately, no retries.
    let resolver = CredentialResolver::new(
        Arc::clone(&storage) as Arc<dyn StorageProvider>,
        "http://127.0.0.1:9/config",
    );

    let prompt = ScriptedPrompt::new(vec![Ok(VALID_TOKEN.to_owned())]);
    let resolved = resolver.resolve(&prompt).await;

    assert_eq!(resolved.expect("credential resolved").expose(), VALID_TOKEN);
    assert_eq!(prompt.calls(), 1);
}

#[test]
fn credential_debug_output_is_redacted() {
    let credential = Credential::new(VALID_TOKEN);
    let debugged = format!("{credential:?}");
    assert!(debugged.contains("REDACTED"));
    assert!(!debugged.contains(VALID_TOKEN));
}
