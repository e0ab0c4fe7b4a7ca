//! API credential resolution and storage.
//!
//! The resolver tries three sources in priority order: the local store, a
//! remote configuration endpoint, and finally an interactive prompt. Each
//! source is attempted exactly once; intermediate failures are logged and
//! swallowed. Only the final all-sources-exhausted state is reported to the
//! caller, as `None`.

use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::storage::StorageProvider;
use crate::ui::InteractivePrompt;

/// Storage key for the persisted credential.
pub const CREDENTIAL_KEY: &str = "credential";

/// Persisted values shorter than this are treated as corrupted and dropped.
pub const MIN_CREDENTIAL_LEN: usize = 50;

/// Opaque bearer token for the completion API.
///
/// Debug output is always redacted so the token cannot leak through logs
/// or error messages.
#[derive(Clone)]
pub struct Credential(String);

impl Credential {
    /// Wrap a raw token string.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Expose the token. Use only when building the Authorization header.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credential(__REDACTED__)")
    }
}

/// Shape of the remote configuration endpoint body. All fields optional.
#[derive(Debug, Deserialize)]
struct RemoteConfig {
    openrouter_api_key: Option<String>,
}

/// Resolves and persists the completion API credential.
pub struct CredentialResolver {
    storage: Arc<dyn StorageProvider>,
    http: reqwest::Client,
    config_url: String,
}

impl CredentialResolver {
    /// Create a resolver over the given store and configuration endpoint.
    pub fn new(storage: Arc<dyn StorageProvider>, config_url: impl Into<String>) -> Self {
        Self {
            storage,
            http: reqwest::Client::new(),
            config_url: config_url.into(),
        }
    }

    /// Resolve a credential: stored value, then remote config, then prompt.
    ///
    /// Returns `None` when every source comes up empty. The caller must then
    /// treat completion requests as impossible.
    pub async fn resolve(&self, prompt: &dyn InteractivePrompt) -> Option<Credential> {
        if let Some(stored) = self.load_stored().await {
            return Some(stored);
        }

        if let Some(fetched) = self.fetch_remote().await {
            self.persist(&fetched).await;
            return Some(Credential::new(fetched));
        }

        self.ask_user(prompt).await
    }

    /// Step 1: persisted credential, with a minimum-length corruption check.
    async fn load_stored(&self) -> Option<Credential> {
        let stored = match self.storage.get(CREDENTIAL_KEY).await {
            Ok(value) => value?,
            Err(e) => {
                warn!(error = %e, "could not read stored credential");
                return None;
            }
        };

        if stored.len() < MIN_CREDENTIAL_LEN {
            warn!(len = stored.len(), "stored credential looks corrupted, discarding");
            if let Err(e) = self.storage.remove(CREDENTIAL_KEY).await {
                warn!(error = %e, "could not remove corrupted credential");
            }
            return None;
        }

        debug!("using stored credential");
        Some(Credential::new(stored))
    }

    /// Step 2: single best-effort GET against the configuration endpoint.
    async fn fetch_remote(&self) -> Option<String> {
        if self.config_url.is_empty() {
            debug!("no configuration endpoint set, skipping remote fetch");
            return None;
        }

        let response = match self.http.get(&self.config_url).send().await {
            Ok(response) => response,
            Err(e) => {
                debug!(error = %e, "configuration endpoint unreachable, will prompt");
                return None;
            }
        };

        if !response.status().is_success() {
            debug!(status = %response.status(), "configuration endpoint rejected request");
            return None;
        }

        let config: RemoteConfig = match response.json().await {
            Ok(config) => config,
            Err(e) => {
                debug!(error = %e, "configuration endpoint body malformed");
                return None;
            }
        };

        let key = config.openrouter_api_key?;
        info!("credential obtained from configuration endpoint");
        Some(key)
    }

    /// Step 3: ask the user once. Empty input means no credential.
    async fn ask_user(&self, prompt: &dyn InteractivePrompt) -> Option<Credential> {
        let asked = prompt
            .ask(
                "Please enter your OpenRouter API key (free at https://openrouter.ai/; \
                 it will be saved locally): ",
            )
            .await;

        let entered = match asked {
            Ok(entered) => entered.trim().to_owned(),
            Err(e) => {
                warn!(error = %e, "credential prompt failed");
                return None;
            }
        };

        if entered.is_empty() {
            return None;
        }

        self.persist(&entered).await;
        Some(Credential::new(entered))
    }

    async fn persist(&self, token: &str) {
        if let Err(e) = self.storage.put(CREDENTIAL_KEY, token).await {
            warn!(error = %e, "could not persist credential, it will be requested again");
        }
    }
}
