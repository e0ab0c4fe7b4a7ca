//! Communication-style profile persistence.
//!
//! A [`Profile`] is the four-answer questionnaire record. It is
//! all-or-nothing: [`ProfileStore::save`] rejects any record with an empty
//! answer, so a persisted profile is always complete. A corrupt persisted
//! record is discarded on load and treated as absent.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::storage::{StorageError, StorageProvider};

/// Storage key for the persisted profile.
pub const PROFILE_KEY: &str = "profile";

/// The four questionnaire answers.
///
/// Answers are stored as the option keys the questionnaire presents
/// (`listen`, `research`, ...), but any non-empty string is accepted; the
/// style deriver falls back to a neutral reading for unknown values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// How they respond when a friend brings a problem.
    pub q1: String,
    /// How they make big decisions.
    pub q2: String,
    /// How they prefer hard conversations to go.
    pub q3: String,
    /// How they recharge.
    pub q4: String,
}

/// Errors from profile validation and persistence.
#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    /// One or more questionnaire answers were missing or blank.
    #[error("questionnaire incomplete: missing {0}")]
    Incomplete(String),
    /// The backing store failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Loads, validates, and persists the profile record.
pub struct ProfileStore {
    storage: Arc<dyn StorageProvider>,
}

impl ProfileStore {
    /// Create a profile store over the given storage.
    pub fn new(storage: Arc<dyn StorageProvider>) -> Self {
        Self { storage }
    }

    /// Load the persisted profile.
    ///
    /// A malformed record is removed and reported as absent, never as an
    /// error.
    ///
    /// # Errors
    ///
    /// Returns an error only when the backing store itself fails.
    pub async fn load(&self) -> Result<Option<Profile>, ProfileError> {
        let Some(raw) = self.storage.get(PROFILE_KEY).await? else {
            return Ok(None);
        };

        match serde_json::from_str::<Profile>(&raw) {
            Ok(profile) => Ok(Some(profile)),
            Err(e) => {
                warn!(error = %e, "persisted profile is corrupt, discarding");
                self.storage.remove(PROFILE_KEY).await?;
                Ok(None)
            }
        }
    }

    /// Validate and persist a complete answer set.
    ///
    /// Answers are trimmed before validation; the trimmed record is what
    /// gets persisted and returned. Nothing is written when validation
    /// fails.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::Incomplete`] naming the blank answers, or a
    /// storage error from the write.
    pub async fn save(&self, answers: Profile) -> Result<Profile, ProfileError> {
        let profile = Profile {
            q1: answers.q1.trim().to_owned(),
            q2: answers.q2.trim().to_owned(),
            q3: answers.q3.trim().to_owned(),
            q4: answers.q4.trim().to_owned(),
        };

        let missing: Vec<&str> = [
            ("q1", profile.q1.is_empty()),
            ("q2", profile.q2.is_empty()),
            ("q3", profile.q3.is_empty()),
            ("q4", profile.q4.is_empty()),
        ]
        .iter()
        .filter_map(|(name, empty)| empty.then_some(*name))
        .collect();

        if !missing.is_empty() {
            return Err(ProfileError::Incomplete(missing.join(", ")));
        }

        let encoded = serde_json::to_string(&profile).map_err(StorageError::from)?;
        self.storage.put(PROFILE_KEY, &encoded).await?;
        debug!("profile saved");
        Ok(profile)
    }

    /// Remove the persisted profile.
    ///
    /// # Errors
    ///
    /// Returns an error when the backing store fails.
    pub async fn clear(&self) -> Result<(), ProfileError> {
        self.storage.remove(PROFILE_KEY).await?;
        debug!("profile cleared");
        Ok(())
    }
}
