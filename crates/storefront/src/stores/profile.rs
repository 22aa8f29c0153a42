//! The user profile store.
//!
//! Validates profile edits and persists the result to local storage.
//! Validation failures are user-facing messages; the stored profile is
//! never left half-updated.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::watch;

use marigold_core::{Email, EmailError};

use crate::models::profile::{ProfileInput, UserProfile};
use crate::storage::{StorageArea, keys};

/// User-facing profile validation rejections.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProfileError {
    /// The name field was empty.
    #[error("Name is required")]
    NameRequired,

    /// The email field did not parse.
    #[error("Enter a valid email address")]
    InvalidEmail(#[source] EmailError),

    /// The phone field did not look like a phone number.
    #[error("Enter a valid phone number")]
    InvalidPhone,
}

/// The user profile store.
///
/// Cheaply cloneable; clones share the same profile.
#[derive(Clone)]
pub struct ProfileStore {
    inner: Arc<ProfileInner>,
}

struct ProfileInner {
    state: watch::Sender<UserProfile>,
    local: StorageArea,
}

impl ProfileStore {
    /// Build the store, hydrating from local storage.
    pub(crate) fn hydrate(local: StorageArea) -> Self {
        let profile = match local.get::<UserProfile>(keys::PROFILE) {
            Ok(Some(profile)) => profile,
            Ok(None) => UserProfile::default(),
            Err(e) => {
                tracing::warn!(error = %e, "Discarding unreadable persisted profile");
                UserProfile::default()
            }
        };

        Self {
            inner: Arc::new(ProfileInner {
                state: watch::channel(profile).0,
                local,
            }),
        }
    }

    /// Subscribe to profile changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<UserProfile> {
        self.inner.state.subscribe()
    }

    /// The current profile.
    #[must_use]
    pub fn profile(&self) -> UserProfile {
        self.inner.state.borrow().clone()
    }

    /// Validate and save a profile edit.
    ///
    /// Empty optional fields (email, phone, address) clear the stored
    /// value. Returns the saved profile.
    ///
    /// # Errors
    ///
    /// Rejects an empty name, an unparseable email, or an implausible
    /// phone number; the stored profile is unchanged on rejection.
    pub fn update(&self, input: &ProfileInput) -> Result<UserProfile, ProfileError> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(ProfileError::NameRequired);
        }

        let email = match input.email.trim() {
            "" => None,
            raw => Some(Email::parse(raw).map_err(ProfileError::InvalidEmail)?),
        };

        let phone = match input.phone.trim() {
            "" => None,
            raw => {
                if !plausible_phone(raw) {
                    return Err(ProfileError::InvalidPhone);
                }
                Some(raw.to_string())
            }
        };

        let address = match input.address.trim() {
            "" => None,
            raw => Some(raw.to_string()),
        };

        let profile = UserProfile {
            name: name.to_string(),
            email,
            phone,
            address,
            updated_at: Some(Utc::now()),
        };

        self.inner.state.send_replace(profile.clone());
        if let Err(e) = self.inner.local.insert(keys::PROFILE, &profile) {
            tracing::warn!(error = %e, "Failed to persist profile");
        }
        tracing::debug!("Profile saved");

        Ok(profile)
    }
}

/// Loose phone check: an optional leading `+`, common separators, and
/// 7 to 15 digits.
fn plausible_phone(raw: &str) -> bool {
    let mut digits = 0usize;
    for (index, c) in raw.chars().enumerate() {
        match c {
            '0'..='9' => digits += 1,
            '+' if index == 0 => {}
            ' ' | '-' | '(' | ')' | '.' => {}
            _ => return false,
        }
    }
    (7..=15).contains(&digits)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn input(name: &str, email: &str, phone: &str, address: &str) -> ProfileInput {
        ProfileInput {
            name: name.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
            address: address.to_string(),
        }
    }

    #[test]
    fn test_update_saves_and_timestamps() {
        let store = ProfileStore::hydrate(StorageArea::ephemeral());
        let saved = store
            .update(&input(
                "Fern Callow",
                "fern@example.com",
                "+1 (555) 010-2345",
                "12 Garden Row",
            ))
            .unwrap();

        assert_eq!(saved.name, "Fern Callow");
        assert_eq!(saved.email.as_ref().unwrap().as_str(), "fern@example.com");
        assert!(saved.is_saved());
        assert_eq!(store.profile(), saved);
    }

    #[test]
    fn test_empty_name_rejected() {
        let store = ProfileStore::hydrate(StorageArea::ephemeral());
        let err = store.update(&input("   ", "", "", "")).unwrap_err();
        assert_eq!(err, ProfileError::NameRequired);
        assert_eq!(err.to_string(), "Name is required");
        assert!(!store.profile().is_saved());
    }

    #[test]
    fn test_invalid_email_rejected_and_state_unchanged() {
        let store = ProfileStore::hydrate(StorageArea::ephemeral());
        store.update(&input("Fern", "", "", "")).unwrap();
        let before = store.profile();

        let err = store
            .update(&input("Fern", "not-an-email", "", ""))
            .unwrap_err();
        assert!(matches!(err, ProfileError::InvalidEmail(_)));
        assert_eq!(err.to_string(), "Enter a valid email address");
        assert_eq!(store.profile(), before);
    }

    #[test]
    fn test_phone_validation() {
        let store = ProfileStore::hydrate(StorageArea::ephemeral());
        assert!(store.update(&input("Fern", "", "555-0102", "")).is_ok());
        assert!(store.update(&input("Fern", "", "+44 20 7946 0958", "")).is_ok());

        let err = store.update(&input("Fern", "", "12345", "")).unwrap_err();
        assert_eq!(err, ProfileError::InvalidPhone);
        let err = store.update(&input("Fern", "", "call me", "")).unwrap_err();
        assert_eq!(err, ProfileError::InvalidPhone);
    }

    #[test]
    fn test_empty_optionals_clear_stored_values() {
        let store = ProfileStore::hydrate(StorageArea::ephemeral());
        store
            .update(&input("Fern", "fern@example.com", "555-0102", "12 Garden Row"))
            .unwrap();

        let saved = store.update(&input("Fern", "", "", "")).unwrap();
        assert_eq!(saved.email, None);
        assert_eq!(saved.phone, None);
        assert_eq!(saved.address, None);
    }

    #[test]
    fn test_hydrates_persisted_profile() {
        let local = StorageArea::ephemeral();
        {
            let store = ProfileStore::hydrate(local.clone());
            store.update(&input("Fern", "fern@example.com", "", "")).unwrap();
        }

        let reopened = ProfileStore::hydrate(local);
        assert_eq!(reopened.profile().name, "Fern");
    }
}
