//! User profile domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use marigold_core::Email;

/// The stored user profile.
///
/// Everything is optional except the name once a profile has been
/// saved; a fresh storefront starts with an entirely empty profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct UserProfile {
    pub name: String,
    pub email: Option<Email>,
    pub phone: Option<String>,
    pub address: Option<String>,
    /// When the profile was last saved.
    pub updated_at: Option<DateTime<Utc>>,
}

impl UserProfile {
    /// Whether anything has ever been saved.
    #[must_use]
    pub const fn is_saved(&self) -> bool {
        self.updated_at.is_some()
    }
}

/// Raw profile form fields, as typed by the user.
///
/// Validation happens in the profile store; this is the unvalidated
/// input shape.
#[derive(Debug, Clone, Default)]
pub struct ProfileInput {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}
