//! Identity/session collaborator.
//!
//! Finalizing a booking requires a signed-in user; listing views use the
//! user's identifier to load their interest profile.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of an authenticated user.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Wrap an identifier issued by the identity provider.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The currently authenticated user as reported by the identity provider.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Stable user identifier
    pub uid: UserId,
    /// Name from the user's profile, if set
    pub name: Option<String>,
    /// Display name from the identity provider, if set
    pub display_name: Option<String>,
    /// Avatar reference
    pub photo_url: Option<String>,
}

impl Identity {
    /// Identity with only a user identifier.
    #[must_use]
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: UserId::new(uid),
            name: None,
            display_name: None,
            photo_url: None,
        }
    }

    /// Set the profile name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the provider display name.
    #[must_use]
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    /// Set the avatar reference.
    #[must_use]
    pub fn with_photo_url(mut self, photo_url: impl Into<String>) -> Self {
        self.photo_url = Some(photo_url.into());
        self
    }

    /// Name shown as an event's host: profile name, then display name.
    #[must_use]
    pub fn preferred_name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .filter(|n| !n.is_empty())
            .or_else(|| self.display_name.as_deref().filter(|n| !n.is_empty()))
    }
}

/// Source of the current session's identity.
pub trait SessionProvider: Send + Sync {
    /// The signed-in user, or `None` when nobody is signed in.
    fn current_user(&self) -> Option<Identity>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preferred_name_falls_back_to_display_name() {
        let identity = Identity::new("u1").with_display_name("Ada L.");
        assert_eq!(identity.preferred_name(), Some("Ada L."));

        let identity = identity.with_name("Ada Lovelace");
        assert_eq!(identity.preferred_name(), Some("Ada Lovelace"));

        assert_eq!(Identity::new("u2").with_name("").preferred_name(), None);
    }
}
