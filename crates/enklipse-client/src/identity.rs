//! Authenticated viewer identity.

use std::fmt;

/// The caller's authenticated principal.
///
/// The snapshot request authenticates with the bearer credential held by the
/// API client; the status stream additionally needs the principal itself,
/// sealed into the stream URL.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Identity {
    user_id: Option<String>,
}

impl Identity {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
        }
    }

    /// An identity with no principal (signed-out viewer).
    pub fn anonymous() -> Self {
        Self { user_id: None }
    }

    pub fn from_option(user_id: Option<String>) -> Self {
        Self { user_id }
    }

    /// The principal, if it resolves to a non-empty value.
    pub fn resolve(&self) -> Option<&str> {
        self.user_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }

    pub fn is_authenticated(&self) -> bool {
        self.resolve().is_some()
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_identity_does_not_resolve() {
        assert!(Identity::new("  ").resolve().is_none());
        assert!(Identity::anonymous().resolve().is_none());
        assert_eq!(Identity::new(" user_1 ").resolve(), Some("user_1"));
    }

    #[test]
    fn test_debug_hides_principal() {
        let debug = format!("{:?}", Identity::new("user_secret"));
        assert!(!debug.contains("user_secret"));
    }
}
