//! Identity of the acting user.

/// Source of the current user's identity.
///
/// Consulted only by entity security hooks and the audit trail.
pub trait IdentityProvider: Send + Sync {
    /// Identifier of the logged-in user.
    fn current_user_id(&self) -> Option<i64>;

    /// Name recorded in the audit trail.
    fn current_user_name(&self) -> Option<String> {
        self.current_user_id().map(|id| format!("user #{id}"))
    }
}

/// A fixed, logged-in user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticIdentity {
    id: i64,
    name: String,
}

impl StaticIdentity {
    /// Create an identity.
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    /// Parse `<id>:<name>`; a bare id uses the default name.
    pub fn parse(spec: &str) -> Option<Self> {
        let (id, name) = match spec.split_once(':') {
            Some((id, name)) => (id, Some(name)),
            None => (spec, None),
        };
        let id = id.trim().parse().ok()?;
        Some(match name.map(str::trim).filter(|n| !n.is_empty()) {
            Some(name) => Self::new(id, name),
            None => Self::new(id, format!("user #{id}")),
        })
    }
}

impl IdentityProvider for StaticIdentity {
    fn current_user_id(&self) -> Option<i64> {
        Some(self.id)
    }

    fn current_user_name(&self) -> Option<String> {
        Some(self.name.clone())
    }
}

/// No logged-in user.
#[derive(Debug, Clone, Copy, Default)]
pub struct Anonymous;

impl IdentityProvider for Anonymous {
    fn current_user_id(&self) -> Option<i64> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_identity() {
        let identity = StaticIdentity::parse("7:alice").unwrap();
        assert_eq!(identity.current_user_id(), Some(7));
        assert_eq!(identity.current_user_name().as_deref(), Some("alice"));

        let identity = StaticIdentity::parse("12").unwrap();
        assert_eq!(identity.current_user_name().as_deref(), Some("user #12"));

        assert!(StaticIdentity::parse("bob").is_none());
    }

    #[test]
    fn test_anonymous() {
        assert_eq!(Anonymous.current_user_id(), None);
        assert_eq!(Anonymous.current_user_name(), None);
    }
}
