use encantia_common::UserId;
use serde::{Deserialize, Serialize};

/// The signed-in user a publisher heartbeats for.
#[derive(Clone, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: UserId,
    pub display_name: String,
    /// Supabase Auth JWT. Row-level security only accepts writes to the
    /// presence row whose `user_id` matches its subject.
    #[serde(skip)]
    pub access_token: Option<String>,
}

impl std::fmt::Debug for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Identity")
            .field("user_id", &self.user_id)
            .field("display_name", &self.display_name)
            .field("access_token", &self.access_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl Identity {
    /// Local identity with a fresh id, for in-memory runs.
    pub fn generate(display_name: &str) -> Self {
        Self {
            user_id: UserId::generate(),
            display_name: display_name.to_string(),
            access_token: None,
        }
    }

    /// Create an identity from a Supabase Auth session.
    pub fn from_supabase_auth(
        user_id: impl Into<UserId>,
        display_name: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            display_name: display_name.into(),
            access_token: Some(access_token.into()),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_token() {
        let identity = Identity::from_supabase_auth("u-1", "Ana", "secret.jwt.value");
        let debug = format!("{identity:?}");
        assert!(debug.contains("u-1"));
        assert!(!debug.contains("secret.jwt.value"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn generated_identity_is_anonymous() {
        let a = Identity::generate("host");
        let b = Identity::generate("host");
        assert_ne!(a.user_id, b.user_id);
        assert!(!a.is_authenticated());
        assert_eq!(a.display_name, "host");
    }

    #[test]
    fn token_is_not_serialized() {
        let identity = Identity::from_supabase_auth("u-1", "Ana", "secret");
        let json = serde_json::to_string(&identity).unwrap();
        assert!(!json.contains("secret"));
        assert!(json.contains("\"user_id\":\"u-1\""));
    }
}
