use serde::{Deserialize, Serialize};
use std::fmt;

pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Opaque, stable identifier of a platform user (the Supabase auth uid).
///
/// Serialized transparently so it maps 1:1 onto the `user_id` column.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Mint a fresh random id (offline runs and tests).
    pub fn generate() -> Self {
        Self(new_id())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for UserId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_id_is_valid_uuid() {
        let id = new_id();
        let parsed = uuid::Uuid::parse_str(&id);
        assert!(parsed.is_ok());
        assert_eq!(parsed.unwrap().get_version_num(), 4);
    }

    #[test]
    fn generated_user_ids_are_unique() {
        assert_ne!(UserId::generate(), UserId::generate());
    }

    #[test]
    fn user_id_display_matches_inner() {
        let id = UserId::new("3f1c-aa");
        assert_eq!(id.to_string(), "3f1c-aa");
        assert_eq!(id.as_str(), "3f1c-aa");
    }

    #[test]
    fn blank_user_id_is_empty() {
        assert!(UserId::new("   ").is_empty());
        assert!(!UserId::new("a").is_empty());
    }

    #[test]
    fn user_id_serializes_as_plain_string() {
        let id = UserId::new("abc");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"abc\"");
        let back: UserId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn user_id_hash() {
        use std::collections::HashSet;
        let mut set = HashSet::new();
        set.insert(UserId::from("a"));
        set.insert(UserId::from(String::from("a")));
        assert_eq!(set.len(), 1);
    }
}
