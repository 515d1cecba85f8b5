use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Stable key of a scene element or ray source.
#[derive(Eq, PartialEq, Hash, Debug, Clone, Serialize, Deserialize)]
pub struct UID(String);

impl From<&str> for UID {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for UID {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Default for UID {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl UID {
    /// Random v4 key.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_uids_differ() {
        assert_ne!(UID::new(), UID::new());
    }

    #[test]
    fn test_uid_from_str() {
        let uid = UID::from("3123948214");
        assert_eq!(uid.as_str(), "3123948214");
        assert_eq!(uid.to_string(), "3123948214");
        assert_eq!(uid, UID::from("3123948214".to_string()));
    }
}
