use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Wall-clock creation time of a record.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

macro_rules! store_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(uuid::Uuid);

        impl $name {
            /// Generate a new time-ordered identifier (UUID v7).
            pub fn new() -> Self {
                Self(uuid::Uuid::now_v7())
            }

            /// Create from an existing UUID.
            pub fn from_uuid(uuid: uuid::Uuid) -> Self {
                Self(uuid)
            }

            /// The underlying UUID.
            pub fn as_uuid(&self) -> &uuid::Uuid {
                &self.0
            }

            /// Short representation (first 8 characters of the UUID).
            pub fn short_id(&self) -> String {
                self.0.to_string()[..8].to_string()
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.short_id())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = TypeError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                uuid::Uuid::parse_str(s)
                    .map(Self)
                    .map_err(|e| TypeError::InvalidId(format!("{s}: {e}")))
            }
        }
    };
}

store_id! {
    /// Identifier of a prompt, the named container that owns commits.
    PromptId
}

store_id! {
    /// Identifier of an immutable commit. Generated by the commit store,
    /// never supplied by callers.
    CommitId
}

macro_rules! external_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}

external_id! {
    /// Identifier of a user, issued by the authentication collaborator.
    UserId
}

external_id! {
    /// Identifier of the project that owns a prompt.
    ProjectId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        let a = CommitId::new();
        let b = CommitId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn ids_are_time_ordered() {
        let first = PromptId::new();
        let second = PromptId::new();
        assert!(first < second);
    }

    #[test]
    fn parse_roundtrip() {
        let id = CommitId::new();
        let parsed: CommitId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn parse_rejects_garbage() {
        let err = "not-a-uuid".parse::<CommitId>().unwrap_err();
        assert!(matches!(err, TypeError::InvalidId(_)));
    }

    #[test]
    fn short_id_is_eight_chars() {
        assert_eq!(PromptId::new().short_id().len(), 8);
    }

    #[test]
    fn external_ids_serialize_transparently() {
        let user = UserId::new("user_2abc");
        let json = serde_json::to_string(&user).unwrap();
        assert_eq!(json, "\"user_2abc\"");
        assert_eq!(user.as_str(), "user_2abc");
    }
}
