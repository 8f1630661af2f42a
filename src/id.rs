use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::BackendError;

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize, sqlx::Type)]
        #[serde(transparent)]
        #[sqlx(transparent)]
        pub struct $name(Uuid);

        impl $name {
            pub fn new(id: Uuid) -> Self {
                Self(id)
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl FromStr for $name {
            type Err = BackendError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s)
                    .map(Self)
                    .map_err(|_| BackendError::InvalidId(s.to_owned()))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }
    };
}

id_type!(
    /// The ID of a mood entry.
    MoodEntryId
);
id_type!(
    /// The ID of an AI reflection.
    ReflectionId
);
id_type!(
    /// The ID of a stored recommendation.
    RecommendationId
);
id_type!(
    /// The ID of a saved playlist.
    PlaylistId
);

#[cfg(test)]
mod tests {
    use super::MoodEntryId;
    use crate::errors::BackendError;

    #[test]
    fn parses_hyphenated_uuids() {
        let id: MoodEntryId = "9b2f5c8e-1d4a-4f6b-8c3e-2a7d9e0f1b34"
            .parse()
            .expect("parse valid ID");

        assert_eq!(id.to_string(), "9b2f5c8e-1d4a-4f6b-8c3e-2a7d9e0f1b34");
    }

    #[test]
    fn rejects_malformed_ids() {
        for raw in &["", "recent", "64b7f0c2e4b0a1a2b3c4d5e6", "9b2f5c8e-1d4a"] {
            match raw.parse::<MoodEntryId>() {
                Err(BackendError::InvalidId(s)) => assert_eq!(&s, raw),
                other => panic!("{:?} must be rejected, got {:?}", raw, other),
            }
        }
    }

    #[test]
    fn serializes_as_plain_string() {
        let id: MoodEntryId = "9b2f5c8e-1d4a-4f6b-8c3e-2a7d9e0f1b34".parse().unwrap();

        assert_eq!(
            serde_json::to_string(&id).unwrap(),
            "\"9b2f5c8e-1d4a-4f6b-8c3e-2a7d9e0f1b34\""
        );
    }
}
