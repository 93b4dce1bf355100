use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Error type for parsing ID from string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    kind: &'static str,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse {} from string", self.kind)
    }
}

impl std::error::Error for ParseIdError {}

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            #[must_use]
            pub const fn new(id: u64) -> Self {
                Self(id)
            }

            /// Returns the underlying u64 value
            #[must_use]
            pub const fn value(&self) -> u64 {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.parse::<u64>().map(Self::new).map_err(|_| ParseIdError {
                    kind: stringify!($name),
                })
            }
        }
    };
}

define_id!(
    /// Unique identifier for a User
    UserId
);
define_id!(
    /// Unique identifier for a quiz category
    CategoryId
);
define_id!(
    /// Unique identifier for a quiz question
    QuestionId
);
define_id!(
    /// Unique identifier for a (user, category) progress row
    ProgressId
);
define_id!(
    /// Unique identifier for a catalog reward
    RewardId
);
define_id!(
    /// Unique identifier for a redeemed reward record
    UserRewardId
);
define_id!(
    /// Unique identifier for a daily tip
    TipId
);
define_id!(
    /// Unique identifier for an unlocked achievement record
    UserAchievementId
);

// ─── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_display() {
        let id = UserId::new(42);
        assert_eq!(id.to_string(), "42");
        assert_eq!(format!("{id:?}"), "UserId(42)");
    }

    #[test]
    fn test_question_id_from_str() {
        let id: QuestionId = "123".parse().unwrap();
        assert_eq!(id, QuestionId::new(123));
    }

    #[test]
    fn test_reward_id_from_str_invalid() {
        let err = "not-a-number".parse::<RewardId>().unwrap_err();
        assert_eq!(err.to_string(), "failed to parse RewardId from string");
    }

    #[test]
    fn ids_serialize_as_plain_numbers() {
        let json = serde_json::to_string(&CategoryId::new(7)).unwrap();
        assert_eq!(json, "7");
        let back: CategoryId = serde_json::from_str("7").unwrap();
        assert_eq!(back, CategoryId::new(7));
    }
}
