use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

#[derive(
    Debug, Clone, Copy, Ord, PartialOrd, Eq, PartialEq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(transparent)]
pub struct UserId(pub uuid::Uuid);

impl UserId {
    pub fn new_v4() -> Self {
        UserId(uuid::Uuid::new_v4())
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for UserId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        uuid::Uuid::from_str(s).map(UserId)
    }
}

/// Unordered pair of users, normalized so that `min() < max()`.
/// Used as the storage key of a friendship row and as the lock order of a pair.
pub struct UserPair(UserId, UserId);

impl UserPair {
    pub fn new(a: UserId, b: UserId) -> Self {
        if a < b { Self(a, b) } else { Self(b, a) }
    }

    pub fn min(&self) -> UserId {
        self.0
    }

    pub fn max(&self) -> UserId {
        self.1
    }
}

/// Column widths of the `user` table, in characters.
pub const MAX_EMAIL_LEN: usize = 320;
pub const MAX_NAME_LEN: usize = 128;

/// Reference data owned by the identity directory.
///
/// Equality and hashing look at `id` only, so a cached copy with stale
/// names or email still matches the live identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    pub id: UserId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub created_at: DateTime<Utc>,
}

impl PartialEq for Identity {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Identity {}

impl Hash for Identity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn identity(id: UserId, email: &str, first_name: &str, last_name: &str) -> Identity {
        Identity {
            id,
            email: email.to_string(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn identity_equality_ignores_everything_but_id() {
        let id = UserId::new_v4();
        let sample = identity(id, "email@example.com", "first", "last");

        assert_eq!(sample, identity(id, "email@example.com", "as", "last"));
        assert_eq!(sample, identity(id, "email@example.com", "first", "as"));
        assert_eq!(sample, identity(id, "email1@example.com", "d", "d"));
        assert_ne!(
            sample,
            identity(UserId::new_v4(), "email@example.com", "first", "last")
        );
    }

    #[test]
    fn stale_identity_is_found_in_a_set() {
        let id = UserId::new_v4();
        let mut set = HashSet::new();
        set.insert(identity(id, "old@example.com", "Old", "Name"));

        assert!(set.contains(&identity(id, "new@example.com", "New", "Name")));
    }

    #[test]
    fn user_id_round_trips_through_text() {
        let id = UserId::new_v4();
        let parsed: UserId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
        assert!("not-a-uuid".parse::<UserId>().is_err());
    }

    #[test]
    fn user_pair_is_order_independent() {
        let a = UserId(uuid::Uuid::from_u128(1));
        let b = UserId(uuid::Uuid::from_u128(2));

        let ab = UserPair::new(a, b);
        let ba = UserPair::new(b, a);
        assert_eq!((ab.min(), ab.max()), (a, b));
        assert_eq!((ba.min(), ba.max()), (a, b));
    }
}
