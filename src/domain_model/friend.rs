use crate::domain_model::UserId;
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// Ordered `(sender, receiver)` pair; at most one pending request exists per key.
#[derive(Debug, Clone, Copy, Ord, PartialOrd, Eq, PartialEq, Hash)]
pub struct RequestKey {
    pub sender: UserId,
    pub receiver: UserId,
}

impl RequestKey {
    pub fn new(sender: UserId, receiver: UserId) -> Self {
        RequestKey { sender, receiver }
    }

    pub fn reversed(self) -> Self {
        RequestKey {
            sender: self.receiver,
            receiver: self.sender,
        }
    }
}

/// Longest message a request may carry, in characters.
pub const MAX_MESSAGE_LEN: usize = 1024;

/// A directed proposal to become friends.
///
/// `message` is payload: two requests between the same ordered pair are
/// equal whatever they say.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FriendRequest {
    pub sender_id: UserId,
    pub receiver_id: UserId,
    pub message: Option<String>,
}

impl FriendRequest {
    pub fn new(sender_id: UserId, receiver_id: UserId, message: Option<String>) -> Self {
        FriendRequest {
            sender_id,
            receiver_id,
            message,
        }
    }

    pub fn key(&self) -> RequestKey {
        RequestKey::new(self.sender_id, self.receiver_id)
    }

    /// The other endpoint as seen from `user`, if `user` is one of them.
    pub fn counterpart(&self, user: UserId) -> Option<UserId> {
        if self.sender_id == user {
            Some(self.receiver_id)
        } else if self.receiver_id == user {
            Some(self.sender_id)
        } else {
            None
        }
    }
}

impl PartialEq for FriendRequest {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for FriendRequest {}

impl Hash for FriendRequest {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

/// A user's pending requests split by direction.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PendingRequests {
    pub sent: Vec<FriendRequest>,
    pub received: Vec<FriendRequest>,
}
