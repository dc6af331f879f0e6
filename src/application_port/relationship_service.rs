use crate::domain_model::*;

#[derive(Debug, thiserror::Error)]
pub enum RelationError {
    #[error("user not found")]
    UserNotFound,
    #[error("friend request not found")]
    RequestNotFound,
    #[error("users are not friends")]
    NotFriends,
    #[error("user already exists")]
    AlreadyExists,
    #[error("friendship already established")]
    AlreadyFriends,
    #[error("friend request already exists")]
    DuplicateRequest,
    #[error("access denied: {0}")]
    AccessDenied(String),
    #[error("invalid input: {0}")]
    Validation(String),
    #[error("concurrent update, try again")]
    Conflict,
    #[error("store error: {0}")]
    Store(String),
}

#[async_trait::async_trait]
pub trait RelationshipService: Send + Sync {
    /// Send a request, or accept the receiver's pending request to the sender.
    async fn send_request(
        &self,
        sender: UserId,
        receiver: UserId,
        message: Option<String>,
    ) -> Result<FriendRequest, RelationError>;
    async fn reject_request(&self, me: UserId, other: UserId)
    -> Result<FriendRequest, RelationError>;
    async fn remove_friend(&self, me: UserId, other: UserId) -> Result<Identity, RelationError>;
    async fn get_request(&self, me: UserId, other: UserId) -> Result<FriendRequest, RelationError>;
    async fn list_friends(&self, me: UserId) -> Result<Vec<Identity>, RelationError>;
    async fn list_requests(&self, me: UserId) -> Result<PendingRequests, RelationError>;
}
