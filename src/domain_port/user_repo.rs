use crate::application_port::*;
use crate::domain_model::*;

/// Loads and stores `User` aggregates.
///
/// Aggregates handed out by `get_by_id`/`get_by_email` are detached copies;
/// mutating them changes nothing until they go back through `save_pair`.
#[async_trait::async_trait]
pub trait UserRepo: Send + Sync {
    async fn get_by_id(&self, user_id: UserId) -> Result<User, RelationError>;

    async fn get_by_email(&self, email: &str) -> Result<User, RelationError>;

    /// Store a new aggregate. Fails with `AlreadyExists` if the email is taken.
    async fn add(&self, user: User) -> Result<User, RelationError>;

    async fn list(&self) -> Result<Vec<User>, RelationError>;

    /// Persist both sides of a transition in one unit of work.
    ///
    /// Fails with `Conflict`, writing nothing, if either stored version no
    /// longer matches the version the aggregate was loaded with. On success
    /// both stored versions are bumped.
    async fn save_pair(&self, a: &User, b: &User) -> Result<(), RelationError>;
}
