use crate::application_port::*;
use crate::domain_model::*;

#[derive(Debug, Clone)]
pub struct DirectoryEntry {
    pub identity: Identity,
    pub is_active: bool,
    pub is_verified: bool,
}

/// Read-only view of the external identity provider.
#[async_trait::async_trait]
pub trait IdentityDirectory: Send + Sync {
    async fn lookup(&self, user_id: UserId) -> Result<DirectoryEntry, RelationError>;

    async fn lookup_by_email(&self, email: &str) -> Result<DirectoryEntry, RelationError>;
}
