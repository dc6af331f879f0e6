use crate::application_port::RelationError;
use crate::domain_model::{Identity, UserId};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

#[async_trait::async_trait]
pub trait UserService: Send + Sync {
    async fn register(&self, input: NewUser) -> Result<Identity, RelationError>;
    async fn get_user(&self, user_id: UserId) -> Result<Identity, RelationError>;
    async fn find_by_email(&self, email: &str) -> Result<Identity, RelationError>;
    async fn list_users(&self) -> Result<Vec<Identity>, RelationError>;
}
