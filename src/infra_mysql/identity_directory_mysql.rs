use super::util::row_to_identity;
use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};

/// Reads identities and account flags from the identity provider's `user` table.
pub struct MySqlIdentityDirectory {
    pool: MySqlPool,
}

impl MySqlIdentityDirectory {
    pub fn new(pool: MySqlPool) -> Self {
        MySqlIdentityDirectory { pool }
    }

    fn row_to_entry(row: MySqlRow) -> Result<DirectoryEntry, RelationError> {
        let identity = row_to_identity(&row)?;
        let is_active: bool = row
            .try_get("is_active")
            .map_err(|e| RelationError::Store(format!("decode is_active: {e}")))?;
        let is_verified: bool = row
            .try_get("is_verified")
            .map_err(|e| RelationError::Store(format!("decode is_verified: {e}")))?;

        Ok(DirectoryEntry {
            identity,
            is_active,
            is_verified,
        })
    }
}

#[async_trait::async_trait]
impl IdentityDirectory for MySqlIdentityDirectory {
    async fn lookup(&self, user_id: UserId) -> Result<DirectoryEntry, RelationError> {
        let row = sqlx::query(
            r#"
SELECT user_id, email, first_name, last_name, is_active, is_verified, created_at
FROM user
WHERE user_id = ?
"#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RelationError::Store(format!("lookup identity: {e}")))?
        .ok_or(RelationError::UserNotFound)?;

        Self::row_to_entry(row)
    }

    async fn lookup_by_email(&self, email: &str) -> Result<DirectoryEntry, RelationError> {
        let row = sqlx::query(
            r#"
SELECT user_id, email, first_name, last_name, is_active, is_verified, created_at
FROM user
WHERE email = ?
"#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RelationError::Store(format!("lookup identity by email: {e}")))?
        .ok_or(RelationError::UserNotFound)?;

        Self::row_to_entry(row)
    }
}
