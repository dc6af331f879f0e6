use crate::application_port::RelationError;
use crate::domain_model::*;
use chrono::{DateTime, Utc};
use sqlx::Row;
use sqlx::mysql::{MySqlDatabaseError, MySqlRow};

pub fn is_dup_key(err: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db) = err {
        if let Some(mysql_err) = db.try_downcast_ref::<MySqlDatabaseError>() {
            return mysql_err.number() == 1062; // ER_DUP_ENTRY
        }
    }

    false
}

/// Decode the identity columns shared by every `user` projection.
pub fn row_to_identity(row: &MySqlRow) -> Result<Identity, RelationError> {
    let id = row
        .try_get::<UserId, _>("user_id")
        .map_err(|e| RelationError::Store(format!("decode user_id: {e}")))?;
    let email: String = row
        .try_get("email")
        .map_err(|e| RelationError::Store(format!("decode email: {e}")))?;
    let first_name: String = row
        .try_get("first_name")
        .map_err(|e| RelationError::Store(format!("decode first_name: {e}")))?;
    let last_name: String = row
        .try_get("last_name")
        .map_err(|e| RelationError::Store(format!("decode last_name: {e}")))?;
    let created_at: DateTime<Utc> = row
        .try_get("created_at")
        .map_err(|e| RelationError::Store(format!("decode created_at: {e}")))?;

    Ok(Identity {
        id,
        email,
        first_name,
        last_name,
        created_at,
    })
}
