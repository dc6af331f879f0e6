use super::util::{is_dup_key, row_to_identity};
use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use sqlx::{MySqlConnection, MySqlPool, Row};

pub struct MySqlUserRepo {
    pool: MySqlPool,
}

impl MySqlUserRepo {
    pub fn new(pool: MySqlPool) -> Self {
        MySqlUserRepo { pool }
    }

    async fn load(conn: &mut MySqlConnection, user_id: UserId) -> Result<User, RelationError> {
        let row = sqlx::query(
            r#"
SELECT user_id, email, first_name, last_name, graph_version, created_at
FROM user
WHERE user_id = ?
"#,
        )
        .bind(user_id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| RelationError::Store(format!("select user: {e}")))?
        .ok_or(RelationError::UserNotFound)?;

        let identity = row_to_identity(&row)?;
        let version: u64 = row
            .try_get("graph_version")
            .map_err(|e| RelationError::Store(format!("decode graph_version: {e}")))?;

        let friends = sqlx::query(
            r#"
SELECT u.user_id, u.email, u.first_name, u.last_name, u.created_at
FROM friendship f
JOIN user u
  ON u.user_id = IF(? = f.user_min, f.user_max, f.user_min)
WHERE f.user_min = ? OR f.user_max = ?
"#,
        )
        .bind(user_id)
        .bind(user_id)
        .bind(user_id)
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| RelationError::Store(format!("select friends: {e}")))?
        .iter()
        .map(row_to_identity)
        .collect::<Result<Vec<_>, _>>()?;

        let requests = sqlx::query(
            r#"
SELECT sender_id, receiver_id, message
FROM friend_request
WHERE sender_id = ? OR receiver_id = ?
"#,
        )
        .bind(user_id)
        .bind(user_id)
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| RelationError::Store(format!("select friend requests: {e}")))?
        .iter()
        .map(|row| -> Result<FriendRequest, sqlx::Error> {
            Ok(FriendRequest {
                sender_id: row.try_get("sender_id")?,
                receiver_id: row.try_get("receiver_id")?,
                message: row.try_get("message")?,
            })
        })
        .collect::<Result<Vec<_>, sqlx::Error>>()
        .map_err(|e| RelationError::Store(format!("decode friend request: {e}")))?;

        Ok(User::restore(identity, version, friends, requests))
    }
}

#[async_trait::async_trait]
impl UserRepo for MySqlUserRepo {
    async fn get_by_id(&self, user_id: UserId) -> Result<User, RelationError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RelationError::Store(e.to_string()))?;

        let user = Self::load(&mut *tx, user_id).await?;

        tx.commit()
            .await
            .map_err(|e| RelationError::Store(e.to_string()))?;

        Ok(user)
    }

    async fn get_by_email(&self, email: &str) -> Result<User, RelationError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RelationError::Store(e.to_string()))?;

        let user_id = sqlx::query_scalar::<_, UserId>("SELECT user_id FROM user WHERE email = ?")
            .bind(email)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| RelationError::Store(format!("query user_id: {e}")))?
            .ok_or(RelationError::UserNotFound)?;
        let user = Self::load(&mut *tx, user_id).await?;

        tx.commit()
            .await
            .map_err(|e| RelationError::Store(e.to_string()))?;

        Ok(user)
    }

    async fn add(&self, user: User) -> Result<User, RelationError> {
        let identity = user.identity();

        let res = sqlx::query(
            r#"
INSERT INTO user (user_id, email, first_name, last_name, graph_version, created_at)
VALUES (?, ?, ?, ?, ?, ?)
"#,
        )
        .bind(identity.id)
        .bind(&identity.email)
        .bind(&identity.first_name)
        .bind(&identity.last_name)
        .bind(user.version())
        .bind(identity.created_at)
        .execute(&self.pool)
        .await;

        match res {
            Ok(_) => Ok(user),
            Err(e) if is_dup_key(&e) => Err(RelationError::AlreadyExists),
            Err(e) => Err(RelationError::Store(format!("insert user: {e}"))),
        }
    }

    async fn list(&self) -> Result<Vec<User>, RelationError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RelationError::Store(e.to_string()))?;

        let ids = sqlx::query_scalar::<_, UserId>(
            "SELECT user_id FROM user ORDER BY created_at ASC, user_id ASC",
        )
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| RelationError::Store(format!("list users: {e}")))?;

        let mut users = Vec::with_capacity(ids.len());
        for user_id in ids {
            users.push(Self::load(&mut *tx, user_id).await?);
        }

        tx.commit()
            .await
            .map_err(|e| RelationError::Store(e.to_string()))?;

        Ok(users)
    }

    async fn save_pair(&self, a: &User, b: &User) -> Result<(), RelationError> {
        let pair = UserPair::new(a.id(), b.id());
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RelationError::Store(e.to_string()))?;

        // order matters (to reduce deadlock surface): lower id first
        let (first, second) = if a.id() == pair.min() { (a, b) } else { (b, a) };
        for user in [first, second] {
            let res = sqlx::query(
                r#"
UPDATE user SET graph_version = graph_version + 1
WHERE user_id = ? AND graph_version = ?
"#,
            )
            .bind(user.id())
            .bind(user.version())
            .execute(&mut *tx)
            .await
            .map_err(|e| RelationError::Store(format!("bump graph_version: {e}")))?;

            if res.rows_affected() != 1 {
                tx.rollback()
                    .await
                    .map_err(|e| RelationError::Store(e.to_string()))?;
                return Err(RelationError::Conflict);
            }
        }

        let friendship_sql = if a.is_friend(b.id()) {
            "INSERT IGNORE INTO friendship (user_min, user_max) VALUES (?, ?)"
        } else {
            "DELETE FROM friendship WHERE user_min = ? AND user_max = ?"
        };
        sqlx::query(friendship_sql)
            .bind(pair.min())
            .bind(pair.max())
            .execute(&mut *tx)
            .await
            .map_err(|e| RelationError::Store(format!("write friendship: {e}")))?;

        for key in [
            RequestKey::new(a.id(), b.id()),
            RequestKey::new(b.id(), a.id()),
        ] {
            let query = match a.pending_requests().find(|r| r.key() == key) {
                Some(request) => sqlx::query(
                    r#"
INSERT IGNORE INTO friend_request (sender_id, receiver_id, message)
VALUES (?, ?, ?)
"#,
                )
                .bind(request.sender_id)
                .bind(request.receiver_id)
                .bind(request.message.as_deref()),
                None => sqlx::query(
                    "DELETE FROM friend_request WHERE sender_id = ? AND receiver_id = ?",
                )
                .bind(key.sender)
                .bind(key.receiver),
            };
            query
                .execute(&mut *tx)
                .await
                .map_err(|e| RelationError::Store(format!("write friend request: {e}")))?;
        }

        tx.commit()
            .await
            .map_err(|e| RelationError::Store(e.to_string()))?;

        Ok(())
    }
}
