use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use dashmap::DashMap;
use tokio::sync::RwLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountFlags {
    pub is_active: bool,
    pub is_verified: bool,
}

impl Default for AccountFlags {
    fn default() -> Self {
        AccountFlags {
            is_active: true,
            is_verified: true,
        }
    }
}

/// List-backed store for tests and the `memory` backend.
///
/// Serves as both the aggregate repository and the identity directory, so a
/// user added here is immediately visible to the directory with the
/// configured default flags.
#[derive(Default)]
pub struct InMemoryUserRepo {
    users: RwLock<Vec<User>>,
    flags: DashMap<UserId, AccountFlags>,
    default_flags: AccountFlags,
}

impl InMemoryUserRepo {
    pub fn new(users: Vec<User>) -> Self {
        let repo = Self::default();
        for user in &users {
            repo.flags.insert(user.id(), repo.default_flags);
        }
        InMemoryUserRepo {
            users: RwLock::new(users),
            ..repo
        }
    }

    pub fn with_default_flags(default_flags: AccountFlags) -> Self {
        InMemoryUserRepo {
            default_flags,
            ..Self::default()
        }
    }

    pub fn set_flags(&self, user_id: UserId, flags: AccountFlags) {
        self.flags.insert(user_id, flags);
    }

    fn entry(&self, user: &User) -> DirectoryEntry {
        let flags = self
            .flags
            .get(&user.id())
            .map(|f| *f)
            .unwrap_or(self.default_flags);
        DirectoryEntry {
            identity: user.identity().clone(),
            is_active: flags.is_active,
            is_verified: flags.is_verified,
        }
    }
}

#[async_trait::async_trait]
impl UserRepo for InMemoryUserRepo {
    async fn get_by_id(&self, user_id: UserId) -> Result<User, RelationError> {
        self.users
            .read()
            .await
            .iter()
            .find(|u| u.id() == user_id)
            .cloned()
            .ok_or(RelationError::UserNotFound)
    }

    async fn get_by_email(&self, email: &str) -> Result<User, RelationError> {
        self.users
            .read()
            .await
            .iter()
            .find(|u| u.email().eq_ignore_ascii_case(email))
            .cloned()
            .ok_or(RelationError::UserNotFound)
    }

    async fn add(&self, user: User) -> Result<User, RelationError> {
        let mut users = self.users.write().await;
        if users
            .iter()
            .any(|u| u.id() == user.id() || u.email().eq_ignore_ascii_case(user.email()))
        {
            return Err(RelationError::AlreadyExists);
        }

        self.flags.entry(user.id()).or_insert(self.default_flags);
        users.push(user.clone());
        Ok(user)
    }

    async fn list(&self) -> Result<Vec<User>, RelationError> {
        Ok(self.users.read().await.clone())
    }

    async fn save_pair(&self, a: &User, b: &User) -> Result<(), RelationError> {
        let mut users = self.users.write().await;

        let ia = users
            .iter()
            .position(|u| u.id() == a.id())
            .ok_or(RelationError::UserNotFound)?;
        let ib = users
            .iter()
            .position(|u| u.id() == b.id())
            .ok_or(RelationError::UserNotFound)?;
        if users[ia].version() != a.version() || users[ib].version() != b.version() {
            return Err(RelationError::Conflict);
        }

        for (index, user) in [(ia, a), (ib, b)] {
            let mut stored = user.clone();
            stored.set_version(user.version() + 1);
            users[index] = stored;
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl IdentityDirectory for InMemoryUserRepo {
    async fn lookup(&self, user_id: UserId) -> Result<DirectoryEntry, RelationError> {
        let user = self.get_by_id(user_id).await?;
        Ok(self.entry(&user))
    }

    async fn lookup_by_email(&self, email: &str) -> Result<DirectoryEntry, RelationError> {
        let user = self.get_by_email(email).await?;
        Ok(self.entry(&user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user(n: u128, email: &str) -> User {
        User::new(Identity {
            id: UserId(uuid::Uuid::from_u128(n)),
            email: email.to_string(),
            first_name: "Ernest".to_string(),
            last_name: "Hawkins".to_string(),
            created_at: Utc::now(),
        })
    }

    fn repo() -> InMemoryUserRepo {
        InMemoryUserRepo::new(vec![
            user(1, "email1@example.com"),
            user(2, "email2@example.com"),
        ])
    }

    #[tokio::test]
    async fn get_by_id() {
        let repo = repo();
        let found = repo.get_by_id(UserId(uuid::Uuid::from_u128(1))).await.unwrap();
        assert_eq!(found.email(), "email1@example.com");
    }

    #[tokio::test]
    async fn get_missing_id() {
        let repo = repo();
        let err = repo.get_by_id(UserId::new_v4()).await.unwrap_err();
        assert!(matches!(err, RelationError::UserNotFound));
    }

    #[tokio::test]
    async fn get_by_email() {
        let repo = repo();
        let found = repo.get_by_email("email1@example.com").await.unwrap();
        assert_eq!(found.id(), UserId(uuid::Uuid::from_u128(1)));

        let found = repo.get_by_email("EMAIL2@example.com").await.unwrap();
        assert_eq!(found.id(), UserId(uuid::Uuid::from_u128(2)));
    }

    #[tokio::test]
    async fn get_missing_email() {
        let repo = repo();
        let err = repo.get_by_email("email4@example.com").await.unwrap_err();
        assert!(matches!(err, RelationError::UserNotFound));
    }

    #[tokio::test]
    async fn add() {
        let repo = repo();
        let new_user = user(3, "email@example.com");
        repo.add(new_user.clone()).await.unwrap();

        let all = repo.list().await.unwrap();
        assert_eq!(all.len(), 3);
        assert!(all.contains(&new_user));
    }

    #[tokio::test]
    async fn add_duplicate() {
        let repo = repo();
        let new_user = user(3, "email@example.com");
        repo.add(new_user.clone()).await.unwrap();

        let err = repo.add(new_user).await.unwrap_err();
        assert!(matches!(err, RelationError::AlreadyExists));

        let same_email = user(4, "Email@Example.com");
        let err = repo.add(same_email).await.unwrap_err();
        assert!(matches!(err, RelationError::AlreadyExists));
    }

    #[tokio::test]
    async fn accents_distinguish_emails() {
        let repo = repo();
        repo.add(user(3, "jose@example.com")).await.unwrap();
        repo.add(user(4, "josé@example.com")).await.unwrap();

        let found = repo.get_by_email("JOSé@example.com").await.unwrap();
        assert_eq!(found.id(), UserId(uuid::Uuid::from_u128(4)));
    }

    #[tokio::test]
    async fn fetched_aggregates_are_not_saved_implicitly() {
        let repo = repo();
        let mut u1 = repo.get_by_id(UserId(uuid::Uuid::from_u128(1))).await.unwrap();
        let mut u2 = repo.get_by_id(UserId(uuid::Uuid::from_u128(2))).await.unwrap();
        u1.send_friend_request(&mut u2, None).unwrap();

        let stored = repo.get_by_id(u1.id()).await.unwrap();
        assert_eq!(stored.pending_requests().count(), 0);

        repo.save_pair(&u1, &u2).await.unwrap();
        let stored = repo.get_by_id(u2.id()).await.unwrap();
        assert_eq!(stored.received_requests().count(), 1);
        assert_eq!(stored.version(), 1);
    }

    #[tokio::test]
    async fn stale_save_is_a_conflict() {
        let repo = repo();
        let id1 = UserId(uuid::Uuid::from_u128(1));
        let id2 = UserId(uuid::Uuid::from_u128(2));

        let (mut a1, mut b1) = (repo.get_by_id(id1).await.unwrap(), repo.get_by_id(id2).await.unwrap());
        let (mut a2, mut b2) = (a1.clone(), b1.clone());

        a1.send_friend_request(&mut b1, None).unwrap();
        repo.save_pair(&a1, &b1).await.unwrap();

        b2.send_friend_request(&mut a2, None).unwrap();
        let err = repo.save_pair(&b2, &a2).await.unwrap_err();
        assert!(matches!(err, RelationError::Conflict));

        let stored = repo.get_by_id(id2).await.unwrap();
        assert_eq!(stored.sent_requests().count(), 0);
        assert_eq!(stored.received_requests().count(), 1);
    }

    #[tokio::test]
    async fn directory_reports_flags() {
        let repo = InMemoryUserRepo::with_default_flags(AccountFlags {
            is_active: true,
            is_verified: false,
        });
        let u = user(9, "flags@example.com");
        repo.add(u.clone()).await.unwrap();

        let entry = repo.lookup(u.id()).await.unwrap();
        assert!(entry.is_active);
        assert!(!entry.is_verified);

        repo.set_flags(
            u.id(),
            AccountFlags {
                is_active: false,
                is_verified: true,
            },
        );
        let entry = repo.lookup_by_email("flags@example.com").await.unwrap();
        assert!(!entry.is_active);
        assert!(entry.is_verified);
        assert_eq!(entry.identity, *u.identity());
    }
}
