use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::UserRepo;
use chrono::Utc;
use std::sync::Arc;
use tracing::info;

pub struct RealUserService {
    user_repo: Arc<dyn UserRepo>,
}

impl RealUserService {
    pub fn new(user_repo: Arc<dyn UserRepo>) -> RealUserService {
        RealUserService { user_repo }
    }
}

fn validate(input: &NewUser) -> Result<(String, String, String), RelationError> {
    let email = input.email.trim().to_lowercase();
    let valid_email = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    };
    if !valid_email {
        return Err(RelationError::Validation(format!(
            "invalid email address: {:?}",
            input.email
        )));
    }
    if email.chars().count() > MAX_EMAIL_LEN {
        return Err(RelationError::Validation(format!(
            "email is longer than {MAX_EMAIL_LEN} characters"
        )));
    }

    let first_name = input.first_name.trim();
    let last_name = input.last_name.trim();
    if first_name.is_empty() || last_name.is_empty() {
        return Err(RelationError::Validation(
            "first and last name are required".to_string(),
        ));
    }
    if first_name.chars().count() > MAX_NAME_LEN || last_name.chars().count() > MAX_NAME_LEN {
        return Err(RelationError::Validation(format!(
            "names are limited to {MAX_NAME_LEN} characters"
        )));
    }

    Ok((email, first_name.to_string(), last_name.to_string()))
}

#[async_trait::async_trait]
impl UserService for RealUserService {
    async fn register(&self, input: NewUser) -> Result<Identity, RelationError> {
        let (email, first_name, last_name) = validate(&input)?;
        let identity = Identity {
            id: UserId::new_v4(),
            email,
            first_name,
            last_name,
            created_at: Utc::now(),
        };

        let user = self.user_repo.add(User::new(identity)).await?;
        info!(user_id = %user.id(), "user registered");
        Ok(user.identity().clone())
    }

    async fn get_user(&self, user_id: UserId) -> Result<Identity, RelationError> {
        let user = self.user_repo.get_by_id(user_id).await?;
        Ok(user.identity().clone())
    }

    async fn find_by_email(&self, email: &str) -> Result<Identity, RelationError> {
        let user = self
            .user_repo
            .get_by_email(&email.trim().to_lowercase())
            .await?;
        Ok(user.identity().clone())
    }

    async fn list_users(&self) -> Result<Vec<Identity>, RelationError> {
        let users = self.user_repo.list().await?;
        Ok(users.iter().map(|u| u.identity().clone()).collect())
    }
}
