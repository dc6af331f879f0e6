use crate::domain_model::UserId;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("token invalid")]
    TokenInvalid,
    #[error("token expired")]
    TokenExpired,
}

/// Resolves a bearer token issued by the identity provider to the caller's id.
#[async_trait::async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify_token(&self, token: &str) -> Result<UserId, AuthError>;
}
