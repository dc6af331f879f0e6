use crate::application_impl::*;
use crate::application_port::*;
use crate::domain_port::*;
use crate::infra_memory::*;
use crate::infra_mysql::*;
use crate::logger::*;
use crate::settings::Settings;
use sqlx::{MySql, Pool};
use std::sync::Arc;

/// Owns every collaborator handle for the lifetime of the process.
pub struct Server {
    pub user_service: Arc<dyn UserService>,
    pub relationship_service: Arc<dyn RelationshipService>,
    pub token_verifier: Arc<dyn TokenVerifier>,
    pool: Option<Pool<MySql>>,
}

impl Server {
    pub async fn try_new(settings: &Settings) -> anyhow::Result<Self> {
        let (user_repo, directory, pool): (
            Arc<dyn UserRepo>,
            Arc<dyn IdentityDirectory>,
            Option<Pool<MySql>>,
        ) = match settings.storage.backend.as_str() {
            "memory" => {
                let store = Arc::new(InMemoryUserRepo::with_default_flags(AccountFlags {
                    is_active: true,
                    is_verified: settings.storage.auto_verify,
                }));
                (
                    store.clone() as Arc<dyn UserRepo>,
                    store as Arc<dyn IdentityDirectory>,
                    None,
                )
            }
            "mysql" => {
                let dsn = settings
                    .storage
                    .mysql_dsn
                    .as_deref()
                    .ok_or_else(|| anyhow::anyhow!("storage.mysql_dsn is required for mysql"))?;
                let pool = Pool::<MySql>::connect(dsn).await?;
                (
                    Arc::new(MySqlUserRepo::new(pool.clone())) as Arc<dyn UserRepo>,
                    Arc::new(MySqlIdentityDirectory::new(pool.clone())) as Arc<dyn IdentityDirectory>,
                    Some(pool),
                )
            }
            other => return Err(anyhow::anyhow!("Unknown storage backend: {}", other)),
        };

        let token_verifier: Arc<dyn TokenVerifier> = match settings.auth.backend.as_str() {
            "fake" => Arc::new(FakeTokenVerifier::new()),
            "jwt" => {
                let key = std::env::var(&settings.auth.signing_key_env).map_err(|_| {
                    anyhow::anyhow!("{} is not set", settings.auth.signing_key_env)
                })?;
                Arc::new(JwtHs256Verifier::new(JwtConfig {
                    issuer: settings.auth.issuer.clone(),
                    audience: settings.auth.audience.clone(),
                    signing_key: key.into_bytes(),
                }))
            }
            other => return Err(anyhow::anyhow!("Unknown auth backend: {}", other)),
        };

        let user_service: Arc<dyn UserService> = Arc::new(RealUserService::new(user_repo.clone()));
        let relationship_service: Arc<dyn RelationshipService> =
            Arc::new(RealRelationshipService::new(
                user_repo,
                directory,
                settings.relationship.max_attempts,
            ));

        info!(
            storage = %settings.storage.backend,
            auth = %settings.auth.backend,
            "server started"
        );

        Ok(Self {
            user_service,
            relationship_service,
            token_verifier,
            pool,
        })
    }

    pub async fn shutdown(&self) {
        info!("server shutting down...");

        if let Some(pool) = &self.pool {
            pool.close().await;
        }
    }
}
