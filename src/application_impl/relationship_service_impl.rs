use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use std::sync::Arc;
use tracing::{debug, info};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

pub struct RealRelationshipService {
    user_repo: Arc<dyn UserRepo>,
    directory: Arc<dyn IdentityDirectory>,
    max_attempts: u32,
}

impl RealRelationshipService {
    pub fn new(
        user_repo: Arc<dyn UserRepo>,
        directory: Arc<dyn IdentityDirectory>,
        max_attempts: u32,
    ) -> Self {
        Self {
            user_repo,
            directory,
            max_attempts: max_attempts.max(1),
        }
    }

    /// The acting account must be active and verified; the counterpart must
    /// be active.
    async fn ensure_permitted(&self, actor: UserId, other: UserId) -> Result<(), RelationError> {
        let actor = self.directory.lookup(actor).await?;
        if !actor.is_active {
            return Err(RelationError::AccessDenied("account is inactive".to_string()));
        }
        if !actor.is_verified {
            return Err(RelationError::AccessDenied("account is not verified".to_string()));
        }

        let other = self.directory.lookup(other).await?;
        if !other.is_active {
            return Err(RelationError::AccessDenied(
                "the other account is inactive".to_string(),
            ));
        }
        Ok(())
    }

    /// Load both aggregates, apply the command, save both in one unit of work.
    /// A lost version race restarts the cycle from fresh copies.
    async fn apply(
        &self,
        actor: UserId,
        other: UserId,
        command: RelationCommand,
    ) -> Result<RelationEvent, RelationError> {
        if actor == other {
            return Err(RelationError::Validation(
                "a relationship needs two different users".to_string(),
            ));
        }
        self.ensure_permitted(actor, other).await?;

        let mut attempt = 1;
        loop {
            let me = self.user_repo.get_by_id(actor).await?;
            let them = self.user_repo.get_by_id(other).await?;

            let Transition {
                actor: me,
                other: them,
                event,
            } = transition(&me, &them, &command)?;

            match self.user_repo.save_pair(&me, &them).await {
                Ok(()) => {
                    info!(event = event.kind(), %actor, %other, "relationship updated");
                    return Ok(event);
                }
                Err(RelationError::Conflict) if attempt < self.max_attempts => {
                    debug!(%actor, %other, attempt, "version conflict, retrying");
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[async_trait::async_trait]
impl RelationshipService for RealRelationshipService {
    async fn send_request(
        &self,
        sender: UserId,
        receiver: UserId,
        message: Option<String>,
    ) -> Result<FriendRequest, RelationError> {
        if message
            .as_deref()
            .is_some_and(|m| m.chars().count() > MAX_MESSAGE_LEN)
        {
            return Err(RelationError::Validation(format!(
                "message is longer than {MAX_MESSAGE_LEN} characters"
            )));
        }

        match self
            .apply(sender, receiver, RelationCommand::SendRequest { message })
            .await?
        {
            RelationEvent::RequestSent(request) | RelationEvent::RequestAccepted(request) => {
                Ok(request)
            }
            other => Err(RelationError::Store(format!(
                "unexpected event for send: {}",
                other.kind()
            ))),
        }
    }

    async fn reject_request(
        &self,
        me: UserId,
        other: UserId,
    ) -> Result<FriendRequest, RelationError> {
        match self.apply(me, other, RelationCommand::RejectRequest).await? {
            RelationEvent::RequestRejected(request) => Ok(request),
            event => Err(RelationError::Store(format!(
                "unexpected event for reject: {}",
                event.kind()
            ))),
        }
    }

    async fn remove_friend(&self, me: UserId, other: UserId) -> Result<Identity, RelationError> {
        match self.apply(me, other, RelationCommand::RemoveFriend).await? {
            RelationEvent::FriendRemoved { removed, .. } => Ok(removed),
            event => Err(RelationError::Store(format!(
                "unexpected event for remove: {}",
                event.kind()
            ))),
        }
    }

    async fn get_request(&self, me: UserId, other: UserId) -> Result<FriendRequest, RelationError> {
        let user = self.user_repo.get_by_id(me).await?;
        user.get_request(other).cloned()
    }

    async fn list_friends(&self, me: UserId) -> Result<Vec<Identity>, RelationError> {
        let user = self.user_repo.get_by_id(me).await?;
        Ok(user.friends().cloned().collect())
    }

    async fn list_requests(&self, me: UserId) -> Result<PendingRequests, RelationError> {
        let user = self.user_repo.get_by_id(me).await?;
        Ok(user.pending())
    }
}
