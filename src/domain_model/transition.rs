use crate::application_port::RelationError;
use crate::domain_model::*;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelationCommand {
    SendRequest { message: Option<String> },
    RejectRequest,
    RemoveFriend,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "content", rename_all = "snake_case")]
pub enum RelationEvent {
    RequestSent(FriendRequest),
    /// A send that met a reciprocal request; carries the consumed request.
    RequestAccepted(FriendRequest),
    RequestRejected(FriendRequest),
    FriendRemoved {
        removed: Identity,
        re_request: FriendRequest,
    },
}

impl RelationEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            RelationEvent::RequestSent(_) => "request.sent",
            RelationEvent::RequestAccepted(_) => "request.accepted",
            RelationEvent::RequestRejected(_) => "request.rejected",
            RelationEvent::FriendRemoved { .. } => "friend.removed",
        }
    }
}

/// Both aggregates after a successful command, ready to be saved together.
#[derive(Debug, Clone)]
pub struct Transition {
    pub actor: User,
    pub other: User,
    pub event: RelationEvent,
}

/// Apply `command` on behalf of `actor` against `other`.
///
/// The inputs are left untouched; on success the updated copies of both
/// aggregates come back with the resulting event, and the caller persists
/// them as one unit.
pub fn transition(
    actor: &User,
    other: &User,
    command: &RelationCommand,
) -> Result<Transition, RelationError> {
    let mut actor = actor.clone();
    let mut other = other.clone();

    let event = match command {
        RelationCommand::SendRequest { message } => {
            let request = actor.send_friend_request(&mut other, message.clone())?;
            if actor.is_friend(other.id()) {
                RelationEvent::RequestAccepted(request)
            } else {
                RelationEvent::RequestSent(request)
            }
        }
        RelationCommand::RejectRequest => {
            RelationEvent::RequestRejected(actor.reject_friend_request(&mut other)?)
        }
        RelationCommand::RemoveFriend => {
            let removed = actor.remove_friend(&mut other)?;
            let re_request = actor.get_request(other.id())?.clone();
            RelationEvent::FriendRemoved {
                removed,
                re_request,
            }
        }
    };

    Ok(Transition {
        actor,
        other,
        event,
    })
}
