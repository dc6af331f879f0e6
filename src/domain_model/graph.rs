use crate::application_port::RelationError;
use crate::domain_model::*;
use std::collections::BTreeMap;

/// A user together with its friend set and pending-request set.
///
/// Every mutating operation takes the counterpart aggregate as well and
/// updates both sides, so that:
/// - friendship is symmetric and never contains the user itself,
/// - a pending request sits in both endpoints' sets or in neither,
/// - friends never have a request pending between them,
/// - there is at most one request per ordered pair (the set is keyed by it).
///
/// `version` is the optimistic-lock token of the stored aggregate. It is
/// not touched by relationship operations; the repository bumps it on save.
#[derive(Debug, Clone)]
pub struct User {
    identity: Identity,
    version: u64,
    friends: BTreeMap<UserId, Identity>,
    requests: BTreeMap<RequestKey, FriendRequest>,
}

impl PartialEq for User {
    fn eq(&self, other: &Self) -> bool {
        self.identity == other.identity
    }
}

impl Eq for User {}

impl User {
    /// A freshly registered user: no friends, nothing pending.
    pub fn new(identity: Identity) -> Self {
        User {
            identity,
            version: 0,
            friends: BTreeMap::new(),
            requests: BTreeMap::new(),
        }
    }

    /// Rebuild a stored aggregate. Self-references, requests that do not
    /// involve this user and requests to someone already a friend are dropped.
    pub fn restore(
        identity: Identity,
        version: u64,
        friends: impl IntoIterator<Item = Identity>,
        requests: impl IntoIterator<Item = FriendRequest>,
    ) -> Self {
        let id = identity.id;
        let friends: BTreeMap<UserId, Identity> = friends
            .into_iter()
            .filter(|friend| friend.id != id)
            .map(|friend| (friend.id, friend))
            .collect();
        let requests = requests
            .into_iter()
            .filter(|request| {
                request
                    .counterpart(id)
                    .is_some_and(|other| other != id && !friends.contains_key(&other))
            })
            .map(|request| (request.key(), request))
            .collect();

        User {
            identity,
            version,
            friends,
            requests,
        }
    }

    pub fn id(&self) -> UserId {
        self.identity.id
    }

    pub fn email(&self) -> &str {
        &self.identity.email
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub(crate) fn set_version(&mut self, version: u64) {
        self.version = version;
    }

    pub fn friends(&self) -> impl Iterator<Item = &Identity> {
        self.friends.values()
    }

    pub fn is_friend(&self, other: UserId) -> bool {
        self.friends.contains_key(&other)
    }

    pub fn pending_requests(&self) -> impl Iterator<Item = &FriendRequest> {
        self.requests.values()
    }

    pub fn sent_requests(&self) -> impl Iterator<Item = &FriendRequest> {
        let id = self.id();
        self.requests.values().filter(move |r| r.sender_id == id)
    }

    pub fn received_requests(&self) -> impl Iterator<Item = &FriendRequest> {
        let id = self.id();
        self.requests.values().filter(move |r| r.receiver_id == id)
    }

    pub fn pending(&self) -> PendingRequests {
        PendingRequests {
            sent: self.sent_requests().cloned().collect(),
            received: self.received_requests().cloned().collect(),
        }
    }

    /// The pending request between this user and `other`, in either direction.
    /// An incoming request is preferred over an outgoing one.
    pub fn get_request(&self, other: UserId) -> Result<&FriendRequest, RelationError> {
        let incoming = RequestKey::new(other, self.id());
        self.requests
            .get(&incoming)
            .or_else(|| self.requests.get(&incoming.reversed()))
            .ok_or(RelationError::RequestNotFound)
    }

    /// Ask `target` to become friends.
    ///
    /// If `target` already asked this user, the call accepts that request
    /// instead: it is removed from both sides, the friendship is created and
    /// the original request is returned.
    pub fn send_friend_request(
        &mut self,
        target: &mut User,
        message: Option<String>,
    ) -> Result<FriendRequest, RelationError> {
        if target.id() == self.id() {
            return Err(RelationError::Validation(
                "cannot send a friend request to yourself".to_string(),
            ));
        }
        if self.is_friend(target.id()) {
            return Err(RelationError::AlreadyFriends);
        }

        let key = RequestKey::new(self.id(), target.id());
        if self.requests.contains_key(&key) {
            return Err(RelationError::DuplicateRequest);
        }

        if let Some(reciprocal) = self.requests.remove(&key.reversed()) {
            target.requests.remove(&key.reversed());
            self.link(target);
            return Ok(reciprocal);
        }

        let request = FriendRequest::new(self.id(), target.id(), message);
        self.requests.insert(key, request.clone());
        target.requests.insert(key, request.clone());
        Ok(request)
    }

    /// Decline the request `other` sent to this user. Only the receiver may
    /// reject; the sender gets `AccessDenied`.
    pub fn reject_friend_request(
        &mut self,
        other: &mut User,
    ) -> Result<FriendRequest, RelationError> {
        let key = self.get_request(other.id())?.key();
        if key.sender == self.id() {
            return Err(RelationError::AccessDenied(
                "only the receiver can reject a friend request".to_string(),
            ));
        }

        other.requests.remove(&key);
        self.requests
            .remove(&key)
            .ok_or(RelationError::RequestNotFound)
    }

    /// End the friendship with `other`.
    ///
    /// Unfriending re-issues a request from `other` back to this user, so the
    /// removed party can be accepted again with a single send.
    pub fn remove_friend(&mut self, other: &mut User) -> Result<Identity, RelationError> {
        if !self.is_friend(other.id()) {
            return Err(RelationError::NotFriends);
        }

        self.friends.remove(&other.id());
        other.friends.remove(&self.id());
        other.send_friend_request(self, None)?;

        Ok(other.identity.clone())
    }

    fn link(&mut self, other: &mut User) {
        self.friends.insert(other.id(), other.identity.clone());
        other.friends.insert(self.id(), self.identity.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user(n: u128) -> User {
        User::new(Identity {
            id: UserId(uuid::Uuid::from_u128(n)),
            email: format!("email{n}@example.com"),
            first_name: "first".to_string(),
            last_name: "last".to_string(),
            created_at: Utc::now(),
        })
    }

    fn two_users() -> (User, User) {
        (user(1), user(2))
    }

    fn befriend(a: &mut User, b: &mut User) {
        a.send_friend_request(b, None).unwrap();
        b.send_friend_request(a, None).unwrap();
    }

    #[test]
    fn new_user_has_no_relations() {
        let (u1, u2) = two_users();
        assert!(!u1.is_friend(u2.id()));
        assert!(!u2.is_friend(u1.id()));
        assert_eq!(u1.pending_requests().count(), 0);
        assert_eq!(u1.version(), 0);
    }

    #[test]
    fn send_request_is_visible_from_both_sides() {
        let (mut u1, mut u2) = two_users();
        let request = u1
            .send_friend_request(&mut u2, Some("hello".to_string()))
            .unwrap();

        assert_eq!(request.sender_id, u1.id());
        assert_eq!(request.receiver_id, u2.id());
        assert_eq!(request.message.as_deref(), Some("hello"));
        assert_eq!(u1.sent_requests().collect::<Vec<_>>(), vec![&request]);
        assert_eq!(u2.received_requests().collect::<Vec<_>>(), vec![&request]);
        assert_eq!(u1.received_requests().count(), 0);
        assert_eq!(u2.sent_requests().count(), 0);
    }

    #[test]
    fn duplicate_request_is_rejected_without_changing_state() {
        let (mut u1, mut u2) = two_users();
        u1.send_friend_request(&mut u2, None).unwrap();
        let (before1, before2) = (u1.pending(), u2.pending());

        let err = u1.send_friend_request(&mut u2, Some("again".into()));
        assert!(matches!(err, Err(RelationError::DuplicateRequest)));

        assert_eq!(u1.pending().sent, before1.sent);
        assert_eq!(u2.pending().received, before2.received);
        assert_eq!(u1.get_request(u2.id()).unwrap().message, None);
    }

    #[test]
    fn mutual_request_becomes_friendship() {
        let (mut u1, mut u2) = two_users();
        let original = u1
            .send_friend_request(&mut u2, Some("first".into()))
            .unwrap();

        let returned = u2
            .send_friend_request(&mut u1, Some("second".into()))
            .unwrap();

        assert_eq!(returned, original);
        assert_eq!(returned.sender_id, u1.id());
        assert_eq!(returned.message.as_deref(), Some("first"));
        assert_eq!(u1.friends().collect::<Vec<_>>(), vec![u2.identity()]);
        assert_eq!(u2.friends().collect::<Vec<_>>(), vec![u1.identity()]);
        assert_eq!(u1.pending_requests().count(), 0);
        assert_eq!(u2.pending_requests().count(), 0);
    }

    #[test]
    fn friends_cannot_send_requests() {
        let (mut u1, mut u2) = two_users();
        befriend(&mut u1, &mut u2);

        assert!(matches!(
            u1.send_friend_request(&mut u2, None),
            Err(RelationError::AlreadyFriends)
        ));
        assert!(matches!(
            u2.send_friend_request(&mut u1, None),
            Err(RelationError::AlreadyFriends)
        ));
    }

    #[test]
    fn self_request_is_rejected() {
        let mut u1 = user(1);
        let mut copy = user(1);

        let err = u1.send_friend_request(&mut copy, None);
        assert!(matches!(err, Err(RelationError::Validation(_))));
        assert_eq!(u1.pending_requests().count(), 0);
        assert!(!u1.is_friend(u1.id()));
    }

    #[test]
    fn receiver_rejects_request() {
        let (mut u1, mut u2) = two_users();
        let request = u1.send_friend_request(&mut u2, None).unwrap();

        let rejected = u2.reject_friend_request(&mut u1).unwrap();

        assert_eq!(rejected, request);
        assert_eq!(u1.pending_requests().count(), 0);
        assert_eq!(u2.pending_requests().count(), 0);
        assert!(!u1.is_friend(u2.id()));
    }

    #[test]
    fn sender_cannot_reject_own_request() {
        let (mut u1, mut u2) = two_users();
        let request = u1.send_friend_request(&mut u2, None).unwrap();

        let err = u1.reject_friend_request(&mut u2);
        assert!(matches!(err, Err(RelationError::AccessDenied(_))));
        assert_eq!(u1.get_request(u2.id()).unwrap(), &request);
        assert_eq!(u2.get_request(u1.id()).unwrap(), &request);

        assert_eq!(u2.reject_friend_request(&mut u1).unwrap(), request);
        assert_eq!(u1.pending_requests().count(), 0);
        assert_eq!(u2.pending_requests().count(), 0);
    }

    #[test]
    fn rejecting_missing_request_is_not_found() {
        let (mut u1, mut u2) = two_users();
        assert!(matches!(
            u1.reject_friend_request(&mut u2),
            Err(RelationError::RequestNotFound)
        ));
    }

    #[test]
    fn get_request_finds_either_direction() {
        let (mut u1, mut u2) = two_users();
        let u3 = user(3);
        assert!(matches!(
            u1.get_request(u2.id()),
            Err(RelationError::RequestNotFound)
        ));

        let request = u1.send_friend_request(&mut u2, None).unwrap();
        assert_eq!(u1.get_request(u2.id()).unwrap(), &request);
        assert_eq!(u2.get_request(u1.id()).unwrap(), &request);
        assert!(u1.get_request(u3.id()).is_err());
    }

    #[test]
    fn remove_friend_is_symmetric() {
        let (mut u1, mut u2) = two_users();
        befriend(&mut u1, &mut u2);

        let removed = u1.remove_friend(&mut u2).unwrap();

        assert_eq!(&removed, u2.identity());
        assert!(!u1.is_friend(u2.id()));
        assert!(!u2.is_friend(u1.id()));
    }

    #[test]
    fn remove_friend_reissues_request_from_removed_user() {
        let (mut u1, mut u2) = two_users();
        befriend(&mut u1, &mut u2);

        u1.remove_friend(&mut u2).unwrap();

        let request = u2.get_request(u1.id()).unwrap().clone();
        assert_eq!(request.sender_id, u2.id());
        assert_eq!(request.receiver_id, u1.id());
        assert!(u1.received_requests().any(|r| r == &request));
        assert!(u2.sent_requests().any(|r| r == &request));

        // accepting the re-issued request restores the friendship
        u1.send_friend_request(&mut u2, None).unwrap();
        assert!(u1.is_friend(u2.id()) && u2.is_friend(u1.id()));
    }

    #[test]
    fn remove_stranger_is_not_found() {
        let (mut u1, mut u2) = two_users();
        assert!(matches!(
            u1.remove_friend(&mut u2),
            Err(RelationError::NotFriends)
        ));
        assert_eq!(u2.pending_requests().count(), 0);
    }

    #[test]
    fn requests_to_several_users_are_independent() {
        let (mut u1, mut u2) = two_users();
        let mut u3 = user(3);

        u1.send_friend_request(&mut u2, None).unwrap();
        u3.send_friend_request(&mut u1, None).unwrap();

        let pending = u1.pending();
        assert_eq!(pending.sent.len(), 1);
        assert_eq!(pending.received.len(), 1);
        assert_eq!(pending.received[0].sender_id, u3.id());

        u2.reject_friend_request(&mut u1).unwrap();
        assert_eq!(u1.pending().sent.len(), 0);
        assert_eq!(u1.pending().received.len(), 1);
    }

    #[test]
    fn restore_drops_self_references() {
        let u1 = user(1);
        let u2 = user(2);
        let restored = User::restore(
            u1.identity().clone(),
            7,
            vec![u1.identity().clone(), u2.identity().clone()],
            vec![
                FriendRequest::new(u1.id(), u1.id(), None),
                FriendRequest::new(user(3).id(), user(4).id(), None),
            ],
        );

        assert_eq!(restored.version(), 7);
        assert!(!restored.is_friend(u1.id()));
        assert!(restored.is_friend(u2.id()));
        assert_eq!(restored.pending_requests().count(), 0);
    }

    #[test]
    fn restore_drops_requests_between_friends() {
        let u1 = user(1);
        let mut u2 = user(2);
        let u3 = user(3);
        let mut restored = User::restore(
            u1.identity().clone(),
            0,
            vec![u2.identity().clone()],
            vec![
                FriendRequest::new(u2.id(), u1.id(), None),
                FriendRequest::new(u3.id(), u1.id(), None),
            ],
        );

        assert!(restored.get_request(u2.id()).is_err());
        assert!(restored.get_request(u3.id()).is_ok());

        // no stale request is left to turn the removal back into a friendship
        restored.remove_friend(&mut u2).unwrap();
        assert!(!restored.is_friend(u2.id()));
        assert_eq!(restored.get_request(u2.id()).unwrap().sender_id, u2.id());
    }
}
