use shared::domain::{GroupId, SessionId};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("group {0} not found")]
    GroupNotFound(GroupId),
    #[error("session {0} not found")]
    SessionNotFound(SessionId),
    #[error("no active group to add the session to")]
    NoActiveGroup,
    #[error("no active session selected")]
    NoActiveSession,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("more than one active group: {}", join(.0))]
    MultipleActiveGroups(Vec<GroupId>),
    #[error("group {group_id} has more than one active session: {}", join(.session_ids))]
    MultipleActiveSessions {
        group_id: GroupId,
        session_ids: Vec<SessionId>,
    },
    #[error("duplicate group id {0}")]
    DuplicateGroupId(GroupId),
    #[error("group {group_id} contains duplicate session id {session_id}")]
    DuplicateSessionId {
        group_id: GroupId,
        session_id: SessionId,
    },
}

fn join<T: std::fmt::Display>(ids: &[T]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
