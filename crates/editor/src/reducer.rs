use shared::domain::{Assessment, Group, GroupId, SessionId, StudySession};
use tracing::debug;

use crate::{
    action::GroupAction,
    error::EditError,
    ids::{IdSource, RandomIds},
};

/// Applies `action` to `groups` and returns the next collection.
///
/// `groups` is only borrowed; every successful call hands back a freshly
/// built vector. Ids for new groups and sessions are random.
pub fn apply(groups: &[Group], action: GroupAction) -> Result<Vec<Group>, EditError> {
    apply_with(groups, action, &mut RandomIds)
}

pub fn apply_with(
    groups: &[Group],
    action: GroupAction,
    ids: &mut dyn IdSource,
) -> Result<Vec<Group>, EditError> {
    debug!(action = action.kind(), groups = groups.len(), "applying group action");

    match action {
        GroupAction::AddGroup {
            group,
            is_make_active,
        } => Ok(add_group(groups, group, is_make_active, ids)),
        GroupAction::RemoveGroup { id } => {
            let index = group_index(groups, &id)?;
            let mut next = groups.to_vec();
            next.remove(index);
            Ok(next)
        }
        GroupAction::SetActiveGroup { id } => {
            let index = group_index(groups, &id)?;
            let mut next = groups.to_vec();
            for (i, group) in next.iter_mut().enumerate() {
                group.active = i == index;
            }
            Ok(next)
        }
        GroupAction::RenameGroup { id, name } => {
            let index = group_index(groups, &id)?;
            let mut next = groups.to_vec();
            next[index].name = name;
            Ok(next)
        }
        GroupAction::AddSession {
            name,
            assessments,
            active,
        } => add_session(groups, name, assessments, active, ids),
        GroupAction::RemoveSession { session_id } => {
            let (g, s) = session_index(groups, &session_id)?;
            let mut next = groups.to_vec();
            next[g].sessions.remove(s);
            Ok(next)
        }
        GroupAction::SetActiveSession { session_id } => {
            let (g, s) = session_index(groups, &session_id)?;
            let mut next = groups.to_vec();
            for (i, session) in next[g].sessions.iter_mut().enumerate() {
                session.active = i == s;
            }
            Ok(next)
        }
        GroupAction::UpdateSessionName {
            session_id,
            session_name,
        } => {
            let (g, s) = session_index(groups, &session_id)?;
            let mut next = groups.to_vec();
            next[g].sessions[s].name = session_name;
            Ok(next)
        }
        GroupAction::UpdateAssessments {
            session_id,
            assessments,
        } => {
            let (g, s) = session_index(groups, &session_id)?;
            let mut next = groups.to_vec();
            next[g].sessions[s].assessments = assessments;
            Ok(next)
        }
    }
}

fn add_group(
    groups: &[Group],
    template: Option<Group>,
    is_make_active: bool,
    ids: &mut dyn IdSource,
) -> Vec<Group> {
    let mut added = match template {
        Some(source) => duplicate_group(source, ids),
        None => Group {
            id: GroupId::new(ids.next_id()),
            name: format!("Group{}", groups.len() + 1),
            active: false,
            sessions: Vec::new(),
        },
    };
    added.active = is_make_active;

    let mut next = groups.to_vec();
    if is_make_active {
        for group in &mut next {
            group.active = false;
        }
    }
    next.push(added);
    next
}

// Sessions get fresh ids too, so session lookups across the study keep
// finding a single match after a copy.
fn duplicate_group(source: Group, ids: &mut dyn IdSource) -> Group {
    let sessions = source
        .sessions
        .into_iter()
        .map(|session| StudySession {
            id: SessionId::new(ids.next_id()),
            ..session
        })
        .collect();
    Group {
        id: GroupId::new(ids.next_id()),
        sessions,
        ..source
    }
}

fn add_session(
    groups: &[Group],
    name: String,
    assessments: Vec<Assessment>,
    active: bool,
    ids: &mut dyn IdSource,
) -> Result<Vec<Group>, EditError> {
    let index = groups
        .iter()
        .position(|g| g.active)
        .ok_or(EditError::NoActiveGroup)?;

    let mut next = groups.to_vec();
    let target = &mut next[index];
    if active {
        for session in &mut target.sessions {
            session.active = false;
        }
    }
    target.sessions.push(StudySession {
        id: SessionId::new(ids.next_id()),
        name,
        active,
        assessments,
    });
    Ok(next)
}

fn group_index(groups: &[Group], id: &GroupId) -> Result<usize, EditError> {
    groups
        .iter()
        .position(|g| &g.id == id)
        .ok_or_else(|| EditError::GroupNotFound(id.clone()))
}

fn session_index(groups: &[Group], id: &SessionId) -> Result<(usize, usize), EditError> {
    groups
        .iter()
        .enumerate()
        .find_map(|(g, group)| {
            group
                .sessions
                .iter()
                .position(|s| &s.id == id)
                .map(|s| (g, s))
        })
        .ok_or_else(|| EditError::SessionNotFound(id.clone()))
}
