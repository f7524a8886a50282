use std::collections::HashSet;

use shared::domain::Group;

use crate::error::InvariantViolation;

/// Fails on the first violation found.
pub fn check_invariants(groups: &[Group]) -> Result<(), InvariantViolation> {
    match violations(groups).into_iter().next() {
        Some(violation) => Err(violation),
        None => Ok(()),
    }
}

/// Every violation in the tree, groups first, then per-group sessions.
pub fn violations(groups: &[Group]) -> Vec<InvariantViolation> {
    let mut found = Vec::new();

    let active_groups: Vec<_> = groups
        .iter()
        .filter(|g| g.active)
        .map(|g| g.id.clone())
        .collect();
    if active_groups.len() > 1 {
        found.push(InvariantViolation::MultipleActiveGroups(active_groups));
    }

    let mut group_ids = HashSet::new();
    for group in groups {
        if !group_ids.insert(&group.id) {
            found.push(InvariantViolation::DuplicateGroupId(group.id.clone()));
        }

        let active_sessions: Vec<_> = group
            .sessions
            .iter()
            .filter(|s| s.active)
            .map(|s| s.id.clone())
            .collect();
        if active_sessions.len() > 1 {
            found.push(InvariantViolation::MultipleActiveSessions {
                group_id: group.id.clone(),
                session_ids: active_sessions,
            });
        }

        let mut session_ids = HashSet::new();
        for session in &group.sessions {
            if !session_ids.insert(&session.id) {
                found.push(InvariantViolation::DuplicateSessionId {
                    group_id: group.id.clone(),
                    session_id: session.id.clone(),
                });
            }
        }
    }

    found
}
