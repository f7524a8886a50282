use serde::{Deserialize, Serialize};
use shared::domain::{Assessment, Group, GroupId, SessionId};

/// A single edit against a study's group tree.
///
/// Encoded as `{"type": "...", "payload": {...}}` with camelCase payload
/// fields, the same shape the console dispatches from its event handlers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    content = "payload",
    rename_all = "snake_case",
    rename_all_fields = "camelCase"
)]
pub enum GroupAction {
    AddGroup {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        group: Option<Group>,
        #[serde(default)]
        is_make_active: bool,
    },
    RemoveGroup {
        id: GroupId,
    },
    SetActiveGroup {
        id: GroupId,
    },
    RenameGroup {
        id: GroupId,
        name: String,
    },
    AddSession {
        name: String,
        #[serde(default)]
        assessments: Vec<Assessment>,
        #[serde(default)]
        active: bool,
    },
    RemoveSession {
        session_id: SessionId,
    },
    SetActiveSession {
        session_id: SessionId,
    },
    UpdateSessionName {
        session_id: SessionId,
        session_name: String,
    },
    UpdateAssessments {
        session_id: SessionId,
        assessments: Vec<Assessment>,
    },
}

impl GroupAction {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::AddGroup { .. } => "add_group",
            Self::RemoveGroup { .. } => "remove_group",
            Self::SetActiveGroup { .. } => "set_active_group",
            Self::RenameGroup { .. } => "rename_group",
            Self::AddSession { .. } => "add_session",
            Self::RemoveSession { .. } => "remove_session",
            Self::SetActiveSession { .. } => "set_active_session",
            Self::UpdateSessionName { .. } => "update_session_name",
            Self::UpdateAssessments { .. } => "update_assessments",
        }
    }

    /// Active session named after the group's current session count.
    pub fn new_session(group: &Group, assessments: Vec<Assessment>) -> Self {
        Self::AddSession {
            name: next_session_name(group),
            assessments,
            active: true,
        }
    }
}

pub fn next_session_name(group: &Group) -> String {
    format!("Session{}", group.sessions.len())
}
