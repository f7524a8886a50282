use shared::domain::{Assessment, Group, StudySession};
use tracing::warn;

use crate::{
    action::GroupAction,
    error::{EditError, InvariantViolation},
    ids::{IdSource, RandomIds},
    invariants::check_invariants,
    reducer::apply_with,
};

/// Working copy of a study's groups while an edit session is open.
pub struct EditorState {
    groups: Vec<Group>,
    ids: Box<dyn IdSource + Send>,
}

impl Default for EditorState {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorState {
    pub fn new() -> Self {
        Self {
            groups: Vec::new(),
            ids: Box::new(RandomIds),
        }
    }

    pub fn from_groups(groups: Vec<Group>) -> Result<Self, InvariantViolation> {
        check_invariants(&groups)?;
        Ok(Self {
            groups,
            ids: Box::new(RandomIds),
        })
    }

    pub fn with_id_source(mut self, ids: impl IdSource + Send + 'static) -> Self {
        self.ids = Box::new(ids);
        self
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn into_groups(self) -> Vec<Group> {
        self.groups
    }

    /// Swaps in a whole new tree, e.g. when another study is loaded.
    pub fn replace(&mut self, groups: Vec<Group>) -> Result<(), InvariantViolation> {
        check_invariants(&groups)?;
        self.groups = groups;
        Ok(())
    }

    /// On error the previous tree is kept.
    pub fn dispatch(&mut self, action: GroupAction) -> Result<(), EditError> {
        let kind = action.kind();
        match apply_with(&self.groups, action, self.ids.as_mut()) {
            Ok(next) => {
                self.groups = next;
                Ok(())
            }
            Err(err) => {
                warn!(action = kind, error = %err, "group action rejected");
                Err(err)
            }
        }
    }

    pub fn active_group(&self) -> Option<&Group> {
        self.groups.iter().find(|g| g.active)
    }

    pub fn active_session(&self) -> Option<&StudySession> {
        self.active_group().and_then(Group::active_session)
    }

    pub fn active_group_and_session(&self) -> Option<(&Group, Option<&StudySession>)> {
        self.active_group()
            .map(|group| (group, group.active_session()))
    }

    pub fn duplicate_last_group(&self) -> Option<GroupAction> {
        self.groups.last().map(|group| GroupAction::AddGroup {
            group: Some(group.clone()),
            is_make_active: false,
        })
    }

    pub fn new_session_in_active_group(
        &self,
        assessments: Vec<Assessment>,
    ) -> Result<GroupAction, EditError> {
        let group = self.active_group().ok_or(EditError::NoActiveGroup)?;
        Ok(GroupAction::new_session(group, assessments))
    }

    /// Appends `selected` after the active session's current assessments.
    pub fn add_to_active_session(
        &self,
        selected: Vec<Assessment>,
    ) -> Result<GroupAction, EditError> {
        let session = self.active_session().ok_or(EditError::NoActiveSession)?;
        let mut assessments = session.assessments.clone();
        assessments.extend(selected);
        Ok(GroupAction::UpdateAssessments {
            session_id: session.id.clone(),
            assessments,
        })
    }
}
