use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use editor::{EditError, EditorState, GroupAction};
use shared::domain::{Study, StudyId};
use tracing::info;

use crate::{session::SessionContext, StudyService};

/// One open edit of a study: loaded from the service, changed through
/// [`GroupAction`]s, written back by [`save`](Self::save).
pub struct StudyEditingSession {
    service: Arc<dyn StudyService>,
    // `groups` is left empty here; the editor owns them while the session is open.
    study: Study,
    editor: EditorState,
    dirty: bool,
}

impl StudyEditingSession {
    pub async fn load(
        service: Arc<dyn StudyService>,
        session: &SessionContext,
        study_id: &StudyId,
    ) -> Result<Self> {
        let study = service
            .get_study(session, study_id)
            .await
            .with_context(|| format!("failed to load study {study_id}"))?
            .ok_or_else(|| anyhow!("study {study_id} not found"))?;
        Self::from_study(service, study)
    }

    pub fn from_study(service: Arc<dyn StudyService>, mut study: Study) -> Result<Self> {
        let groups = std::mem::take(&mut study.groups);
        let editor = EditorState::from_groups(groups)
            .with_context(|| format!("study {} has an inconsistent group tree", study.id))?;
        Ok(Self {
            service,
            study,
            editor,
            dirty: false,
        })
    }

    pub fn editor(&self) -> &EditorState {
        &self.editor
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn dispatch(&mut self, action: GroupAction) -> Result<(), EditError> {
        self.editor.dispatch(action)?;
        self.dirty = true;
        Ok(())
    }

    /// The study as it would be saved right now.
    pub fn snapshot(&self) -> Study {
        let mut study = self.study.clone();
        study.groups = self.editor.groups().to_vec();
        study
    }

    pub async fn save(&mut self, session: &SessionContext) -> Result<Study> {
        let snapshot = self.snapshot();
        let mut saved = self
            .service
            .save_study(session, &snapshot)
            .await
            .with_context(|| format!("failed to save study {}", snapshot.id))?;
        info!(study_id = %saved.id, version = ?saved.version, "edits flushed");

        let groups = std::mem::take(&mut saved.groups);
        self.editor.replace(groups)?;
        self.study = saved.clone();
        saved.groups = self.editor.groups().to_vec();
        self.dirty = false;
        Ok(saved)
    }
}
