use shared::session::{AdminRole, UserSessionData};
use tracing::info;

use crate::error::ClientError;

/// Signed-in user state, passed explicitly to whatever needs the session
/// token or the user's roles. Created at sign-in, emptied by [`clear`] at
/// logout.
///
/// [`clear`]: SessionContext::clear
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    data: Option<UserSessionData>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(data: UserSessionData) -> Self {
        let mut ctx = Self::new();
        ctx.sign_in(data);
        ctx
    }

    pub fn sign_in(&mut self, data: UserSessionData) {
        info!(user_id = %data.id, roles = data.roles.len(), "session started");
        self.data = Some(data);
    }

    pub fn clear(&mut self) {
        if let Some(data) = self.data.take() {
            info!(user_id = %data.id, "session cleared");
        }
    }

    pub fn is_signed_in(&self) -> bool {
        self.data.is_some()
    }

    pub fn current(&self) -> Option<&UserSessionData> {
        self.data.as_ref()
    }

    pub fn token(&self) -> Option<&str> {
        self.data.as_ref().map(|d| d.token.as_str())
    }

    pub fn require_token(&self) -> Result<&str, ClientError> {
        self.token().ok_or(ClientError::MissingSession)
    }

    pub fn roles(&self) -> &[AdminRole] {
        self.data.as_ref().map(|d| d.roles.as_slice()).unwrap_or(&[])
    }
}
