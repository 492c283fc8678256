use serde::{Deserialize, Serialize};

use super::User;

/// An authenticated caller. Returned by login and handed to every
/// owner-scoped operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user: User,

    /// Bearer token for the remote backend. Local sessions have none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl Session {
    #[must_use]
    pub const fn local(user: User) -> Self {
        Self { user, token: None }
    }

    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user.id
    }

    #[must_use]
    pub fn owns(&self, user_id: &str) -> bool {
        self.user.id == user_id
    }
}
