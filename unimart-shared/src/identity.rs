use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::pii::Masked;

/// The acting user, as supplied by the upstream identity provider.
///
/// The engine never manages credentials; it only consumes the resolved
/// principal and its capability flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Principal {
    pub id: Uuid,
    pub username: String,
    pub phone_number: Option<Masked<String>>,
    pub is_staff: bool,
    pub is_authenticated: bool,
}

impl Principal {
    pub fn user(id: Uuid, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            phone_number: None,
            is_staff: false,
            is_authenticated: true,
        }
    }

    pub fn admin(id: Uuid, username: impl Into<String>) -> Self {
        Self {
            is_staff: true,
            ..Self::user(id, username)
        }
    }

    /// Owner-or-admin gate used by every listing mutation.
    pub fn can_manage(&self, owner_id: Uuid) -> bool {
        self.is_authenticated && (self.is_staff || self.id == owner_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_and_admin_may_manage() {
        let owner_id = Uuid::new_v4();
        let owner = Principal::user(owner_id, "chidi");
        let admin = Principal::admin(Uuid::new_v4(), "ops");
        let stranger = Principal::user(Uuid::new_v4(), "someone");

        assert!(owner.can_manage(owner_id));
        assert!(admin.can_manage(owner_id));
        assert!(!stranger.can_manage(owner_id));
    }
}
