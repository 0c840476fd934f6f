//! Caller-side access guard.
//!
//! The selector itself never checks identity. Hosts call [`authorize`] before
//! selecting, using the group restriction from [`PolicyConfig`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use stocktake_core::{GroupId, UserId};

use crate::config::PolicyConfig;

/// The user asking for work, as resolved by the host's auth layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requester {
    pub user: UserId,
    pub authenticated: bool,
    pub groups: Vec<GroupId>,
}

impl Requester {
    pub fn authenticated(user: UserId) -> Self {
        Self {
            user,
            authenticated: true,
            groups: Vec::new(),
        }
    }

    pub fn anonymous(user: UserId) -> Self {
        Self {
            user,
            authenticated: false,
            groups: Vec::new(),
        }
    }

    pub fn in_group(mut self, group: GroupId) -> Self {
        self.groups.push(group);
        self
    }

    pub fn is_member_of(&self, group: GroupId) -> bool {
        self.groups.contains(&group)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccessError {
    #[error("authentication required")]
    Unauthenticated,

    #[error("User does not have permission to perform stocktake operations")]
    NotInGroup(GroupId),
}

/// Allow authenticated users; when a group is configured, require membership.
///
/// - No IO
/// - No panics
pub fn authorize(requester: &Requester, config: &PolicyConfig) -> Result<(), AccessError> {
    if !requester.authenticated {
        return Err(AccessError::Unauthenticated);
    }

    match config.allowed_group {
        Some(group) if !requester.is_member_of(group) => Err(AccessError::NotInGroup(group)),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_group_configured_allows_any_authenticated_user() {
        let config = PolicyConfig::default();
        assert_eq!(authorize(&Requester::authenticated(UserId::new()), &config), Ok(()));
    }

    #[test]
    fn anonymous_users_are_rejected() {
        let config = PolicyConfig::default();
        assert_eq!(
            authorize(&Requester::anonymous(UserId::new()), &config),
            Err(AccessError::Unauthenticated)
        );
    }

    #[test]
    fn configured_group_requires_membership() {
        let group = GroupId::new();
        let config = PolicyConfig::default().with_allowed_group(Some(group));

        let outsider = Requester::authenticated(UserId::new()).in_group(GroupId::new());
        assert_eq!(authorize(&outsider, &config), Err(AccessError::NotInGroup(group)));

        let member = Requester::authenticated(UserId::new()).in_group(group);
        assert_eq!(authorize(&member, &config), Ok(()));
    }
}
