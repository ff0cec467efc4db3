//! Account status.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Administrative state of an account, independent of time-based locks and expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    #[default]
    Active,
    /// Disabled by an administrator.
    Inactive,
    /// Locked until an administrator unlocks it.
    Locked,
}

impl UserStatus {
    /// Status from the `enabled`/`locked` flags of a user record. A lock wins.
    pub fn from_flags(enabled: bool, locked: bool) -> Self {
        match (enabled, locked) {
            (_, true) => Self::Locked,
            (true, false) => Self::Active,
            (false, false) => Self::Inactive,
        }
    }

    /// Whether this status alone allows logging in.
    pub fn can_login(self) -> bool {
        self == Self::Active
    }
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Locked => "locked",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lock_flag_wins_over_enabled() {
        assert_eq!(UserStatus::from_flags(true, true), UserStatus::Locked);
        assert_eq!(UserStatus::from_flags(false, true), UserStatus::Locked);
        assert_eq!(UserStatus::from_flags(true, false), UserStatus::Active);
        assert_eq!(UserStatus::from_flags(false, false), UserStatus::Inactive);
    }

    #[test]
    fn only_active_can_login() {
        assert!(UserStatus::Active.can_login());
        assert!(!UserStatus::Inactive.can_login());
        assert!(!UserStatus::Locked.can_login());
    }
}
