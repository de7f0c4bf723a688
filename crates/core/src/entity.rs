//! Entity trait and shared timestamp bookkeeping.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Entity marker + minimal interface: identity + continuity across state changes.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}

/// Creation/modification timestamps carried by every stored document.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timestamps {
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Timestamps {
    pub fn now() -> Self {
        let at = Utc::now();
        Self {
            created_at: at,
            updated_at: at,
        }
    }

    pub fn at(at: DateTime<Utc>) -> Self {
        Self {
            created_at: at,
            updated_at: at,
        }
    }

    /// Record a modification.
    pub fn touch(&mut self, at: DateTime<Utc>) {
        self.updated_at = at;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touch_moves_only_updated_at() {
        let mut ts = Timestamps::now();
        let created = ts.created_at;
        let later = created + chrono::Duration::seconds(5);
        ts.touch(later);
        assert_eq!(ts.created_at, created);
        assert_eq!(ts.updated_at, later);
    }
}
