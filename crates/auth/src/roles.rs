use core::str::FromStr;

use serde::{Deserialize, Serialize};

use catalog_core::DomainError;

/// Role identifier used for access decisions.
///
/// The derived `Ord` encodes the visibility order `admin > coordinador >
/// auxiliar`. This is a total order for *visibility* purposes, not a numeric
/// privilege scale: the policy layer still applies per-action rules on top
/// (e.g. `auxiliar` self-only access).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Default role for new signups.
    #[default]
    Auxiliar,
    Coordinador,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Auxiliar => "auxiliar",
            Role::Coordinador => "coordinador",
            Role::Admin => "admin",
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "coordinador" => Ok(Role::Coordinador),
            "auxiliar" => Ok(Role::Auxiliar),
            other => Err(DomainError::validation(format!("unknown role: {other}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visibility_order() {
        assert!(Role::Admin > Role::Coordinador);
        assert!(Role::Coordinador > Role::Auxiliar);
    }

    #[test]
    fn parse_known_roles() {
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("coordinador".parse::<Role>().unwrap(), Role::Coordinador);
        assert!("root".parse::<Role>().is_err());
    }

    #[test]
    fn default_role_is_auxiliar() {
        assert_eq!(Role::default(), Role::Auxiliar);
    }
}
