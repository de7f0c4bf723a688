use chrono::Duration;

/// Authentication configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthConfig {
    /// Access-token lifetime, measured from issuance.
    pub token_ttl: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            // 24h access horizon.
            token_ttl: Duration::hours(24),
        }
    }
}

impl AuthConfig {
    /// Load from the environment, falling back to defaults.
    ///
    /// `TOKEN_TTL_SECS` overrides the token lifetime; unparsable values are
    /// ignored rather than fatal.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(raw) = std::env::var("TOKEN_TTL_SECS")
            && let Ok(secs) = raw.parse::<i64>()
            && secs > 0
        {
            config.token_ttl = Duration::seconds(secs);
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_ttl() {
        assert_eq!(AuthConfig::default().token_ttl, Duration::seconds(86_400));
    }
}
