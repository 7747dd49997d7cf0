//! Installation access token model.

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;

/// A short-lived token scoped to one GitHub App installation.
///
/// Never persisted; held only by the in-process token cache.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct InstallationToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl InstallationToken {
    /// Whether the token stays valid for longer than `margin` from `now`.
    pub fn is_fresh_at(&self, now: DateTime<Utc>, margin: Duration) -> bool {
        self.expires_at - margin > now
    }
}

impl std::fmt::Debug for InstallationToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstallationToken")
            .field("token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token_expiring_in(secs: i64) -> InstallationToken {
        InstallationToken {
            token: "ghs_secret".to_string(),
            expires_at: Utc::now() + Duration::seconds(secs),
        }
    }

    #[test]
    fn test_fresh_outside_margin() {
        let now = Utc::now();
        assert!(token_expiring_in(3_600).is_fresh_at(now, Duration::seconds(60)));
    }

    #[test]
    fn test_stale_inside_margin() {
        let now = Utc::now();
        assert!(!token_expiring_in(30).is_fresh_at(now, Duration::seconds(60)));
        assert!(!token_expiring_in(-5).is_fresh_at(now, Duration::zero()));
    }

    #[test]
    fn test_debug_redacts_token() {
        let rendered = format!("{:?}", token_expiring_in(60));
        assert!(!rendered.contains("ghs_secret"));
    }
}
