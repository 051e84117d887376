use chrono::Duration;

use crate::error::{Error, ResultExt};
use crate::models::{decode, User};
use crate::{redact, DebridClient, Result};

/// A token confirmed valid is trusted for this long without asking the service again.
///
/// Only valid tokens are cached: an invalid one may become valid again
/// within the day once the user renews their subscription.
pub const TOKEN_TTL_HOURS: i64 = 24;

impl DebridClient {
    /// Checks that `token` belongs to a usable account.
    ///
    /// Answers from the token cache when the token was confirmed within the
    /// last 24 hours, otherwise asks the service and caches a positive answer.
    pub async fn validate_token(&self, token: &str) -> Result<()> {
        let shown = redact(token);
        log::debug!("Testing token {}...", shown);

        let ttl = Duration::hours(TOKEN_TTL_HOURS);
        if self.is_fresh_in(&*self.token_cache, token, &shown, ttl, "token") {
            return Ok(());
        }

        let body = self
            .transport
            .get(&self.api_url("/rest/1.0/user"), token)
            .await
            .context("couldn't fetch user info with the provided token")?;
        let user: User = decode(&body, "user info")?;
        if user.id.is_none() {
            return Err(Error::malformed(
                "user info response doesn't contain \"id\" key",
            ));
        }

        log::debug!("Token {} OK", shown);
        self.remember(&*self.token_cache, token, &shown, "token");

        Ok(())
    }
}
