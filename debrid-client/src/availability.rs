use std::collections::HashSet;

use serde_json::{Map, Value};

use crate::models::decode;
use crate::{redact, DebridClient};

impl DebridClient {
    /// Returns the info hashes (uppercased) the service can serve instantly.
    ///
    /// Hashes confirmed within `cache_age` are answered from the availability
    /// cache, the rest are checked with a single request. Unavailable hashes
    /// are left out, they are never cached since that may change any time. A
    /// failing request only loses the hashes it was asked about.
    pub async fn check_instant_availability<S: AsRef<str>>(
        &self,
        token: &str,
        info_hashes: &[S],
    ) -> Vec<String> {
        let mut result = Vec::new();
        if info_hashes.is_empty() {
            return result;
        }

        let cache_age = *self.options.cache_age();
        let mut seen = HashSet::new();
        let mut unresolved = Vec::new();
        for info_hash in info_hashes {
            let info_hash = info_hash.as_ref().to_uppercase();
            if !seen.insert(info_hash.clone()) {
                continue;
            }

            if self.is_fresh_in(
                &*self.availability_cache,
                &info_hash,
                &info_hash,
                cache_age,
                "availability",
            ) {
                result.push(info_hash);
            } else {
                unresolved.push(info_hash);
            }
        }

        if unresolved.is_empty() {
            return result;
        }

        let url = self.api_url(&format!(
            "/rest/1.0/torrents/instantAvailability/{}",
            unresolved.join("/")
        ));
        let availability = match self.transport.get(&url, token).await {
            Ok(body) => decode::<Map<String, Value>>(&body, "instant availability"),
            Err(err) => Err(err),
        };
        let availability = match availability {
            Ok(availability) => availability,
            Err(err) => {
                log::error!(
                    "Couldn't check torrents' instant availability with token {}: {}",
                    redact(token),
                    err
                );
                return result;
            }
        };

        let mut pending: HashSet<String> = unresolved.into_iter().collect();
        for (key, value) in availability {
            let info_hash = key.to_uppercase();
            // The service only knows the hashes we asked about, anything else is ignored
            if !has_rd_files(&value) || !pending.remove(&info_hash) {
                continue;
            }

            self.remember(
                &*self.availability_cache,
                &info_hash,
                &info_hash,
                "availability",
            );
            result.push(info_hash);
        }

        result
    }
}

/// Available iff the `rd` list has at least one entry. Its contents don't matter.
fn has_rd_files(value: &Value) -> bool {
    value
        .get("rd")
        .and_then(Value::as_array)
        .is_some_and(|files| !files.is_empty())
}
