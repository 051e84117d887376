use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use figment::providers::{Env, Format, Yaml};
use figment::Figment;
use getset::Getters;
use serde::{Deserialize, Deserializer};
use surf::http::headers::{HeaderName, HeaderValue};

use crate::error::{Error, Result};

pub const DEFAULT_BASE_URL: &str = "https://api.real-debrid.com";

/// Settings of a [`DebridClient`](crate::DebridClient).
///
/// `base_url` may point at a proxy in front of the debrid service, every
/// URL the service hands out is rewritten onto it.
#[derive(Debug, Clone, Getters, Deserialize)]
#[get = "pub"]
#[serde(default)]
pub struct ClientOptions {
    base_url: String,
    #[serde(rename = "timeout_secs", deserialize_with = "std_secs")]
    timeout: Duration,
    #[serde(rename = "cache_age_secs", deserialize_with = "chrono_secs")]
    cache_age: chrono::Duration,
    /// Static headers in `"Name: Value"` form, sent with every request
    extra_headers: Vec<String>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(5),
            cache_age: chrono::Duration::hours(24),
            extra_headers: vec![],
        }
    }
}

impl ClientOptions {
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        cache_age: chrono::Duration,
        extra_headers: Vec<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            timeout,
            cache_age,
            extra_headers,
        }
    }

    /// Loads options from a YAML file, overridden by `DEBRID_*` environment variables.
    /// Missing keys keep their default.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Figment::new()
            .merge(Yaml::file(path.as_ref()))
            .merge(Env::prefixed("DEBRID_"))
            .extract()
            .map_err(|err| Error::InvalidConfig(err.to_string()))
    }

    /// Base URL without trailing slash, ready to have an API path appended.
    pub(crate) fn api_base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.base_url.is_empty() {
            return Err(Error::InvalidConfig("base URL must not be empty".into()));
        }
        self.parsed_headers().map(|_| ())
    }

    /// Splits the extra headers into name/value pairs. Empty entries are skipped.
    /// Name and value must be valid HTTP header parts, surf panics on anything else.
    pub(crate) fn parsed_headers(&self) -> Result<Vec<(String, String)>> {
        self.extra_headers
            .iter()
            .filter(|header| !header.is_empty())
            .map(|header| {
                let (name, value) = match header.find(':') {
                    Some(idx) if idx > 0 && idx < header.len() - 1 => {
                        (header[..idx].trim(), header[idx + 1..].trim())
                    }
                    _ => {
                        return Err(Error::InvalidConfig(format!(
                            "extra header '{header}' must have a format like \"X-Foo: bar\""
                        )))
                    }
                };

                HeaderName::from_str(name)
                    .and_then(|_| HeaderValue::from_str(value))
                    .map_err(|err| {
                        Error::InvalidConfig(format!("extra header '{header}' is invalid: {err}"))
                    })?;

                Ok((name.to_string(), value.to_string()))
            })
            .collect()
    }
}

fn std_secs<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Duration, D::Error> {
    u64::deserialize(deserializer).map(Duration::from_secs)
}

fn chrono_secs<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<chrono::Duration, D::Error> {
    i64::deserialize(deserializer).map(chrono::Duration::seconds)
}
