use ::url::{Position, Url};

pub use ::url::ParseError;

/// Replaces the scheme and host of `original` with `new_base`, keeping
/// path, query and fragment.
///
/// `new_base` may carry a path prefix of its own (a reverse proxy mounted
/// under a sub-path), it is prepended as-is. A trailing slash on the base
/// is dropped so the result never contains a double slash.
pub fn replace_base_url(original: &str, new_base: &str) -> Result<String, ParseError> {
    let parsed = Url::parse(original)?;
    let rest = &parsed[Position::BeforePath..];

    Ok(format!("{}{}", new_base.trim_end_matches('/'), rest))
}
