use getset::Getters;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::status::TorrentStatus;

/// `GET /user`, only the presence of `id` matters.
#[derive(Debug, Deserialize)]
pub(crate) struct User {
    pub id: Option<serde_json::Value>,
}

/// `POST /torrents/addMagnet`
#[derive(Debug, Deserialize)]
pub(crate) struct AddedMagnet {
    #[serde(default)]
    pub uri: String,
}

/// A file inside a torrent, as listed by the debrid service.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Deserialize)]
#[get = "pub"]
pub struct TorrentFile {
    /// Starts at 1; 0 means the entry is unusable
    #[serde(default, deserialize_with = "null_as_default")]
    id: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    path: String,
    #[serde(default, deserialize_with = "null_as_default")]
    bytes: u64,
}

impl TorrentFile {
    pub fn new(id: u64, bytes: u64) -> Self {
        Self {
            id,
            path: String::new(),
            bytes,
        }
    }
}

/// `GET /torrents/info/{id}`
#[derive(Debug, Clone, Getters, Deserialize)]
#[get = "pub"]
pub struct TorrentInfo {
    #[serde(default, deserialize_with = "null_as_default")]
    id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    filename: String,
    #[serde(default, deserialize_with = "parse_status")]
    status: Option<TorrentStatus>,
    #[serde(default, deserialize_with = "null_as_default")]
    progress: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    files: Vec<TorrentFile>,
    #[serde(default, deserialize_with = "null_as_default")]
    links: Vec<String>,
}

/// The service sometimes sends `null` instead of leaving a field out.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn parse_status<'de, D: serde::Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<TorrentStatus>, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.map(|raw| TorrentStatus::parse(&raw)))
}

/// `POST /unrestrict/link`
#[derive(Debug, Deserialize)]
pub(crate) struct Unrestricted {
    pub download: Option<String>,
}

/// Decodes a JSON body, turning any decoding failure into a malformed-response error.
pub(crate) fn decode<'a, T: Deserialize<'a>>(body: &'a [u8], what: &str) -> Result<T> {
    serde_json::from_slice(body).map_err(|err| Error::malformed(format!("{what}: {err}")))
}
