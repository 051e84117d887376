use std::fmt;

use strum_macros::{AsRefStr, EnumString};

/// Torrent status as reported by the debrid service.
///
/// Values the service may add later end up in [`TorrentStatus::Unknown`]
/// and are treated like any other in-progress status.
#[derive(Debug, Clone, PartialEq, Eq, EnumString, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum TorrentStatus {
    MagnetError,
    MagnetConversion,
    WaitingFilesSelection,
    Queued,
    Downloading,
    Downloaded,
    Error,
    Virus,
    Compressing,
    Uploading,
    Dead,
    #[strum(default)]
    Unknown(String),
}

impl TorrentStatus {
    /// Parses a raw status; never fails, unrecognized values are kept verbatim.
    pub fn parse(raw: &str) -> Self {
        raw.parse()
            .unwrap_or_else(|_| TorrentStatus::Unknown(raw.to_string()))
    }

    /// The torrent will never become downloadable, polling it further is pointless.
    pub fn is_terminal_failure(&self) -> bool {
        matches!(
            self,
            TorrentStatus::MagnetError
                | TorrentStatus::Error
                | TorrentStatus::Virus
                | TorrentStatus::Dead
        )
    }

    pub fn is_downloaded(&self) -> bool {
        matches!(self, TorrentStatus::Downloaded)
    }
}

impl fmt::Display for TorrentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TorrentStatus::Unknown(raw) => f.write_str(raw),
            known => f.write_str(known.as_ref()),
        }
    }
}
