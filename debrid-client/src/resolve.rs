use std::time::Duration;

use utils::url::replace_base_url;

use crate::error::{Error, ResultExt};
use crate::models::{decode, AddedMagnet, TorrentInfo};
use crate::select::select_file_id;
use crate::status::TorrentStatus;
use crate::{redact, DebridClient, Result};

/// Number of status checks a torrent gets to reach `downloaded` after its
/// file was selected. Shared by the queued and the downloading phase.
pub const WAIT_FOR_DOWNLOAD_POLLS: u32 = 5;

/// Pause between two status checks.
pub const POLL_INTERVAL: Duration = Duration::from_secs(1);

impl DebridClient {
    /// Resolves `magnet` into a streamable URL.
    ///
    /// Adds the magnet, selects its biggest file, waits a few seconds for
    /// the service to have it downloaded and unrestricts the resulting link.
    /// Torrents which aren't cached by the service usually fail with
    /// [`ErrorKind::PollTimeout`](crate::ErrorKind::PollTimeout).
    pub async fn get_stream_url(&self, magnet: &str, token: &str, remote: bool) -> Result<String> {
        let shown = redact(token);

        log::debug!("Adding torrent with token {}...", shown);
        let body = self
            .transport
            .post(
                &self.api_url("/rest/1.0/torrents/addMagnet"),
                token,
                &[("magnet", magnet)],
            )
            .await
            .context("couldn't add torrent")?;
        let added: AddedMagnet = decode(&body, "added torrent")?;
        log::debug!("Finished adding torrent");

        // The service answers with its own host, go through the configured one instead
        let info_url = replace_base_url(&added.uri, self.options.api_base()).map_err(|err| {
            Error::malformed(format!("couldn't parse torrent URL '{}': {}", added.uri, err))
        })?;

        log::debug!("Checking torrent info...");
        let info = self
            .torrent_info(&info_url, token)
            .await
            .context("couldn't get torrent info")?;
        if info.id().is_empty() {
            return Err(Error::malformed(
                "torrent info response doesn't contain \"id\" key",
            ));
        }
        if info.files().is_empty() {
            return Err(Error::malformed(
                "torrent info response doesn't contain \"files\" key",
            ));
        }
        let file_id =
            select_file_id(info.files()).context("couldn't find proper file in torrent")?;
        log::debug!("Torrent info OK, selected file {} of {}", file_id, info.id());

        log::debug!("Selecting file of torrent {}...", info.id());
        let file_id = file_id.to_string();
        self.transport
            .post(
                &self.api_url(&format!("/rest/1.0/torrents/selectFiles/{}", info.id())),
                token,
                &[("files", file_id.as_str())],
            )
            .await
            .context("couldn't select torrent file")?;
        log::debug!("Finished selecting file");

        let info = self.wait_for_download(&info_url, token).await?;
        let debrid_link = info.links().first().ok_or_else(|| {
            Error::malformed("downloaded torrent info doesn't contain any link")
        })?;
        log::debug!("Torrent {} is downloaded", info.id());

        self.unrestrict_link(token, debrid_link, remote).await
    }

    async fn torrent_info(&self, url: &str, token: &str) -> Result<TorrentInfo> {
        let body = self.transport.get(url, token).await?;
        decode(&body, "torrent info")
    }

    /// Polls the torrent until it's downloaded, failed, or the wait budget is spent.
    async fn wait_for_download(&self, info_url: &str, token: &str) -> Result<TorrentInfo> {
        log::debug!("Checking torrent status...");

        let mut waited = 0;
        loop {
            let info = self
                .torrent_info(info_url, token)
                .await
                .context("couldn't get torrent status")?;
            // No status at all is as good as a status we don't know
            let status = info
                .status()
                .clone()
                .unwrap_or_else(|| TorrentStatus::Unknown(String::new()));

            if status.is_terminal_failure() {
                log::debug!("Torrent {} ended with status {}", info.id(), status);
                return Err(Error::TerminalStatus(status));
            }
            if status.is_downloaded() {
                return Ok(info);
            }
            if waited >= WAIT_FOR_DOWNLOAD_POLLS {
                let waited = POLL_INTERVAL * WAIT_FOR_DOWNLOAD_POLLS;
                log::debug!(
                    "Torrent still {} after waiting for {}s",
                    status,
                    waited.as_secs()
                );
                return Err(Error::PollTimeout { status, waited });
            }

            log::debug!(
                "Torrent {} ({:.1}%), waiting... remaining wait: {}s",
                status,
                info.progress(),
                (POLL_INTERVAL * (WAIT_FOR_DOWNLOAD_POLLS - waited)).as_secs()
            );
            waited += 1;
            self.sleeper.sleep(POLL_INTERVAL).await;
        }
    }
}
