use crate::error::{Error, ResultExt};
use crate::models::{decode, Unrestricted};
use crate::{DebridClient, Result};

impl DebridClient {
    /// Turns a debrid-internal link into a direct download URL.
    ///
    /// `remote` asks for a link usable from a remote/cloud destination
    /// instead of a direct download.
    pub async fn unrestrict_link(&self, token: &str, link: &str, remote: bool) -> Result<String> {
        log::debug!("Unrestricting link {}...", link);

        let mut form = vec![("link", link)];
        if remote {
            form.push(("remote", "1"));
        }

        let body = self
            .transport
            .post(&self.api_url("/rest/1.0/unrestrict/link"), token, &form)
            .await
            .context("couldn't unrestrict link")?;
        let unrestricted: Unrestricted = decode(&body, "unrestricted link")?;

        let stream_url = unrestricted
            .download
            .filter(|download| !download.is_empty())
            .ok_or_else(|| {
                Error::malformed("unrestrict response doesn't contain \"download\" key")
            })?;

        log::debug!("Unrestricted link: {}", stream_url);
        Ok(stream_url)
    }
}
