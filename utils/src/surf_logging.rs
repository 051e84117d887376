use std::time::Instant;

use surf::middleware::{Middleware, Next};
use surf::{Client, Request, Response};

/// Logs every request going through a surf client together with the
/// response status and how long the round-trip took.
///
/// Query strings are left out of the log line, they may carry
/// identifiers the caller doesn't want in the logs.
#[derive(Debug, Default, Clone, Copy)]
pub struct SurfLogging;

#[surf::utils::async_trait]
impl Middleware for SurfLogging {
    async fn handle(&self, req: Request, client: Client, next: Next<'_>) -> surf::Result<Response> {
        let method = req.method();
        let mut url = req.url().clone();
        url.set_query(None);

        log::debug!("--> {} {}", method, url);
        let start = Instant::now();

        match next.run(req, client).await {
            Ok(res) => {
                log::debug!(
                    "<-- {} {} {} ({} ms)",
                    res.status(),
                    method,
                    url,
                    start.elapsed().as_millis()
                );
                Ok(res)
            }
            Err(err) => {
                log::warn!(
                    "<-- {} {} failed after {} ms: {}",
                    method,
                    url,
                    start.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }
}
