use async_trait::async_trait;
use rand::Rng;
use surf::http::{headers, Method};
use surf::{Body, Client, RequestBuilder, StatusCode, Url};
use utils::surf_logging::SurfLogging;

use crate::error::{Error, Result};
use crate::options::ClientOptions;

/// Authenticated access to the debrid service.
///
/// Implementations classify failures: 401 is [`Error::InvalidToken`], 403 is
/// [`Error::AccountLocked`], any other unsuccessful status is
/// [`Error::BadStatus`] and I/O problems are [`Error::Transport`].
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str, token: &str) -> Result<Vec<u8>>;

    /// Sends `form` as an `application/x-www-form-urlencoded` body.
    async fn post(&self, url: &str, token: &str, form: &[(&str, &str)]) -> Result<Vec<u8>>;
}

/// [`Transport`] on top of a surf client.
#[derive(Clone)]
pub struct SurfTransport {
    http: Client,
    extra_headers: Vec<(String, String)>,
}

impl SurfTransport {
    pub fn new(options: &ClientOptions) -> Result<Self> {
        options.validate()?;

        let http: Client = surf::Config::new()
            .set_timeout(Some(*options.timeout()))
            .try_into()
            .map_err(|err| Error::InvalidConfig(format!("couldn't create HTTP client: {err}")))?;

        Ok(Self {
            http: http.with(SurfLogging),
            extra_headers: options.parsed_headers()?,
        })
    }

    fn request(&self, method: Method, url: &str, token: &str) -> Result<RequestBuilder> {
        let parsed = Url::parse(url).map_err(|err| Error::Transport {
            method: method_name(method),
            url: url.to_string(),
            message: format!("invalid URL: {err}"),
        })?;

        let mut builder = RequestBuilder::new(method, parsed)
            .header(headers::AUTHORIZATION, format!("Bearer {token}"))
            .header(headers::USER_AGENT, user_agent());
        for (name, value) in &self.extra_headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        Ok(builder)
    }

    async fn send(
        &self,
        builder: RequestBuilder,
        method: &'static str,
        url: &str,
        accepted: &[StatusCode],
    ) -> Result<Vec<u8>> {
        let transport_err = |err: surf::Error| Error::Transport {
            method,
            url: url.to_string(),
            message: err.to_string(),
        };

        let mut res = self.http.send(builder).await.map_err(transport_err)?;

        let status = res.status();
        if !accepted.contains(&status) {
            return Err(match status {
                StatusCode::Unauthorized => Error::InvalidToken,
                StatusCode::Forbidden => Error::AccountLocked,
                _ => {
                    let body = res.body_string().await.unwrap_or_default();
                    Error::BadStatus {
                        status: u16::from(status),
                        method,
                        url: url.to_string(),
                        body: (!body.is_empty()).then_some(body),
                    }
                }
            });
        }

        res.body_bytes().await.map_err(transport_err)
    }
}

#[async_trait]
impl Transport for SurfTransport {
    async fn get(&self, url: &str, token: &str) -> Result<Vec<u8>> {
        let builder = self.request(Method::Get, url, token)?;
        self.send(builder, "GET", url, &[StatusCode::Ok]).await
    }

    async fn post(&self, url: &str, token: &str, form: &[(&str, &str)]) -> Result<Vec<u8>> {
        let body = Body::from_form(&form).map_err(|err| Error::Transport {
            method: "POST",
            url: url.to_string(),
            message: format!("couldn't encode form: {err}"),
        })?;
        let builder = self.request(Method::Post, url, token)?.body(body);

        // POST endpoints answer with different success codes
        self.send(
            builder,
            "POST",
            url,
            &[StatusCode::Ok, StatusCode::Created, StatusCode::NoContent],
        )
        .await
    }
}

fn method_name(method: Method) -> &'static str {
    match method {
        Method::Post => "POST",
        _ => "GET",
    }
}

/// The service is known to block requests by User-Agent, so look like a
/// browser with a varying build number.
fn user_agent() -> String {
    let build = rand::rng().random_range(0..10_000);
    format!(
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/80.0.{build}.149 Safari/537.36"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};

    /// Serves a single canned response and hands back the raw request it received.
    fn one_shot_server(status_line: &str, body: &str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let response = format!(
            "HTTP/1.1 {status_line}\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );

        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let request = read_request(&mut stream);
            stream.write_all(response.as_bytes()).unwrap();
            stream.flush().unwrap();
            request
        });

        (base, handle)
    }

    fn read_request(stream: &mut std::net::TcpStream) -> String {
        let mut raw = Vec::new();
        let mut buf = [0u8; 1024];
        loop {
            let n = stream.read(&mut buf).unwrap();
            raw.extend_from_slice(&buf[..n]);
            let text = String::from_utf8_lossy(&raw).to_string();
            let Some(head_end) = text.find("\r\n\r\n") else {
                if n == 0 {
                    return text;
                }
                continue;
            };

            let head = text[..head_end].to_lowercase();
            let body = &text[head_end + 4..];
            let complete = if let Some(len) = head
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
            {
                body.len() >= len.trim().parse::<usize>().unwrap()
            } else if head.contains("transfer-encoding: chunked") {
                body.ends_with("0\r\n\r\n")
            } else {
                true
            };
            if complete || n == 0 {
                return text;
            }
        }
    }

    fn transport() -> SurfTransport {
        let opts = ClientOptions::new(
            "http://localhost",
            std::time::Duration::from_secs(5),
            chrono::Duration::hours(1),
            vec!["X-Proxy-Auth: secret".to_string()],
        );
        SurfTransport::new(&opts).unwrap()
    }

    #[test]
    fn user_agent_looks_like_chrome() {
        let ua = user_agent();
        assert!(ua.starts_with("Mozilla/5.0"));
        assert!(ua.contains("Chrome/80.0."));
    }

    #[test]
    fn rejects_malformed_headers() {
        let opts = ClientOptions::new(
            "http://localhost",
            std::time::Duration::from_secs(1),
            chrono::Duration::hours(1),
            vec!["nonsense".to_string()],
        );
        assert!(SurfTransport::new(&opts).is_err());
    }

    #[tokio::test]
    async fn unparseable_url_is_a_transport_error() {
        let transport = SurfTransport::new(&ClientOptions::default()).unwrap();
        let err = transport.get("not a url", "token").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
    }

    #[tokio::test]
    async fn get_sends_auth_and_extra_headers() {
        let (base, server) = one_shot_server("200 OK", r#"{"id":42}"#);

        let body = transport()
            .get(&format!("{base}/rest/1.0/user"), "secret-token")
            .await
            .unwrap();
        let request = server.join().unwrap();

        assert_eq!(body, br#"{"id":42}"#.to_vec());
        assert!(request.starts_with("GET /rest/1.0/user HTTP/1.1\r\n"));
        let head = request.to_lowercase();
        assert!(head.contains("authorization: bearer secret-token\r\n"));
        assert!(head.contains("x-proxy-auth: secret\r\n"));
        assert!(head.contains("user-agent: mozilla/5.0"));
    }

    #[tokio::test]
    async fn unauthorized_is_invalid_token() {
        let (base, server) = one_shot_server("401 Unauthorized", "");

        let err = transport().get(&base, "token").await.unwrap_err();
        server.join().unwrap();

        assert_eq!(err.kind(), ErrorKind::InvalidToken);
    }

    #[tokio::test]
    async fn forbidden_is_account_locked() {
        let (base, server) = one_shot_server("403 Forbidden", r#"{"error":"locked"}"#);

        let err = transport()
            .post(&base, "token", &[("magnet", "magnet:?xt=urn:btih:AAAA")])
            .await
            .unwrap_err();
        server.join().unwrap();

        assert_eq!(err.kind(), ErrorKind::AccountLocked);
    }

    #[tokio::test]
    async fn other_status_carries_status_and_body() {
        let (base, server) = one_shot_server("500 Internal Server Error", "oops");
        let url = format!("{base}/rest/1.0/torrents/info/T1");

        let err = transport().get(&url, "token").await.unwrap_err();
        server.join().unwrap();

        match &err {
            Error::BadStatus {
                status,
                method,
                url: failed_url,
                body,
            } => {
                assert_eq!(*status, 500);
                assert_eq!(*method, "GET");
                assert_eq!(failed_url, &url);
                assert_eq!(body.as_deref(), Some("oops"));
            }
            other => panic!("unexpected error {other}"),
        }
        assert!(err.to_string().ends_with("; response body: 'oops')"));
    }

    #[tokio::test]
    async fn get_only_accepts_ok() {
        let (base, server) = one_shot_server("201 Created", "");

        let err = transport().get(&base, "token").await.unwrap_err();
        server.join().unwrap();

        match err {
            Error::BadStatus { status, body, .. } => {
                assert_eq!(status, 201);
                assert_eq!(body, None);
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[tokio::test]
    async fn post_sends_form_and_accepts_no_content() {
        let (base, server) = one_shot_server("204 No Content", "");

        let body = transport()
            .post(
                &format!("{base}/rest/1.0/unrestrict/link"),
                "token",
                &[("link", "https://x/d/1"), ("remote", "1")],
            )
            .await
            .unwrap();
        let request = server.join().unwrap();

        assert!(body.is_empty());
        assert!(request.starts_with("POST /rest/1.0/unrestrict/link HTTP/1.1\r\n"));
        assert!(request
            .to_lowercase()
            .contains("content-type: application/x-www-form-urlencoded"));
        assert!(request.ends_with("\r\n\r\nlink=https%3A%2F%2Fx%2Fd%2F1&remote=1"));
    }

    #[tokio::test]
    async fn post_accepts_created() {
        let (base, server) = one_shot_server("201 Created", r#"{"id":"T1","uri":"u"}"#);

        let body = transport()
            .post(&base, "token", &[("magnet", "m")])
            .await
            .unwrap();
        server.join().unwrap();

        assert_eq!(body, br#"{"id":"T1","uri":"u"}"#.to_vec());
    }
}
