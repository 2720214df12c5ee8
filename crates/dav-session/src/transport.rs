//! reqwest-backed implementation of the transport seam.

use async_trait::async_trait;
use dav_session_core::{DavError, DavMethod, DavRequest, DavResponse, Transport};
use http::header::CONTENT_TYPE;
use reqwest::Client;
use tracing::{debug, instrument};

/// Basic-auth credentials for the WebDAV server.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// `Transport` over `reqwest::Client`.
///
/// Renders the WebDAV request headers (`Depth`, `Destination`, `Overwrite`,
/// the `If` lock-token lists, `Lock-Token` for UNLOCK) from the typed
/// request fields and buffers response bodies whole.
pub struct ReqwestTransport {
    http: Client,
    credentials: Option<Credentials>,
}

impl ReqwestTransport {
    pub fn new(credentials: Option<Credentials>) -> Self {
        Self::with_client(Client::new(), credentials)
    }

    /// Use a preconfigured client (proxies, timeouts, TLS settings).
    pub fn with_client(http: Client, credentials: Option<Credentials>) -> Self {
        Self { http, credentials }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    #[instrument(
        skip(self, request),
        level = "debug",
        fields(method = %request.method, uri = %request.uri)
    )]
    async fn send(&self, request: DavRequest) -> Result<DavResponse, DavError> {
        let method = reqwest::Method::from_bytes(request.method.as_str().as_bytes())
            .map_err(DavError::transport)?;
        let mut builder = self.http.request(method, request.uri.clone());

        if let Some(credentials) = &self.credentials {
            builder = builder.basic_auth(&credentials.username, Some(&credentials.password));
        }
        if let Some(depth) = request.depth {
            builder = builder.header("Depth", depth.as_str());
        }
        if let Some(destination) = &request.destination {
            builder = builder.header("Destination", destination.as_str());
        }
        if let Some(overwrite) = request.overwrite {
            builder = builder.header("Overwrite", if overwrite { "T" } else { "F" });
        }
        if request.method == DavMethod::Unlock {
            if let Some(token) = &request.lock_token {
                builder = builder.header("Lock-Token", format!("<{token}>"));
            }
        } else if let Some(condition) = if_header(&request) {
            builder = builder.header("If", condition);
        }
        if let Some(content_type) = &request.content_type {
            builder = builder.header(CONTENT_TYPE, content_type);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(DavError::transport)?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(DavError::transport)?
            .to_vec();

        debug!("{} -> {status} ({} bytes)", request.uri, body.len());
        Ok(DavResponse {
            status,
            headers,
            body,
        })
    }
}

/// Render the `If` header: an untagged list for the request-URI token plus
/// a tagged list for the destination token of COPY/MOVE.
fn if_header(request: &DavRequest) -> Option<String> {
    let mut lists = Vec::new();
    if let Some(token) = &request.lock_token {
        lists.push(format!("(<{token}>)"));
    }
    if let (Some(destination), Some(token)) =
        (&request.destination, &request.destination_lock_token)
    {
        lists.push(format!("<{destination}> (<{token}>)"));
    }
    if lists.is_empty() {
        None
    } else {
        Some(lists.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use dav_session_core::DavMethod;
    use url::Url;

    use super::*;

    fn request(method: DavMethod) -> DavRequest {
        DavRequest::new(method, Url::parse("http://h/webdav/file.txt").unwrap())
    }

    #[test]
    fn if_header_for_request_uri_token() {
        let mut req = request(DavMethod::Put);
        req.lock_token = Some("urn:uuid:abc".to_string());
        assert_eq!(if_header(&req).as_deref(), Some("(<urn:uuid:abc>)"));
    }

    #[test]
    fn if_header_tags_the_destination_list() {
        let mut req = request(DavMethod::Move);
        req.lock_token = Some("urn:uuid:src".to_string());
        req.destination = Some(Url::parse("http://h/webdav/to/").unwrap());
        req.destination_lock_token = Some("urn:uuid:dst".to_string());

        assert_eq!(
            if_header(&req).as_deref(),
            Some("(<urn:uuid:src>) <http://h/webdav/to/> (<urn:uuid:dst>)")
        );
    }

    #[test]
    fn if_header_absent_without_tokens() {
        assert_eq!(if_header(&request(DavMethod::Put)), None);
    }
}
