//! The raw transport seam between the session and the wire.
//!
//! The session builds `DavRequest` values and hands them to a `Transport`;
//! protocol header rendering (`Depth`, `Destination`, `Overwrite`, the `If`
//! lock-token list) is the transport's concern, so the session never touches
//! HTTP headers directly.

use async_trait::async_trait;
use http::{HeaderMap, StatusCode};
use url::Url;

use crate::error::DavError;

/// WebDAV request methods issued by the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DavMethod {
    Get,
    Put,
    Delete,
    Mkcol,
    Copy,
    Move,
    Propfind,
    Lock,
    Unlock,
}

impl DavMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            DavMethod::Get => "GET",
            DavMethod::Put => "PUT",
            DavMethod::Delete => "DELETE",
            DavMethod::Mkcol => "MKCOL",
            DavMethod::Copy => "COPY",
            DavMethod::Move => "MOVE",
            DavMethod::Propfind => "PROPFIND",
            DavMethod::Lock => "LOCK",
            DavMethod::Unlock => "UNLOCK",
        }
    }

    /// Whether this method mutates server state and must carry lock affinity.
    pub fn is_mutating(&self) -> bool {
        matches!(
            self,
            DavMethod::Put
                | DavMethod::Delete
                | DavMethod::Mkcol
                | DavMethod::Copy
                | DavMethod::Move
        )
    }
}

impl std::fmt::Display for DavMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The `Depth` request header value.
///
/// reference: [RFC4918: 10.2. Depth Header](https://datatracker.ietf.org/doc/html/rfc4918#section-10.2)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Depth {
    Zero,
    One,
    Infinity,
}

impl Depth {
    pub fn as_str(&self) -> &'static str {
        match self {
            Depth::Zero => "0",
            Depth::One => "1",
            Depth::Infinity => "infinity",
        }
    }
}

/// One request to a WebDAV server, already normalized by the session.
#[derive(Debug, Clone)]
pub struct DavRequest {
    pub method: DavMethod,
    pub uri: Url,
    pub depth: Option<Depth>,
    /// Target of COPY/MOVE, rendered as the `Destination` header.
    pub destination: Option<Url>,
    /// COPY/MOVE overwrite flag, rendered as `Overwrite: T`/`F`.
    pub overwrite: Option<bool>,
    /// Lock token covering the request URI (bare token, no angle brackets).
    pub lock_token: Option<String>,
    /// Lock token covering the destination of COPY/MOVE.
    pub destination_lock_token: Option<String>,
    pub content_type: Option<String>,
    pub body: Option<Vec<u8>>,
}

impl DavRequest {
    pub fn new(method: DavMethod, uri: Url) -> Self {
        Self {
            method,
            uri,
            depth: None,
            destination: None,
            overwrite: None,
            lock_token: None,
            destination_lock_token: None,
            content_type: None,
            body: None,
        }
    }
}

/// Raw response from a WebDAV server: status, headers, undecoded body.
#[derive(Debug, Clone)]
pub struct DavResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

/// Raw exchange with a WebDAV server.
///
/// Implementations render the protocol headers from the typed request fields
/// and report network failures as `DavError::Transport`. They never interpret
/// response bodies.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: DavRequest) -> Result<DavResponse, DavError>;
}
