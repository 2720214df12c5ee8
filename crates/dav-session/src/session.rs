//! The session façade: resource-oriented WebDAV operations over a raw
//! transport, with transparent lock handling.

use std::sync::Arc;

use dav_session_core::xml::Prop;
use dav_session_core::{
    DavError, DavMethod, DavRequest, DavResponse, Depth, ResourceEntry, Transport,
};
use http::StatusCode;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::listing;
use crate::registry::LockRegistry;
use crate::resolver::{self, CollectionInference};
use crate::transport::{Credentials, ReqwestTransport};

/// PROPFIND body naming the listing properties. Some servers return
/// unusable results for `allprop`, so the properties are spelled out.
const PROPFIND_LISTING: &str = r#"<?xml version="1.0" encoding="utf-8"?><D:propfind xmlns:D="DAV:"><D:prop><D:ishidden/><D:displayname/><D:name/><D:getcontenttype/><D:creationdate/><D:resourcetype/><D:getlastmodified/><D:getcontentlength/></D:prop></D:propfind>"#;

/// LOCK body requesting an exclusive write lock.
const LOCK_REQUEST: &str = r#"<?xml version="1.0" encoding="utf-8"?><D:lockinfo xmlns:D="DAV:"><D:lockscope><D:exclusive/></D:lockscope><D:locktype><D:write/></D:locktype><D:owner><D:href>dav-session</D:href></D:owner></D:lockinfo>"#;

/// A WebDAV client session.
///
/// Operations take URIs relative to the session base (or absolute URIs when
/// no base is configured). Locks acquired through [`WebDavSession::lock`]
/// are tracked per session: any later mutating call whose target falls
/// inside a locked subtree carries the matching token automatically, and
/// [`WebDavSession::close`] releases everything still held.
///
/// Any number of operations may be in flight concurrently against one
/// session; the lock registry is the only shared state and every registry
/// operation is atomic.
pub struct WebDavSession {
    transport: Arc<dyn Transport>,
    base: Option<Url>,
    locks: LockRegistry,
    inference: CollectionInference,
}

impl WebDavSession {
    /// Create a session over an existing transport.
    pub fn new(transport: Arc<dyn Transport>, base: Option<Url>) -> Self {
        Self {
            transport,
            base,
            locks: LockRegistry::new(),
            inference: CollectionInference::default(),
        }
    }

    /// Create a session over a reqwest transport without credentials.
    pub fn connect(base_url: &str) -> Result<Self, DavError> {
        let base = parse_base(base_url)?;
        Ok(Self::new(Arc::new(ReqwestTransport::new(None)), Some(base)))
    }

    /// Create a session over a reqwest transport with basic-auth
    /// credentials.
    pub fn connect_with_credentials(
        base_url: &str,
        credentials: Credentials,
    ) -> Result<Self, DavError> {
        let base = parse_base(base_url)?;
        Ok(Self::new(
            Arc::new(ReqwestTransport::new(Some(credentials))),
            Some(base),
        ))
    }

    /// Override the collection-inference policy used during URI
    /// normalization.
    pub fn with_collection_inference(mut self, inference: CollectionInference) -> Self {
        self.inference = inference;
        self
    }

    /// List the resources inside the collection at `uri`, children only, in
    /// server order.
    #[instrument(skip(self), level = "debug")]
    pub async fn list(&self, uri: &str) -> Result<Vec<ResourceEntry>, DavError> {
        let collection = self.resolve(uri)?;

        let mut request = DavRequest::new(DavMethod::Propfind, collection.clone());
        request.depth = Some(Depth::One);
        request.content_type = Some("application/xml".to_string());
        request.body = Some(PROPFIND_LISTING.as_bytes().to_vec());

        let response = self.transport.send(request).await?;
        if response.status != StatusCode::MULTI_STATUS {
            return Err(DavError::UnexpectedStatus {
                operation: "list",
                expected: "207 Multi-Status",
                actual: response.status,
            });
        }

        let multistatus = listing::deserialize_multistatus(&response.body)?;
        let entries = listing::translate(&collection, &multistatus)?;
        debug!("listed {} entries under {collection}", entries.len());
        Ok(entries)
    }

    /// Download the file at `uri`.
    #[instrument(skip(self), level = "debug")]
    pub async fn download(&self, uri: &str) -> Result<Vec<u8>, DavError> {
        let target = self.resolve(uri)?;
        let response = self
            .transport
            .send(DavRequest::new(DavMethod::Get, target.clone()))
            .await?;

        if !response.status.is_success() {
            return Err(DavError::UnexpectedStatus {
                operation: "download",
                expected: "2xx",
                actual: response.status,
            });
        }
        debug!("downloaded {} bytes from {target}", response.body.len());
        Ok(response.body)
    }

    /// Upload `body` to `uri`, attaching lock affinity when the target lies
    /// inside a locked subtree.
    #[instrument(skip(self, body), level = "debug", fields(body_len = body.len()))]
    pub async fn upload(
        &self,
        uri: &str,
        content_type: Option<&str>,
        body: Vec<u8>,
    ) -> Result<(), DavError> {
        let target = self.resolve(uri)?;
        let mut request = DavRequest::new(DavMethod::Put, target);
        request.content_type = content_type.map(str::to_string);
        request.body = Some(body);
        self.send_mutating("upload", request).await
    }

    /// Delete the resource at `uri`.
    #[instrument(skip(self), level = "debug")]
    pub async fn delete(&self, uri: &str) -> Result<(), DavError> {
        let target = self.resolve(uri)?;
        self.send_mutating("delete", DavRequest::new(DavMethod::Delete, target))
            .await
    }

    /// Create the collection at `uri` (MKCOL).
    #[instrument(skip(self), level = "debug")]
    pub async fn create_directory(&self, uri: &str) -> Result<(), DavError> {
        let target = resolver::absolute_uri_with_trailing_slash(self.base.as_ref(), uri)?;
        self.send_mutating("create_directory", DavRequest::new(DavMethod::Mkcol, target))
            .await
    }

    /// Copy the resource at `from` to `to`.
    #[instrument(skip(self), level = "debug")]
    pub async fn copy(&self, from: &str, to: &str, overwrite: bool) -> Result<(), DavError> {
        let source = self.resolve(from)?;
        let destination = self.resolve(to)?;

        let mut request = DavRequest::new(DavMethod::Copy, source);
        request.destination = Some(destination);
        request.overwrite = Some(overwrite);
        self.send_mutating("copy", request).await
    }

    /// Move the resource at `from` to `to`.
    #[instrument(skip(self), level = "debug")]
    pub async fn mv(&self, from: &str, to: &str, overwrite: bool) -> Result<(), DavError> {
        let source = self.resolve(from)?;
        let destination = self.resolve(to)?;

        let mut request = DavRequest::new(DavMethod::Move, source);
        request.destination = Some(destination);
        request.overwrite = Some(overwrite);
        self.send_mutating("mv", request).await
    }

    /// Whether a resource exists at `uri` (PROPFIND depth 0; 404 means no).
    #[instrument(skip(self), level = "debug")]
    pub async fn exists(&self, uri: &str) -> Result<bool, DavError> {
        let target = self.resolve(uri)?;
        let mut request = DavRequest::new(DavMethod::Propfind, target);
        request.depth = Some(Depth::Zero);
        request.content_type = Some("application/xml".to_string());
        request.body = Some(PROPFIND_LISTING.as_bytes().to_vec());

        let response = self.transport.send(request).await?;
        if response.status == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        if response.status.is_success() {
            return Ok(true);
        }
        Err(DavError::UnexpectedStatus {
            operation: "exists",
            expected: "207 Multi-Status or 404",
            actual: response.status,
        })
    }

    /// Acquire an exclusive infinite-depth write lock on `uri` and track it
    /// for the lifetime of the session.
    ///
    /// Nothing is recorded unless the server reports success and returns a
    /// token, so an acquisition abandoned mid-flight leaves no state behind.
    #[instrument(skip(self), level = "debug")]
    pub async fn lock(&self, uri: &str) -> Result<(), DavError> {
        let root = self.resolve(uri)?;

        let mut request = DavRequest::new(DavMethod::Lock, root.clone());
        request.depth = Some(Depth::Infinity);
        request.content_type = Some("application/xml".to_string());
        request.body = Some(LOCK_REQUEST.as_bytes().to_vec());

        let response = self.transport.send(request).await?;
        if !response.status.is_success() {
            return Err(DavError::UnexpectedStatus {
                operation: "lock",
                expected: "2xx",
                actual: response.status,
            });
        }

        let token = extract_lock_token(&response)?;
        debug!("locked {root}");
        self.locks.add(root, token);
        Ok(())
    }

    /// Release the lock rooted at `uri`. Returns `false` when no lock was
    /// tracked for that root.
    ///
    /// The registry entry is removed before the UNLOCK request goes out, so
    /// a failed UNLOCK never leaves a stale token that later mutating calls
    /// would keep attaching.
    #[instrument(skip(self), level = "debug")]
    pub async fn unlock(&self, uri: &str) -> Result<bool, DavError> {
        let root = self.resolve(uri)?;
        let Some(entry) = self.locks.remove(&root) else {
            return Ok(false);
        };

        let mut request = DavRequest::new(DavMethod::Unlock, entry.root);
        request.lock_token = Some(entry.token);

        let response = self.transport.send(request).await?;
        if !response.status.is_success() {
            return Err(DavError::UnexpectedStatus {
                operation: "unlock",
                expected: "2xx",
                actual: response.status,
            });
        }
        debug!("unlocked {root}");
        Ok(true)
    }

    /// Release every lock still held by this session, best-effort.
    ///
    /// Individual UNLOCK failures are logged and swallowed; the registry is
    /// empty when this returns.
    #[instrument(skip(self))]
    pub async fn close(&self) {
        for entry in self.locks.drain() {
            let mut request = DavRequest::new(DavMethod::Unlock, entry.root.clone());
            request.lock_token = Some(entry.token);

            match self.transport.send(request).await {
                Ok(response) if response.status.is_success() => {
                    debug!("released lock on {}", entry.root);
                }
                Ok(response) => warn!(
                    "unlocking {} during session close returned {}",
                    entry.root, response.status
                ),
                Err(e) => warn!("unlocking {} during session close failed: {e}", entry.root),
            }
        }
    }

    /// Normalize a caller-supplied URI against the session base and the
    /// collection-inference policy.
    fn resolve(&self, uri: &str) -> Result<Url, DavError> {
        let absolute = resolver::absolute_uri(self.base.as_ref(), uri)?;
        resolver::apply_inference(absolute, self.inference)
    }

    /// Attach lock affinity and dispatch a mutating request, requiring a
    /// success status.
    async fn send_mutating(
        &self,
        operation: &'static str,
        mut request: DavRequest,
    ) -> Result<(), DavError> {
        // COPY leaves the source untouched; only the destination needs a
        // token.
        if request.method != DavMethod::Copy {
            if let Some(lock) = self.locks.find_covering(&request.uri) {
                debug!("attaching lock token for {} (root {})", request.uri, lock.root);
                request.lock_token = Some(lock.token);
            }
        }
        if let Some(destination) = &request.destination {
            if let Some(lock) = self.locks.find_covering(destination) {
                request.destination_lock_token = Some(lock.token);
            }
        }

        let response = self.transport.send(request).await?;
        if !response.status.is_success() {
            return Err(DavError::UnexpectedStatus {
                operation,
                expected: "2xx",
                actual: response.status,
            });
        }
        Ok(())
    }
}

impl Drop for WebDavSession {
    fn drop(&mut self) {
        let held = self.locks.len();
        if held > 0 {
            warn!("session dropped with {held} lock(s) still held; call close() to release them");
        }
    }
}

fn parse_base(base_url: &str) -> Result<Url, DavError> {
    Url::parse(base_url).map_err(|e| DavError::InvalidUri(format!("'{base_url}': {e}")))
}

/// Pull the lock token out of a LOCK response: the `Lock-Token` header when
/// present, otherwise the lockdiscovery body.
fn extract_lock_token(response: &DavResponse) -> Result<String, DavError> {
    if let Some(value) = response.headers.get("Lock-Token") {
        if let Ok(text) = value.to_str() {
            return Ok(strip_token_brackets(text));
        }
    }

    let text = String::from_utf8_lossy(&response.body);
    let prop: Prop = quick_xml::de::from_str(&text).map_err(|e| DavError::Xml(e.to_string()))?;
    prop.lockdiscovery
        .as_ref()
        .and_then(|discovery| discovery.activelock.first())
        .and_then(|active| active.locktoken.as_ref())
        .map(|token| strip_token_brackets(&token.href))
        .ok_or_else(|| {
            DavError::MalformedProperty("lock response carries no lock token".to_string())
        })
}

/// Lock tokens travel as `<urn:uuid:...>` in headers but bare in bodies;
/// the registry stores the bare form.
fn strip_token_brackets(raw: &str) -> String {
    raw.trim()
        .trim_start_matches('<')
        .trim_end_matches('>')
        .to_string()
}
