//! WebDAV client session layer.
//!
//! A resource-oriented API (list, upload, download, lock, unlock, delete,
//! mkcol, copy, move) over a raw HTTP transport, with two jobs handled
//! transparently for the caller:
//! - lock affinity: locks acquired through the session are tracked per
//!   subtree, the matching token rides along on every mutating call that
//!   targets a locked subtree, and everything still held is released at
//!   session close
//! - URI normalization: relative URIs resolve against the session base,
//!   duplicate slashes collapse, and collections get their trailing slash
//!
//! ```no_run
//! use dav_session::{Credentials, WebDavSession};
//!
//! # async fn demo() -> Result<(), dav_session::DavError> {
//! let session = WebDavSession::connect_with_credentials(
//!     "http://www.myserver.com/webdav/",
//!     Credentials::new("user", "secret"),
//! )?;
//!
//! session.lock("shared/").await?;
//! // No token handling here: the session attaches it.
//! session.upload("shared/report.txt", Some("text/plain"), b"hi".to_vec()).await?;
//!
//! for entry in session.list("shared/").await? {
//!     println!("{} ({})", entry.name, entry.uri);
//! }
//!
//! // Releases every lock still held.
//! session.close().await;
//! # Ok(())
//! # }
//! ```

mod listing;
mod registry;
mod resolver;
mod session;
mod transport;

pub use dav_session_core::{
    xml, DavError, DavMethod, DavRequest, DavResponse, Depth, LockEntry, ResourceEntry, Transport,
};
pub use listing::{deserialize_multistatus, translate};
pub use registry::LockRegistry;
pub use resolver::{
    absolute_uri, absolute_uri_with_trailing_slash, add_trailing_slash, ensure_trailing_slash,
    is_ancestor_or_self, CollectionInference,
};
pub use session::WebDavSession;
pub use transport::{Credentials, ReqwestTransport};
