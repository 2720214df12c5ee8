//! Records produced and tracked by a WebDAV session.

use chrono::{DateTime, Utc};
use serde::Serialize;
use url::Url;

/// One row of a directory listing.
///
/// Produced per multistatus response item; ownership passes to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct ResourceEntry {
    /// Absolute URI of the resource.
    pub uri: Url,
    /// Display name. Resolution priority: displayname property, name
    /// property, last non-empty path segment of the href. Never empty.
    pub name: String,
    /// Whether the resource is a collection (directory).
    pub is_collection: bool,
    pub content_type: Option<String>,
    /// Size in bytes (files only; servers omit it for collections).
    pub size: Option<i64>,
    pub created: Option<DateTime<Utc>>,
    pub modified: Option<DateTime<Utc>>,
}

/// One lock held by a session.
///
/// At most one entry exists per normalized lock root; the registry keys on
/// the root. Entries live from a successful LOCK response until UNLOCK or
/// session close.
#[derive(Debug, Clone)]
pub struct LockEntry {
    /// Normalized absolute URI of the locked resource, with a trailing slash
    /// when it denotes a collection.
    pub root: Url,
    /// Opaque token returned by the server, without angle brackets.
    pub token: String,
}
