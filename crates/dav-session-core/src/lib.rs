//! Core traits and types for the dav-session WebDAV client.
//!
//! This crate defines the contracts shared between the session layer and its
//! transport implementations:
//! - `Transport`: raw request/response exchange with a WebDAV server
//! - `DavError`: the error taxonomy surfaced by every session operation
//! - `ResourceEntry` / `LockEntry`: the records the session produces and tracks
//! - `xml`: parsed forms of the WebDAV XML bodies (multistatus, lockdiscovery)

mod error;
mod resource;
mod transport;
pub mod xml;

pub use error::{DavError, Result};
pub use resource::{LockEntry, ResourceEntry};
pub use transport::{DavMethod, DavRequest, DavResponse, Depth, Transport};
