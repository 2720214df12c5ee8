//! Translation of multistatus responses into directory listings.

use chrono::{DateTime, Utc};
use dav_session_core::xml::{Multistatus, Propstat};
use dav_session_core::{DavError, ResourceEntry};
use url::Url;

use crate::resolver;

/// Decode a raw multistatus body.
pub fn deserialize_multistatus(body: &[u8]) -> Result<Multistatus, DavError> {
    let text = String::from_utf8_lossy(body);
    quick_xml::de::from_str(&text).map_err(|e| DavError::Xml(e.to_string()))
}

/// Convert a parsed multistatus into listing entries, children only, in
/// server order.
///
/// The response item describing the queried collection itself is dropped, as
/// are hidden items and items without a successful propstat block. A
/// property that is present but unparsable (size, timestamps) fails the
/// whole call; it means the server response is malformed and a partial
/// listing would hide that.
pub fn translate(
    collection: &Url,
    multistatus: &Multistatus,
) -> Result<Vec<ResourceEntry>, DavError> {
    let collection_key = resolver::add_trailing_slash(collection.as_str());
    let mut entries = Vec::with_capacity(multistatus.response.len());

    for item in &multistatus.response {
        let uri = resolver::absolute_uri(Some(collection), &item.href)?;

        if resolver::add_trailing_slash(uri.as_str()) == collection_key {
            continue;
        }

        let Some(propstat) = successful_propstat(&item.propstat) else {
            continue;
        };
        let prop = &propstat.prop;

        if matches!(prop.ishidden.as_deref(), Some("1") | Some("true")) {
            continue;
        }

        // Naming priority: displayname, name property, last path segment.
        let name = non_empty(&prop.displayname)
            .or_else(|| non_empty(&prop.name))
            .map(str::to_string)
            .unwrap_or_else(|| last_segment(&uri));

        let is_collection = prop
            .resourcetype
            .as_ref()
            .is_some_and(|resourcetype| resourcetype.is_collection());

        let size = non_empty(&prop.getcontentlength)
            .map(|raw| {
                raw.parse::<i64>().map_err(|_| {
                    DavError::MalformedProperty(format!(
                        "getcontentlength '{raw}' is not an integer"
                    ))
                })
            })
            .transpose()?;

        let created = non_empty(&prop.creationdate)
            .map(|raw| parse_timestamp("creationdate", raw))
            .transpose()?;
        let modified = non_empty(&prop.getlastmodified)
            .map(|raw| parse_timestamp("getlastmodified", raw))
            .transpose()?;

        entries.push(ResourceEntry {
            uri,
            name,
            is_collection,
            content_type: non_empty(&prop.getcontenttype).map(str::to_string),
            size,
            created,
            modified,
        });
    }

    Ok(entries)
}

/// The first propstat whose status line reports success. A missing status
/// counts as success; servers put requested-but-absent properties in a
/// separate propstat with a 404 status.
fn successful_propstat(blocks: &[Propstat]) -> Option<&Propstat> {
    blocks.iter().find(|propstat| match &propstat.status {
        Some(line) => status_code(line).is_some_and(|code| (200..300).contains(&code)),
        None => true,
    })
}

/// Numeric code of a status line such as `HTTP/1.1 200 OK`.
fn status_code(line: &str) -> Option<u16> {
    line.split_whitespace().nth(1)?.parse().ok()
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn last_segment(uri: &Url) -> String {
    uri.path()
        .split('/')
        .rev()
        .find(|segment| !segment.is_empty())
        .unwrap_or_else(|| uri.as_str())
        .to_string()
}

/// WebDAV servers emit RFC 3339 for `creationdate` and RFC 2822 for
/// `getlastmodified`; accept either for both.
fn parse_timestamp(property: &str, raw: &str) -> Result<DateTime<Utc>, DavError> {
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_rfc2822(raw))
        .map(|timestamp| timestamp.with_timezone(&Utc))
        .map_err(|_| {
            DavError::MalformedProperty(format!("{property} '{raw}' is not a valid timestamp"))
        })
}
