//! Parsed forms of the WebDAV XML bodies the session consumes.
//!
//! These mirror the `DAV:` element trees of RFC 4918: `multistatus` for
//! PROPFIND responses and `prop`/`lockdiscovery` for LOCK responses. Fields
//! keep the lowercase element names so the serde deserializer maps them
//! directly; property values stay `String` because WebDAV transmits
//! everything as text and the translator owns the parsing rules.

use serde::Deserialize;

/// A `multistatus` response: one `response` element per resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Multistatus {
    pub response: Vec<ResponseItem>,
}

/// One `response` element: an href plus its property-result blocks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ResponseItem {
    pub href: String,
    pub propstat: Vec<Propstat>,
}

/// A `propstat` block: a set of properties and the status that applies to
/// them. The status line is kept verbatim (`HTTP/1.1 200 OK`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Propstat {
    pub status: Option<String>,
    pub prop: Prop,
}

/// The property values of one `prop` element.
///
/// Covers the named properties the session requests for listings plus the
/// `lockdiscovery` returned by LOCK. Absent and empty elements both mean
/// "no value" to the translator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Prop {
    pub displayname: Option<String>,
    pub name: Option<String>,
    pub ishidden: Option<String>,
    pub getcontenttype: Option<String>,
    pub creationdate: Option<String>,
    pub getlastmodified: Option<String>,
    pub getcontentlength: Option<String>,
    pub resourcetype: Option<ResourceTypeProp>,
    pub lockdiscovery: Option<LockDiscovery>,
}

/// The `resourcetype` property. A resource is a collection iff the element
/// contains a `collection` marker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ResourceTypeProp {
    #[serde(rename = "$value")]
    pub value: Option<ResourceTypeValue>,
}

impl ResourceTypeProp {
    pub fn is_collection(&self) -> bool {
        self.value == Some(ResourceTypeValue::Collection)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceTypeValue {
    Collection,
    #[serde(other)]
    Other,
}

/// The `lockdiscovery` property: the active locks on a resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LockDiscovery {
    pub activelock: Vec<ActiveLock>,
}

/// One `activelock` element of a lockdiscovery.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ActiveLock {
    pub locktoken: Option<HrefValue>,
    pub lockroot: Option<HrefValue>,
    pub depth: Option<String>,
    pub timeout: Option<String>,
}

/// An element wrapping a single `href`, as used by `locktoken`/`lockroot`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HrefValue {
    pub href: String,
}

#[cfg(test)]
mod tests {
    use quick_xml::de::from_str;

    use super::*;

    #[test]
    fn test_propstat_collection() {
        let xml = r#"<D:propstat>
            <D:prop>
                <D:displayname>testdir</D:displayname>
                <D:getlastmodified>Tue, 01 May 2022 06:39:47 GMT</D:getlastmodified>
                <D:resourcetype><D:collection/></D:resourcetype>
            </D:prop>
            <D:status>HTTP/1.1 200 OK</D:status>
        </D:propstat>"#;

        let propstat = from_str::<Propstat>(xml).unwrap();
        assert_eq!(propstat.prop.displayname.as_deref(), Some("testdir"));
        assert!(propstat.prop.resourcetype.unwrap().is_collection());
        assert_eq!(propstat.status.as_deref(), Some("HTTP/1.1 200 OK"));
    }

    #[test]
    fn test_response_file() {
        let xml = r#"<D:response>
            <D:href>/test/file.txt</D:href>
            <D:propstat>
                <D:prop>
                    <D:displayname>file.txt</D:displayname>
                    <D:getcontentlength>42</D:getcontentlength>
                    <D:getcontenttype>text/plain</D:getcontenttype>
                    <D:resourcetype></D:resourcetype>
                </D:prop>
                <D:status>HTTP/1.1 200 OK</D:status>
            </D:propstat>
        </D:response>"#;

        let response = from_str::<ResponseItem>(xml).unwrap();
        assert_eq!(response.href, "/test/file.txt");
        assert_eq!(response.propstat.len(), 1);

        let prop = &response.propstat[0].prop;
        assert_eq!(prop.getcontentlength.as_deref(), Some("42"));
        assert_eq!(prop.getcontenttype.as_deref(), Some("text/plain"));
        assert!(!prop.resourcetype.as_ref().unwrap().is_collection());
    }

    #[test]
    fn test_multistatus_mixed_items() {
        let xml = r#"<?xml version="1.0" encoding="utf-8"?>
        <D:multistatus xmlns:D="DAV:">
          <D:response>
            <D:href>/webdav/</D:href>
            <D:propstat>
              <D:prop>
                <D:getlastmodified>Fri, 17 Feb 2023 03:37:22 GMT</D:getlastmodified>
                <D:resourcetype><D:collection /></D:resourcetype>
              </D:prop>
              <D:status>HTTP/1.1 200 OK</D:status>
            </D:propstat>
          </D:response>
          <D:response>
            <D:href>/webdav/notes.txt</D:href>
            <D:propstat>
              <D:prop>
                <D:getcontentlength>1</D:getcontentlength>
                <D:getlastmodified>Fri, 17 Feb 2023 03:36:54 GMT</D:getlastmodified>
                <D:resourcetype></D:resourcetype>
              </D:prop>
              <D:status>HTTP/1.1 200 OK</D:status>
            </D:propstat>
          </D:response>
        </D:multistatus>"#;

        let multistatus = from_str::<Multistatus>(xml).unwrap();
        assert_eq!(multistatus.response.len(), 2);
        assert_eq!(multistatus.response[0].href, "/webdav/");
        assert_eq!(multistatus.response[1].href, "/webdav/notes.txt");
    }

    #[test]
    fn test_multiple_propstat_blocks() {
        // Servers report requested-but-missing properties in a separate
        // propstat with a 404 status.
        let xml = r#"<D:response>
            <D:href>/webdav/file.txt</D:href>
            <D:propstat>
                <D:prop><D:displayname>file.txt</D:displayname></D:prop>
                <D:status>HTTP/1.1 200 OK</D:status>
            </D:propstat>
            <D:propstat>
                <D:prop><D:ishidden/></D:prop>
                <D:status>HTTP/1.1 404 Not Found</D:status>
            </D:propstat>
        </D:response>"#;

        let response = from_str::<ResponseItem>(xml).unwrap();
        assert_eq!(response.propstat.len(), 2);
        assert_eq!(
            response.propstat[1].status.as_deref(),
            Some("HTTP/1.1 404 Not Found")
        );
    }

    #[test]
    fn test_lockdiscovery_prop() {
        let xml = r#"<D:prop xmlns:D="DAV:">
            <D:lockdiscovery>
                <D:activelock>
                    <D:locktype><D:write/></D:locktype>
                    <D:lockscope><D:exclusive/></D:lockscope>
                    <D:depth>infinity</D:depth>
                    <D:timeout>Second-604800</D:timeout>
                    <D:locktoken>
                        <D:href>urn:uuid:e71d4fae-5dec-22d6-fea5-00a0c91e6be4</D:href>
                    </D:locktoken>
                    <D:lockroot>
                        <D:href>http://example.com/workspace/webdav/</D:href>
                    </D:lockroot>
                </D:activelock>
            </D:lockdiscovery>
        </D:prop>"#;

        let prop = from_str::<Prop>(xml).unwrap();
        let discovery = prop.lockdiscovery.unwrap();
        assert_eq!(discovery.activelock.len(), 1);

        let active = &discovery.activelock[0];
        assert_eq!(
            active.locktoken.as_ref().unwrap().href,
            "urn:uuid:e71d4fae-5dec-22d6-fea5-00a0c91e6be4"
        );
        assert_eq!(active.depth.as_deref(), Some("infinity"));
    }
}
