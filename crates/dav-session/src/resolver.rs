//! URI normalization and containment tests.
//!
//! Pure functions, no state. Everything else in the session builds on these:
//! the registry uses the containment test for lock affinity, the translator
//! uses the resolution helpers for href handling, and the session normalizes
//! every caller-supplied URI through here before it reaches the wire.

use dav_session_core::DavError;
use url::Url;

/// Policy deciding when a URI of unknown kind denotes a collection and
/// receives a trailing slash during normalization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CollectionInference {
    /// A last path segment without a dot extension denotes a collection;
    /// segments like `report.txt` are left untouched.
    #[default]
    DotExtension,
    /// Every normalized URI receives a trailing slash.
    AlwaysCollection,
    /// Paths are left exactly as the caller wrote them.
    NeverInfer,
}

/// Ensure exactly one trailing slash after the path, collapsing any run of
/// slashes to one along the way.
///
/// A URI that does not already end in a slash and whose last segment carries
/// a dot extension is taken to address a file and is returned without a
/// trailing slash. Works on absolute URIs and bare paths alike.
pub fn add_trailing_slash(uri: &str) -> String {
    // Query and fragment pass through untouched.
    let (head, tail) = match uri.find(['?', '#']) {
        Some(idx) => uri.split_at(idx),
        None => (uri, ""),
    };

    // Split scheme://authority off so authority dots and slashes never feed
    // the path heuristics.
    let (prefix, path) = match head.find("://") {
        Some(scheme_end) => {
            let authority_start = scheme_end + 3;
            match head[authority_start..].find('/') {
                Some(rel) => head.split_at(authority_start + rel),
                None => (head, ""),
            }
        }
        None => ("", head),
    };

    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let leading = if !prefix.is_empty() || path.starts_with('/') {
        "/"
    } else {
        ""
    };

    // The dot heuristic only decides whether to append; an existing trailing
    // slash always survives.
    let is_leaf = !path.ends_with('/')
        && segments.last().is_some_and(|segment| segment.contains('.'));

    let mut rebuilt = format!("{prefix}{leading}{}", segments.join("/"));
    if !is_leaf && !rebuilt.ends_with('/') {
        rebuilt.push('/');
    }
    rebuilt.push_str(tail);
    rebuilt
}

/// Resolve `candidate` to an absolute URI.
///
/// An absolute candidate is returned as parsed, even when it repeats the
/// base's path. A relative candidate is joined against `base`; passing a
/// relative candidate without a base is an argument error, surfaced before
/// any network call. Duplicate slashes in the resulting path collapse to one.
pub fn absolute_uri(base: Option<&Url>, candidate: &str) -> Result<Url, DavError> {
    if let Ok(absolute) = Url::parse(candidate) {
        return Ok(collapse_path(absolute));
    }

    let base = base.ok_or_else(|| {
        DavError::InvalidUri(format!(
            "relative URI '{candidate}' requires a session base URI"
        ))
    })?;

    let joined = base.join(candidate).map_err(|e| {
        DavError::InvalidUri(format!("cannot resolve '{candidate}' against '{base}': {e}"))
    })?;
    Ok(collapse_path(joined))
}

/// Resolve, then ensure a single trailing slash (honoring the dot-extension
/// leaf heuristic).
pub fn absolute_uri_with_trailing_slash(
    base: Option<&Url>,
    candidate: &str,
) -> Result<Url, DavError> {
    let resolved = absolute_uri(base, candidate)?;
    ensure_trailing_slash(resolved)
}

/// Apply `add_trailing_slash` to an already-absolute URI.
pub fn ensure_trailing_slash(url: Url) -> Result<Url, DavError> {
    let normalized = add_trailing_slash(url.as_str());
    Url::parse(&normalized)
        .map_err(|e| DavError::InvalidUri(format!("'{normalized}': {e}")))
}

/// Normalize a resolved URI according to the collection-inference policy.
pub fn apply_inference(url: Url, inference: CollectionInference) -> Result<Url, DavError> {
    match inference {
        CollectionInference::DotExtension => ensure_trailing_slash(url),
        CollectionInference::AlwaysCollection => {
            let mut url = url;
            let mut path = url.path().to_string();
            if !path.ends_with('/') {
                path.push('/');
                url.set_path(&path);
            }
            Ok(url)
        }
        CollectionInference::NeverInfer => Ok(url),
    }
}

/// Segment-wise hierarchical containment: true when `root` and `target`
/// share scheme and authority and root's path segments are a prefix of
/// target's. Comparing segments rather than raw strings keeps `/foo` from
/// claiming `/fooBar`.
pub fn is_ancestor_or_self(root: &Url, target: &Url) -> bool {
    if root.scheme() != target.scheme()
        || root.host_str() != target.host_str()
        || root.port_or_known_default() != target.port_or_known_default()
    {
        return false;
    }

    let root_segments: Vec<&str> = path_segments(root);
    let target_segments: Vec<&str> = path_segments(target);

    target_segments.len() >= root_segments.len()
        && root_segments
            .iter()
            .zip(&target_segments)
            .all(|(a, b)| a == b)
}

/// Non-empty path segments of a URI.
pub fn path_segments(url: &Url) -> Vec<&str> {
    url.path().split('/').filter(|s| !s.is_empty()).collect()
}

fn collapse_path(mut url: Url) -> Url {
    let path = url.path();
    if path.contains("//") {
        let collapsed: String = {
            let mut out = String::with_capacity(path.len());
            let mut previous_slash = false;
            for c in path.chars() {
                if c == '/' {
                    if !previous_slash {
                        out.push(c);
                    }
                    previous_slash = true;
                } else {
                    out.push(c);
                    previous_slash = false;
                }
            }
            out
        };
        url.set_path(&collapsed);
    }
    url
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("http://www.example.de/test", "http://www.example.de/test/")]
    #[case("http://www.example.de/test/", "http://www.example.de/test/")]
    #[case("http://www.example.de//test//", "http://www.example.de/test/")]
    #[case("http://www.example.de/test/test.txt", "http://www.example.de/test/test.txt")]
    #[case("http://www.example.de", "http://www.example.de/")]
    #[case("/webdav/test", "/webdav/test/")]
    #[case("/webdav/v1.0/", "/webdav/v1.0/")]
    fn trailing_slash_cases(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(add_trailing_slash(input), expected);
    }

    #[test]
    fn trailing_slash_is_idempotent() {
        for uri in [
            "http://h/test",
            "http://h//test//",
            "http://h/test/file.txt",
            "/webdav/test",
        ] {
            let once = add_trailing_slash(uri);
            assert_eq!(add_trailing_slash(&once), once);
        }
    }

    #[test]
    fn absolute_uri_joins_relative_against_base() {
        let base = Url::parse("http://www.example.de/test/").unwrap();
        let combined = absolute_uri(Some(&base), "test2/").unwrap();
        assert_eq!(combined.as_str(), "http://www.example.de/test/test2/");
    }

    #[test]
    fn absolute_candidate_wins_unchanged() {
        let base = Url::parse("http://www.example.de/test/").unwrap();
        let combined = absolute_uri(Some(&base), "http://www.example.de/test/test2/").unwrap();
        assert_eq!(combined.as_str(), "http://www.example.de/test/test2/");
    }

    #[test]
    fn absolute_candidate_needs_no_base() {
        let combined = absolute_uri(None, "http://www.example.de/test/test2/").unwrap();
        assert_eq!(combined.as_str(), "http://www.example.de/test/test2/");
    }

    #[test]
    fn relative_candidate_without_base_is_an_error() {
        let err = absolute_uri(None, "test2/").unwrap_err();
        assert!(matches!(err, DavError::InvalidUri(_)));
    }

    #[test]
    fn resolve_with_trailing_slash_from_bare_host() {
        let base = Url::parse("http://www.example.de").unwrap();
        let combined = absolute_uri_with_trailing_slash(Some(&base), "test2").unwrap();
        assert_eq!(combined.as_str(), "http://www.example.de/test2/");
    }

    #[test]
    fn resolve_collapses_duplicate_slashes_on_both_sides() {
        let base = Url::parse("http://www.example.de//").unwrap();
        let combined = absolute_uri_with_trailing_slash(Some(&base), "/test2//").unwrap();
        assert_eq!(combined.as_str(), "http://www.example.de/test2/");
    }

    #[rstest]
    #[case("http://h/foo/", "http://h/foo/", true)]
    #[case("http://h/foo/", "http://h/foo/bar", true)]
    #[case("http://h/foo/", "http://h/fooBar", false)]
    #[case("http://h/foo/", "http://h/baz/foo", false)]
    #[case("http://h/foo/", "https://h/foo/bar", false)]
    #[case("http://h/foo/", "http://other/foo/bar", false)]
    fn containment_cases(#[case] root: &str, #[case] target: &str, #[case] expected: bool) {
        let root = Url::parse(root).unwrap();
        let target = Url::parse(target).unwrap();
        assert_eq!(is_ancestor_or_self(&root, &target), expected);
    }

    #[test]
    fn inference_policies() {
        let file = Url::parse("http://h/test/report.txt").unwrap();

        let inferred = apply_inference(file.clone(), CollectionInference::DotExtension).unwrap();
        assert_eq!(inferred.as_str(), "http://h/test/report.txt");

        let forced = apply_inference(file.clone(), CollectionInference::AlwaysCollection).unwrap();
        assert_eq!(forced.as_str(), "http://h/test/report.txt/");

        let untouched = apply_inference(file, CollectionInference::NeverInfer).unwrap();
        assert_eq!(untouched.as_str(), "http://h/test/report.txt");
    }
}
