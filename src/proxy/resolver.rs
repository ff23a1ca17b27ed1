//! Reference resolution against the URL a playlist was fetched from.

use url::Url;

/// Resolution context derived once per fetched playlist.
///
/// Invariant: `directory_path` always starts and ends with `/`, so
/// path-relative joins never produce double slashes.
#[derive(Clone, Debug, PartialEq)]
pub struct BaseContext {
    /// `scheme://host[:port]` of the source URL
    pub origin: String,
    /// Source URL path with the trailing filename segment removed
    pub directory_path: String,
}

impl BaseContext {
    /// Derive the resolution context from the URL the playlist came from.
    ///
    /// A source URL that does not parse falls back to a context that treats
    /// the raw string as the origin — resolution stays total either way.
    pub fn from_source_url(source_url: &str) -> Self {
        match Url::parse(source_url) {
            Ok(url) => {
                let host = url.host_str().unwrap_or("");
                let origin = match url.port() {
                    Some(port) => format!("{}://{}:{}", url.scheme(), host, port),
                    None => format!("{}://{}", url.scheme(), host),
                };
                let path = url.path();
                let directory_path = match path.rfind('/') {
                    Some(idx) => path[..=idx].to_string(),
                    None => "/".to_string(),
                };
                Self {
                    origin,
                    directory_path,
                }
            }
            Err(_) => Self {
                origin: source_url.to_string(),
                directory_path: "/".to_string(),
            },
        }
    }

    /// Scheme of the source URL, used for scheme-relative references.
    fn scheme(&self) -> &str {
        self.origin.split("://").next().unwrap_or("https")
    }
}

/// Resolve a raw playlist reference into a fully-qualified upstream URL.
///
/// Pure and total: malformed input is treated as a relative path segment
/// rather than rejected. Rules are checked in order:
/// already-absolute, scheme-relative, root-relative, path-relative.
/// No `..` normalization is performed.
pub fn resolve(base: &BaseContext, reference: &str) -> String {
    if reference.starts_with("http://") || reference.starts_with("https://") {
        return reference.to_string();
    }

    if let Some(rest) = reference.strip_prefix("//") {
        return format!("{}://{}", base.scheme(), rest);
    }

    if reference.starts_with('/') {
        return format!("{}{}", base.origin, reference);
    }

    format!("{}{}{}", base.origin, base.directory_path, reference)
}
