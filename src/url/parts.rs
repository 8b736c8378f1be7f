use crate::{UrlError, UrlResult};
use url::Url;

/// An absolute URL split into the pieces the database keys on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlParts {
    /// Lower-cased scheme, e.g. `http`
    pub scheme: String,
    /// Lower-cased host; `localhost` for `file:` URLs
    pub host: String,
    /// Explicit port, or 0 when the URL carries none (or the scheme default)
    pub port: u16,
    /// Path plus query, always starting with `/`
    pub path: String,
    /// Fragment identifier, without the `#`
    pub fragment: Option<String>,
    /// Canonical absolute URL without its fragment
    pub url: String,
}

impl UrlParts {
    /// Path without its query string
    pub fn path_only(&self) -> &str {
        match self.path.find('?') {
            Some(q) => &self.path[..q],
            None => &self.path,
        }
    }
}

/// Decomposes an absolute URL into scheme, host, port, path and fragment
///
/// The URL must carry an authority component (`scheme://...`); forms such as
/// `http:example.org` that lenient parsers accept are rejected. `file:` URLs
/// have no real host, so their host is reported as `localhost`.
///
/// # Examples
///
/// ```
/// use urldb::url::decompose_url;
///
/// let parts = decompose_url("http://WWW.Example.org:8080/a/b?q=1#top").unwrap();
/// assert_eq!(parts.scheme, "http");
/// assert_eq!(parts.host, "www.example.org");
/// assert_eq!(parts.port, 8080);
/// assert_eq!(parts.path, "/a/b?q=1");
/// assert_eq!(parts.fragment.as_deref(), Some("top"));
/// assert_eq!(parts.url, "http://www.example.org:8080/a/b?q=1");
/// ```
pub fn decompose_url(input: &str) -> UrlResult<UrlParts> {
    let input = input.trim();

    let colon = input
        .find(':')
        .ok_or_else(|| UrlError::InvalidScheme(input.to_string()))?;
    let scheme = &input[..colon];
    if !is_valid_scheme(scheme) {
        return Err(UrlError::InvalidScheme(input.to_string()));
    }
    if !input[colon..].starts_with("://") {
        return Err(UrlError::MissingAuthority(input.to_string()));
    }

    let mut url = Url::parse(input).map_err(|e| UrlError::Parse(e.to_string()))?;

    let scheme = url.scheme().to_string();
    let host = if scheme == "file" {
        "localhost".to_string()
    } else {
        match url.host_str() {
            Some(h) if !h.is_empty() => h.to_lowercase(),
            _ => return Err(UrlError::MissingHost(input.to_string())),
        }
    };

    let port = url.port().unwrap_or(0);

    let mut path = url.path().to_string();
    if !path.starts_with('/') {
        path.insert(0, '/');
    }
    if let Some(query) = url.query() {
        path.push('?');
        path.push_str(query);
    }

    let fragment = url
        .fragment()
        .filter(|f| !f.is_empty())
        .map(|f| f.to_string());

    url.set_fragment(None);

    Ok(UrlParts {
        scheme,
        host,
        port,
        path,
        fragment,
        url: url.to_string(),
    })
}

fn is_valid_scheme(scheme: &str) -> bool {
    let mut chars = scheme.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '-' || c == '.')
}
