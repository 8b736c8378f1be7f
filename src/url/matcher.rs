/// Checks if a host falls within a cookie domain
///
/// Two kinds of cookie domain are supported:
/// 1. Host cookie: "example.com" matches only "example.com"
/// 2. Domain cookie: ".example.com" matches:
///    - "example.com" (the bare domain)
///    - "www.example.com" (single subdomain)
///    - "a.b.example.com" (nested subdomains)
///
/// Both arguments are compared case-insensitively.
///
/// # Examples
///
/// ```
/// use urldb::url::domain_matches;
///
/// assert!(domain_matches("example.com", "example.com"));
/// assert!(!domain_matches("example.com", "www.example.com"));
///
/// assert!(domain_matches(".example.com", "example.com"));
/// assert!(domain_matches(".example.com", "foo.bar.example.com"));
/// assert!(!domain_matches(".example.com", "notexample.com"));
/// ```
pub fn domain_matches(cookie_domain: &str, host: &str) -> bool {
    let cookie_domain = cookie_domain.to_ascii_lowercase();
    let host = host.to_ascii_lowercase();

    if let Some(base) = cookie_domain.strip_prefix('.') {
        host == base || host.ends_with(&cookie_domain)
    } else {
        host == cookie_domain
    }
}

/// Checks if a cookie path applies to a request path
///
/// The request path must start with the cookie path, and the match must end
/// on a segment boundary: either the cookie path ends in `/`, the paths are
/// equal, or the next request character is `/`.
///
/// # Examples
///
/// ```
/// use urldb::url::path_matches;
///
/// assert!(path_matches("/", "/index.html"));
/// assert!(path_matches("/blah", "/blah/moose"));
/// assert!(path_matches("/index.cgi", "/index.cgi"));
/// assert!(!path_matches("/foo/index.html", "/foo/bar.html"));
/// assert!(!path_matches("/blah", "/blahblah"));
/// ```
pub fn path_matches(cookie_path: &str, request_path: &str) -> bool {
    if !request_path.starts_with(cookie_path) {
        return false;
    }

    cookie_path.ends_with('/')
        || request_path.len() == cookie_path.len()
        || request_path.as_bytes()[cookie_path.len()] == b'/'
}

/// Returns the directory part of a path, up to and including its last `/`
///
/// This is the default cookie path and the node that HTTP authentication
/// details are attached to.
pub fn directory_of(path: &str) -> &str {
    match path.rfind('/') {
        Some(pos) => &path[..=pos],
        None => "/",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_cookie_exact_match() {
        assert!(domain_matches("example.com", "example.com"));
        assert!(domain_matches("www.example.com", "WWW.EXAMPLE.COM"));
    }

    #[test]
    fn test_host_cookie_no_subdomain_match() {
        assert!(!domain_matches("example.com", "blog.example.com"));
        assert!(!domain_matches("blog.example.com", "example.com"));
    }

    #[test]
    fn test_domain_cookie_matches_bare_domain() {
        assert!(domain_matches(".example.com", "example.com"));
    }

    #[test]
    fn test_domain_cookie_matches_subdomains() {
        assert!(domain_matches(".example.com", "www.example.com"));
        assert!(domain_matches(".example.tld", "www.foo.example.tld"));
        assert!(domain_matches(".example.tld", "bar.example.tld"));
    }

    #[test]
    fn test_domain_cookie_no_partial_label_match() {
        assert!(!domain_matches(".example.com", "myexample.com"));
        assert!(!domain_matches(".example.com", "example.com.org"));
    }

    #[test]
    fn test_path_matches_directory() {
        assert!(path_matches("/foo/bar/baz/", "/foo/bar/baz/quux.htm"));
        assert!(!path_matches("/foo/bar/baz/", "/foo/bar/"));
    }

    #[test]
    fn test_path_matches_leaf() {
        assert!(path_matches("/foo/index.html", "/foo/index.html"));
        assert!(!path_matches("/index.html", "/index.htm"));
    }

    #[test]
    fn test_directory_of() {
        assert_eq!(directory_of("/foo/bar/baz/bat.html"), "/foo/bar/baz/");
        assert_eq!(directory_of("/index.html"), "/");
        assert_eq!(directory_of("/a/b/"), "/a/b/");
        assert_eq!(directory_of(""), "/");
    }
}
