/// Returns true if the host should be stored as a single verbatim label
///
/// Hosts beginning with a digit are treated as IP literals: they are never
/// split on `.` and live in their own search bucket.
///
/// # Examples
///
/// ```
/// use urldb::url::is_ip_literal;
///
/// assert!(is_ip_literal("127.0.0.1"));
/// assert!(is_ip_literal("2.bp.blogspot.com"));
/// assert!(!is_ip_literal("example.com"));
/// ```
pub fn is_ip_literal(host: &str) -> bool {
    host.as_bytes().first().is_some_and(|b| b.is_ascii_digit())
}

/// Splits a host into lower-cased labels in leaf-to-root order
///
/// `www.Example.org` becomes `["www", "example", "org"]`; an IP literal is
/// one label.
pub fn host_labels(host: &str) -> Vec<String> {
    if is_ip_literal(host) {
        return vec![host.to_ascii_lowercase()];
    }
    host.split('.').map(|l| l.to_ascii_lowercase()).collect()
}

/// Returns true if the input already starts with `www`, ignoring case
///
/// Inputs shorter than three characters count as `www`-prefixed when they
/// are a prefix of `www` themselves (`w`, `ww`), so no `www.` retry is made
/// for them.
pub fn has_www_prefix(input: &str) -> bool {
    let bytes = input.as_bytes();
    let n = bytes.len().min(3);
    bytes[..n].eq_ignore_ascii_case(&b"www"[..n])
}

/// Removes a leading `scheme://` from user input, if present
pub fn strip_scheme(input: &str) -> &str {
    match input.find("://") {
        Some(pos) => &input[pos + 3..],
        None => input,
    }
}
