use crate::cookies::{parse_set_cookie, Cookie, CookieObserver, CookieVersion, ParsedCookie};
use crate::db::UrlDb;
use crate::tree::{split_segments, HostId, PathId};
use crate::url::{decompose_url, directory_of, domain_matches, is_ip_literal, path_matches, UrlParts};
use thiserror::Error;
use tracing::{debug, warn};

/// Scheme of the path nodes cookies are stored on, whatever the request scheme
const COOKIE_SCHEME: &str = "http";

/// Why a cookie from a `Set-Cookie` header was refused
#[derive(Debug, Error, PartialEq, Eq)]
enum Rejection {
    #[error("path {0} is not a prefix of the request path")]
    PathMismatch(String),

    #[error("domain {0} set from an IP address")]
    DomainFromIp(String),

    #[error("domain {0} has no embedded dot")]
    DomainTooBroad(String),

    #[error("domain {0} does not match the request host")]
    DomainMismatch(String),

    #[error("domain {0} does not match the referring host")]
    ThirdParty(String),
}

impl UrlDb {
    /// Registers the observer told about cookie changes, replacing any other
    pub fn set_cookie_observer(&mut self, observer: Box<dyn CookieObserver>) {
        self.cookie_observer = Some(observer);
    }

    /// Stores the cookies of a `Set-Cookie` header received for a URL
    ///
    /// # Arguments
    ///
    /// * `header` - Value of the `Set-Cookie` header
    /// * `url` - URL the response came from
    /// * `referer` - URL of the page that caused the request, if any;
    ///   cookies whose domain doesn't cover its host are refused
    ///
    /// # Returns
    ///
    /// True if every cookie in the header was accepted. A cookie that has
    /// already expired deletes its stored counterpart and counts as accepted.
    pub fn set_cookie(&mut self, header: &str, url: &str, referer: Option<&str>) -> bool {
        let parts = match decompose_url(url) {
            Ok(parts) => parts,
            Err(e) => {
                debug!("Ignoring cookies for {}: {}", url, e);
                return false;
            }
        };
        let referer_host = match referer.map(decompose_url).transpose() {
            Ok(referer) => referer.map(|r| r.host),
            Err(e) => {
                warn!("Ignoring cookies for {}: bad referer: {}", url, e);
                return false;
            }
        };

        let parsed = parse_set_cookie(header);
        if parsed.is_empty() {
            debug!("No cookies in header for {}", url);
            return false;
        }

        let now = self.now();
        let mut all_accepted = true;
        for parsed in parsed {
            let name = parsed.name.clone();
            match build_cookie(parsed, &parts, referer_host.as_deref(), now) {
                Ok(cookie) if cookie.is_expired(now) => {
                    self.remove_cookie(&cookie.domain, &cookie.path, |c| c.same_identity(&cookie));
                }
                Ok(cookie) => self.store_cookie(cookie),
                Err(reason) => {
                    warn!("Rejected cookie {} from {}: {}", name, url, reason);
                    all_accepted = false;
                }
            }
        }
        all_accepted
    }

    /// Builds the `Cookie` header value for a request to a URL
    ///
    /// Host cookies come first, then domain cookies from the most specific
    /// domain outwards; within each host, cookies on deeper paths come
    /// first. Secure cookies are only sent over https. Sent cookies have
    /// their last-used time updated, and expired cookies met on the way are
    /// removed.
    ///
    /// # Examples
    ///
    /// ```
    /// use urldb::UrlDb;
    ///
    /// let mut db = UrlDb::new();
    /// assert!(db.set_cookie("a=b, foo=bar; Path=/", "http://www.example.net/", None));
    /// assert_eq!(db.get_cookie("http://www.example.net/").as_deref(), Some("a=b; foo=bar"));
    /// assert_eq!(db.get_cookie("http://example.net/"), None);
    /// ```
    pub fn get_cookie(&mut self, url: &str) -> Option<String> {
        let parts = decompose_url(url).ok()?;
        let now = self.now();
        let request = Request {
            host: &parts.host,
            path: parts.path_only(),
            https: parts.scheme == "https",
            now,
        };

        let mut matched = Vec::new();
        if let Some(host) = self.hosts.find(&parts.host) {
            self.collect_cookies(host, &request, false, &mut matched);
        }
        let domains: Vec<HostId> = self.hosts.ancestors(self.hosts.deepest(&parts.host)).collect();
        for host in domains {
            self.collect_cookies(host, &request, true, &mut matched);
        }

        format_cookie_header(&matched)
    }

    /// Deletes the cookie with a name stored for a domain and path
    ///
    /// A cookie whose domain matches `domain` exactly is preferred; otherwise
    /// a leading dot on either side is ignored. Does nothing if no cookie
    /// matches.
    pub fn delete_cookie(&mut self, domain: &str, path: &str, name: &str) {
        let exact = self.remove_cookie(domain, path, |c| {
            c.name == name && c.domain.eq_ignore_ascii_case(domain)
        });
        if !exact {
            let bare = domain.trim_start_matches('.');
            self.remove_cookie(domain, path, |c| {
                c.name == name && c.domain.trim_start_matches('.').eq_ignore_ascii_case(bare)
            });
        }
    }

    /// Calls `callback` for every stored cookie, in host index order
    ///
    /// The callback returns false to stop.
    pub fn iterate_cookies<F>(&self, mut callback: F)
    where
        F: FnMut(&Cookie) -> bool,
    {
        for cookie in self.cookies() {
            if !callback(cookie) {
                break;
            }
        }
    }

    /// Iterates every stored cookie, in the order of [`UrlDb::iterate_cookies`]
    ///
    /// Cookies stored on hosts that can't be indexed are included after the
    /// indexed ones.
    pub fn cookies(&self) -> impl Iterator<Item = &Cookie> + '_ {
        let indexed = self.index.iter().map(|(_, host)| host);
        let unindexed = (1..=self.hosts.len())
            .map(HostId)
            .filter(move |&id| self.index.find(&self.hosts.fqdn(id)) != Some(id));
        indexed.chain(unindexed).flat_map(move |host| {
            self.paths
                .walk(self.hosts.get(host).paths)
                .flat_map(move |id| self.paths.get(id).cookies.iter())
        })
    }

    fn store_cookie(&mut self, cookie: Cookie) {
        let node = self.cookie_node(&cookie.domain, &cookie.path);
        let stored = &mut self.paths.get_mut(node).cookies;
        let index = match stored
            .iter()
            .position(|c| c.name == cookie.name && c.domain.eq_ignore_ascii_case(&cookie.domain))
        {
            Some(index) => {
                stored[index] = cookie;
                index
            }
            None => {
                stored.push(cookie);
                stored.len() - 1
            }
        };

        debug!("Stored cookie {} for {}{}", stored[index].name, stored[index].domain, stored[index].path);
        if let Some(observer) = self.cookie_observer.as_mut() {
            observer.cookie_updated(&stored[index]);
        }
    }

    /// Adds a cookie loaded from the cookie file, skipping expired ones
    pub(crate) fn insert_cookie(&mut self, cookie: Cookie) {
        if !cookie.is_expired(self.now()) {
            self.store_cookie(cookie);
        }
    }

    /// Removes the first cookie matching `pred` from the node for a domain
    /// and path, returning whether one was found
    fn remove_cookie<P>(&mut self, domain: &str, path: &str, pred: P) -> bool
    where
        P: Fn(&Cookie) -> bool,
    {
        let Some(node) = self.find_cookie_node(domain, path) else {
            return false;
        };
        let stored = &mut self.paths.get_mut(node).cookies;
        let Some(index) = stored.iter().position(pred) else {
            return false;
        };

        let removed = stored.remove(index);
        debug!("Removed cookie {} for {}{}", removed.name, removed.domain, removed.path);
        if let Some(observer) = self.cookie_observer.as_mut() {
            observer.cookie_removed(&removed);
        }
        true
    }

    /// Finds or creates the path node a cookie is stored on
    fn cookie_node(&mut self, domain: &str, path: &str) -> PathId {
        let host_name = domain.trim_start_matches('.');
        let host = self.add_host(host_name);
        let url = format!("{}://{}{}", COOKIE_SCHEME, host_name, path);
        self.add_path(COOKIE_SCHEME, 0, host, path, None, &url)
    }

    fn find_cookie_node(&self, domain: &str, path: &str) -> Option<PathId> {
        let host = self.hosts.find(domain.trim_start_matches('.'))?;
        let root = self.hosts.get(host).paths;
        self.paths.match_path(root, COOKIE_SCHEME, 0, path)
    }

    /// Path nodes that may hold cookies for a request path, deepest first
    ///
    /// These are the nodes along the path and their directory (empty
    /// segment) children.
    fn cookie_path_nodes(&self, root: PathId, path: &str) -> Vec<PathId> {
        let directory = |node| self.paths.find_child(node, "", COOKIE_SCHEME, 0);

        let mut nodes: Vec<PathId> = directory(root).into_iter().collect();
        let mut node = root;
        for segment in split_segments(path) {
            if segment.is_empty() {
                break;
            }
            match self.paths.find_child(node, segment, COOKIE_SCHEME, 0) {
                Some(child) => {
                    nodes.push(child);
                    nodes.extend(directory(child));
                    node = child;
                }
                None => break,
            }
        }
        nodes.reverse();
        nodes
    }

    /// Appends the cookies of one host that apply to a request
    fn collect_cookies(&mut self, host: HostId, request: &Request<'_>, domain_cookies: bool, out: &mut Vec<Cookie>) {
        let root = self.hosts.get(host).paths;
        for node in self.cookie_path_nodes(root, request.path) {
            let stored = &mut self.paths.get_mut(node).cookies;
            let observer = &mut self.cookie_observer;
            stored.retain(|cookie| {
                if !cookie.is_expired(request.now) {
                    return true;
                }
                debug!("Expired cookie {} for {}", cookie.name, cookie.domain);
                if let Some(observer) = observer.as_mut() {
                    observer.cookie_removed(cookie);
                }
                false
            });

            for cookie in stored.iter_mut() {
                if cookie.is_domain_cookie() != domain_cookies
                    || !domain_matches(&cookie.domain, request.host)
                    || !path_matches(&cookie.path, request.path)
                    || (cookie.secure && !request.https)
                {
                    continue;
                }
                cookie.last_used = request.now;
                out.push(cookie.clone());
            }
        }
    }
}

/// The parts of a request that decide which cookies are sent
struct Request<'a> {
    host: &'a str,
    path: &'a str,
    https: bool,
    now: i64,
}

/// Applies the acceptance rules to a parsed cookie
fn build_cookie(
    parsed: ParsedCookie,
    request: &UrlParts,
    referer_host: Option<&str>,
    now: i64,
) -> Result<Cookie, Rejection> {
    let request_path = request.path_only();
    let host = request.host.as_str();

    let (path, path_from_set) = match parsed.path.clone().filter(|p| !p.is_empty()) {
        Some(path) if request_path.starts_with(path.as_str()) => (path, true),
        Some(path) => return Err(Rejection::PathMismatch(path)),
        None => (directory_of(request_path).to_string(), false),
    };

    let (domain, domain_from_set) = match parsed.domain.as_deref().map(str::to_ascii_lowercase) {
        Some(domain) if domain.starts_with('.') => {
            let base = &domain[1..];
            if is_ip_literal(host) {
                return Err(Rejection::DomainFromIp(domain));
            }
            if !base.contains('.') {
                return Err(Rejection::DomainTooBroad(domain));
            }
            if host != base && !host.ends_with(domain.as_str()) {
                return Err(Rejection::DomainMismatch(domain));
            }
            (domain, true)
        }
        // A domain without a leading dot is ignored
        _ => (host.to_string(), false),
    };

    if let Some(referer) = referer_host {
        if !domain_matches(&domain, referer) {
            return Err(Rejection::ThirdParty(domain));
        }
    }

    let expires = parsed.expiry(now);
    Ok(Cookie {
        name: parsed.name,
        value: parsed.value,
        comment: parsed.comment,
        domain,
        path,
        expires,
        last_used: now,
        secure: parsed.secure,
        http_only: parsed.http_only,
        version: parsed.version,
        persistent: expires.is_some(),
        domain_from_set,
        path_from_set,
    })
}

/// Joins matched cookies into a `Cookie` header value
fn format_cookie_header(cookies: &[Cookie]) -> Option<String> {
    let version = cookies.iter().map(|c| c.version).min()?;

    let mut header = String::new();
    if version > CookieVersion::Netscape {
        header.push_str(&format!("$Version={}; ", version.to_code()));
    }

    let pairs: Vec<String> = cookies
        .iter()
        .map(|cookie| {
            let mut pair = format!("{}={}", cookie.name, cookie.value);
            if cookie.version > CookieVersion::Netscape {
                if cookie.path_from_set {
                    pair.push_str(&format!("; $Path=\"{}\"", cookie.path));
                }
                if cookie.domain_from_set {
                    pair.push_str(&format!("; $Domain=\"{}\"", cookie.domain));
                }
            }
            pair
        })
        .collect();
    header.push_str(&pairs.join("; "));
    Some(header)
}
