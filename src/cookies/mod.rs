//! HTTP cookie types and header parsing
//!
//! Cookies are stored on the path tree node matching their path, under the
//! host node matching their domain. This module holds the cookie record
//! itself, the `Set-Cookie` header parser and the cookie date parser; the
//! jar operations live on [`crate::db::UrlDb`].

mod date;
mod parser;

pub use date::parse_cookie_date;
pub use parser::{parse_set_cookie, ParsedCookie};

use std::fmt;

/// Which cookie specification a cookie was set under
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum CookieVersion {
    /// Original Netscape cookies
    #[default]
    Netscape,

    /// RFC 2109 cookies (`Version=1`)
    Rfc2109,

    /// RFC 2965 cookies (`Version=2`)
    Rfc2965,
}

impl CookieVersion {
    /// Converts the version to its numeric form, as used in `$Version` and
    /// in the cookie file
    pub fn to_code(&self) -> u32 {
        match self {
            Self::Netscape => 0,
            Self::Rfc2109 => 1,
            Self::Rfc2965 => 2,
        }
    }

    /// Parses a version from its numeric form
    ///
    /// Returns None if the number doesn't match any known version.
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(Self::Netscape),
            1 => Some(Self::Rfc2109),
            2 => Some(Self::Rfc2965),
            _ => None,
        }
    }
}

impl fmt::Display for CookieVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Netscape => write!(f, "Netscape"),
            Self::Rfc2109 => write!(f, "RFC 2109"),
            Self::Rfc2965 => write!(f, "RFC 2965"),
        }
    }
}

/// A stored HTTP cookie
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    pub name: String,

    /// Raw value; quoted values keep their quotes
    pub value: String,

    pub comment: Option<String>,

    /// Host name, or `.domain` for a domain cookie
    pub domain: String,

    pub path: String,

    /// Unix expiry time; None for a session cookie
    pub expires: Option<i64>,

    /// Unix time the cookie was last sent
    pub last_used: i64,

    /// Only send over https
    pub secure: bool,

    /// Hide from scripts
    pub http_only: bool,

    pub version: CookieVersion,

    /// Survives the end of the session
    pub persistent: bool,

    /// The domain came from a `Domain` attribute
    pub domain_from_set: bool,

    /// The path came from a `Path` attribute
    pub path_from_set: bool,
}

impl Cookie {
    /// Returns true if the cookie has expired at the given time
    pub fn is_expired(&self, now: i64) -> bool {
        self.expires.is_some_and(|e| e <= now)
    }

    /// Returns true if this is a domain cookie (`.example.com`)
    pub fn is_domain_cookie(&self) -> bool {
        self.domain.starts_with('.')
    }

    /// Returns true if the two cookies share a (domain, path, name) identity
    pub fn same_identity(&self, other: &Cookie) -> bool {
        self.name == other.name
            && self.path == other.path
            && self.domain.eq_ignore_ascii_case(&other.domain)
    }
}

/// Receives notification of cookie changes, e.g. a cookie manager view
pub trait CookieObserver: Send {
    /// A cookie was added or its contents changed
    fn cookie_updated(&mut self, cookie: &Cookie);

    /// A cookie was deleted or expired
    fn cookie_removed(&mut self, cookie: &Cookie);
}
