use crate::cookies::{parse_cookie_date, CookieVersion};
use tracing::debug;

/// A cookie as described by a `Set-Cookie` header, before the jar's
/// acceptance rules are applied
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedCookie {
    pub name: String,
    pub value: String,
    pub path: Option<String>,
    pub domain: Option<String>,

    /// `Expires` attribute, as unix seconds
    pub expires: Option<i64>,

    /// `Max-Age` attribute, in seconds
    pub max_age: Option<i64>,

    pub version: CookieVersion,
    pub comment: Option<String>,
    pub secure: bool,
    pub http_only: bool,
}

impl ParsedCookie {
    fn new(name: String, value: String) -> Self {
        Self {
            name,
            value,
            ..Default::default()
        }
    }

    /// Resolves the expiry time, giving `Max-Age` precedence over `Expires`
    ///
    /// Returns None for a session cookie.
    pub fn expiry(&self, now: i64) -> Option<i64> {
        match self.max_age {
            Some(age) => Some(now.saturating_add(age)),
            None => self.expires,
        }
    }

    fn apply_attribute(&mut self, name: &str, value: Option<String>) {
        match name.to_ascii_lowercase().as_str() {
            "path" => self.path = value,
            "domain" => self.domain = value,
            "expires" => {
                self.expires = value.as_deref().and_then(parse_cookie_date);
                if self.expires.is_none() {
                    debug!("Ignoring unparseable expiry date {:?}", value);
                }
            }
            "max-age" => {
                self.max_age = value.and_then(|v| v.trim().parse::<i64>().ok());
            }
            "version" => {
                let code = value
                    .as_deref()
                    .map(|v| v.trim_matches('"'))
                    .and_then(|v| v.parse::<u32>().ok());
                self.version = code
                    .and_then(CookieVersion::from_code)
                    .unwrap_or(CookieVersion::Netscape);
            }
            "comment" => self.comment = value,
            "secure" => self.secure = true,
            "httponly" => self.http_only = true,
            other => debug!("Ignoring unknown cookie attribute {}", other),
        }
    }
}

/// Splits a `Set-Cookie` header into its cookies
///
/// Cookies are separated by commas and attributes by semicolons. Quoted
/// values are kept verbatim, quotes and backslash escapes included, and may
/// contain either separator. The `Expires` attribute is allowed to contain
/// the comma that follows the weekday name.
///
/// A cookie whose leading pair has no `=` is malformed; it and its
/// attributes are dropped without affecting the other cookies in the header.
///
/// # Examples
///
/// ```
/// use urldb::cookies::parse_set_cookie;
///
/// let cookies = parse_set_cookie("a=b, foo=bar; Path=/");
/// assert_eq!(cookies.len(), 2);
/// assert_eq!(cookies[1].name, "foo");
/// assert_eq!(cookies[1].path.as_deref(), Some("/"));
/// ```
pub fn parse_set_cookie(header: &str) -> Vec<ParsedCookie> {
    let mut scanner = Scanner::new(header.trim_end_matches(&['\r', '\n', ' ', '\t'][..]));
    let mut cookies = Vec::new();
    let mut current: Option<ParsedCookie> = None;
    let mut discarding = false;

    loop {
        scanner.skip_whitespace();
        if scanner.at_end() {
            break;
        }

        let name = scanner.read_name();
        let value = if scanner.eat('=') {
            let in_expires = current.is_some() && name.eq_ignore_ascii_case("expires");
            Some(scanner.read_value(in_expires))
        } else {
            None
        };

        if current.is_none() && !discarding {
            match value {
                Some(value) if !name.is_empty() => {
                    current = Some(ParsedCookie::new(name, value));
                }
                _ => {
                    debug!("Dropping malformed cookie {:?}", name);
                    discarding = true;
                }
            }
        } else if let Some(cookie) = current.as_mut() {
            cookie.apply_attribute(&name, value);
        }

        match scanner.next() {
            Some(',') => {
                cookies.extend(current.take());
                discarding = false;
            }
            Some(_) => {}
            None => break,
        }
    }

    cookies.extend(current);
    cookies
}

struct Scanner {
    chars: Vec<char>,
    pos: usize,
}

impl Scanner {
    fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn next(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|c| c == ' ' || c == '\t') {
            self.pos += 1;
        }
    }

    fn read_name(&mut self) -> String {
        let mut name = String::new();
        while let Some(c) = self.peek() {
            if c == '=' || c == ';' || c == ',' {
                break;
            }
            name.push(c);
            self.pos += 1;
        }
        name.trim_end().to_string()
    }

    /// Reads a value up to (not including) its terminating `;` or `,`
    fn read_value(&mut self, in_expires: bool) -> String {
        self.skip_whitespace();
        let mut value = String::new();

        if self.peek() == Some('"') {
            self.read_quoted(&mut value);
        }

        while let Some(c) = self.peek() {
            if c == ';' {
                break;
            }
            // A comma directly after a weekday name is part of the date
            if c == ',' && !(in_expires && is_weekday_prefix(&value)) {
                break;
            }
            value.push(c);
            self.pos += 1;
        }

        value.trim_end().to_string()
    }

    fn read_quoted(&mut self, value: &mut String) {
        if let Some(open) = self.next() {
            value.push(open);
        }
        while let Some(c) = self.next() {
            value.push(c);
            match c {
                '\\' => {
                    if let Some(escaped) = self.next() {
                        value.push(escaped);
                    }
                }
                '"' => return,
                _ => {}
            }
        }
    }
}

fn is_weekday_prefix(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|c| c.is_ascii_alphabetic())
}
