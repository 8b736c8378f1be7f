use crate::cookies::{Cookie, CookieVersion};
use crate::storage::{LineReader, StorageError, StorageResult};
use std::io::{BufRead, Write};
use tracing::{debug, warn};

/// Version written and accepted by the cookie codec
pub const COOKIE_FILE_VERSION: i64 = 102;

const FIELD_COUNT: usize = 13;

const HEADER: &str = "# urldb cookie file\n\
# Fields: version domain domain_from_set path path_from_set secure http_only \
expires last_used persistent name value comment";

/// Reads a cookie file
///
/// Lines starting with `#` and blank lines are ignored. The first other line
/// is the version. Records that fail to parse are skipped with a warning,
/// and cookies already expired at `now` are dropped.
pub fn read_cookies<R: BufRead>(reader: R, now: i64) -> StorageResult<Vec<Cookie>> {
    let mut lines = LineReader::new(reader);
    let mut version = None;
    let mut cookies = Vec::new();

    while let Some(line) = lines.next_line()? {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.to_string();

        if version.is_none() {
            let v = line.trim().parse::<i64>().map_err(|_| StorageError::Malformed {
                line: lines.line(),
                reason: format!("invalid version line {:?}", line),
            })?;
            if v != COOKIE_FILE_VERSION {
                return Err(StorageError::UnsupportedVersion(v));
            }
            version = Some(v);
            continue;
        }

        match parse_record(&line) {
            Ok(cookie) if cookie.is_expired(now) => {
                debug!("Dropping expired cookie {} for {}", cookie.name, cookie.domain);
            }
            Ok(cookie) => cookies.push(cookie),
            Err(reason) => {
                warn!("Skipping cookie record at line {}: {}", lines.line(), reason);
            }
        }
    }

    if version.is_none() {
        return Err(StorageError::Malformed {
            line: lines.line(),
            reason: "missing version line".to_string(),
        });
    }

    Ok(cookies)
}

/// Writes the persistent, unexpired cookies to a cookie file
///
/// # Returns
///
/// The number of cookies written.
pub fn write_cookies<'a, W, I>(writer: &mut W, cookies: I, now: i64) -> StorageResult<usize>
where
    W: Write + ?Sized,
    I: IntoIterator<Item = &'a Cookie>,
{
    writeln!(writer, "{}", HEADER)?;
    writeln!(writer, "{}", COOKIE_FILE_VERSION)?;

    let mut written = 0;
    for cookie in cookies {
        if !cookie.persistent || cookie.is_expired(now) {
            continue;
        }
        writeln!(writer, "{}", format_record(cookie))?;
        written += 1;
    }
    Ok(written)
}

fn format_record(cookie: &Cookie) -> String {
    let flag = |b: bool| if b { "1" } else { "0" };
    let fields = [
        cookie.version.to_code().to_string(),
        escape(&cookie.domain),
        flag(cookie.domain_from_set).to_string(),
        escape(&cookie.path),
        flag(cookie.path_from_set).to_string(),
        flag(cookie.secure).to_string(),
        flag(cookie.http_only).to_string(),
        cookie.expires.unwrap_or(-1).to_string(),
        cookie.last_used.to_string(),
        flag(cookie.persistent).to_string(),
        escape(&cookie.name),
        escape(&cookie.value),
        cookie.comment.as_deref().map(escape).unwrap_or_default(),
    ];
    fields.join("\t")
}

fn parse_record(line: &str) -> Result<Cookie, String> {
    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() != FIELD_COUNT {
        return Err(format!(
            "expected {} fields, found {}",
            FIELD_COUNT,
            fields.len()
        ));
    }

    let version = fields[0]
        .parse::<u32>()
        .ok()
        .and_then(CookieVersion::from_code)
        .ok_or_else(|| format!("invalid cookie version {:?}", fields[0]))?;
    let expires = parse_int(fields[7], "expires")?;
    let name = unescape(fields[10]);
    if name.is_empty() {
        return Err("empty cookie name".to_string());
    }

    Ok(Cookie {
        version,
        domain: unescape(fields[1]),
        domain_from_set: parse_flag(fields[2], "domain_from_set")?,
        path: unescape(fields[3]),
        path_from_set: parse_flag(fields[4], "path_from_set")?,
        secure: parse_flag(fields[5], "secure")?,
        http_only: parse_flag(fields[6], "http_only")?,
        expires: (expires >= 0).then_some(expires),
        last_used: parse_int(fields[8], "last_used")?,
        persistent: parse_flag(fields[9], "persistent")?,
        name,
        value: unescape(fields[11]),
        comment: Some(unescape(fields[12])).filter(|c| !c.is_empty()),
    })
}

fn parse_flag(field: &str, name: &str) -> Result<bool, String> {
    match field {
        "0" => Ok(false),
        "1" => Ok(true),
        other => Err(format!("invalid {} flag {:?}", name, other)),
    }
}

fn parse_int(field: &str, name: &str) -> Result<i64, String> {
    field
        .parse()
        .map_err(|_| format!("invalid {} value {:?}", name, field))
}

/// Escapes the characters that would break the record layout
fn escape(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    for c in field.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\n' => out.push_str("\\n"),
            c => out.push(c),
        }
    }
    out
}

fn unescape(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut chars = field.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('n') => out.push('\n'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
