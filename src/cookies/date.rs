use chrono::NaiveDate;

const MONTHS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

/// Parses an HTTP cookie `Expires` date into unix seconds
///
/// Real-world servers send many variants of the date format, so parsing is
/// token based rather than a fixed pattern: the day of month, month name,
/// year and `hh:mm:ss` time are picked out of the string in any order, and
/// anything else (weekday names, `GMT`) is ignored. Two-digit years map to
/// 1970-2069.
///
/// # Examples
///
/// ```
/// use urldb::cookies::parse_cookie_date;
///
/// assert_eq!(parse_cookie_date("Thu, 01-Jan-1970 00:00:01 GMT"), Some(1));
/// assert_eq!(parse_cookie_date("Sun Nov  6 08:49:37 1994"), Some(784111777));
/// assert_eq!(parse_cookie_date("not a date"), None);
/// ```
pub fn parse_cookie_date(input: &str) -> Option<i64> {
    let mut day: Option<u32> = None;
    let mut month: Option<u32> = None;
    let mut year: Option<i32> = None;
    let mut time: Option<(u32, u32, u32)> = None;

    let tokens = input
        .split(|c: char| c.is_whitespace() || c == '-' || c == ',' || c == '/')
        .filter(|t| !t.is_empty());

    for token in tokens {
        if time.is_none() && token.contains(':') {
            time = parse_time(token);
            continue;
        }

        if token.bytes().all(|b| b.is_ascii_digit()) {
            if day.is_none() && token.len() <= 2 {
                day = token.parse().ok();
            } else if year.is_none() && (token.len() == 2 || token.len() == 4) {
                year = token.parse().ok().map(expand_year);
            }
            continue;
        }

        if month.is_none() {
            if let Some(prefix) = token.get(..3) {
                let prefix = prefix.to_ascii_lowercase();
                if let Some(idx) = MONTHS.iter().position(|m| *m == prefix) {
                    month = Some(idx as u32 + 1);
                }
            }
        }
    }

    let (h, m, s) = time.unwrap_or((0, 0, 0));
    let date = NaiveDate::from_ymd_opt(year?, month?, day?)?;
    let datetime = date.and_hms_opt(h, m, s)?;
    Some(datetime.and_utc().timestamp())
}

fn parse_time(token: &str) -> Option<(u32, u32, u32)> {
    let mut parts = token.split(':').map(|p| p.parse::<u32>());
    let h = parts.next()?.ok()?;
    let m = parts.next()?.ok()?;
    let s = match parts.next() {
        Some(p) => p.ok()?,
        None => 0,
    };
    Some((h, m, s))
}

fn expand_year(year: i32) -> i32 {
    match year {
        0..=69 => year + 2000,
        70..=99 => year + 1900,
        _ => year,
    }
}
