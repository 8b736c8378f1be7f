use crate::state::ContentType;

/// Visit metadata recorded for a URL
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlData {
    /// Resource title
    pub title: Option<String>,

    /// Number of times the URL was visited
    pub visits: u32,

    /// Unix time of the last visit, 0 if never visited
    pub last_visit: i64,

    /// Kind of resource
    pub content_type: ContentType,
}

impl UrlData {
    /// Records a visit at the given time
    pub fn record_visit(&mut self, now: i64) {
        self.visits = self.visits.saturating_add(1);
        self.last_visit = now;
    }

    /// Zeroes the visit statistics, keeping title and content type
    pub fn reset_visits(&mut self) {
        self.visits = 0;
        self.last_visit = 0;
    }

    /// Returns true if the entry should survive a save with the given cutoff
    ///
    /// Only visited URLs whose last visit is strictly after the cutoff are
    /// written out.
    pub fn is_retained(&self, cutoff: i64) -> bool {
        self.visits > 0 && self.last_visit > cutoff
    }
}

/// HTTP authentication details attached to a path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthData {
    /// Protection realm
    pub realm: String,

    /// Credentials in `username:password` form
    pub credentials: String,
}

/// Cleans a title for storage in the line-oriented history file
///
/// Control characters become spaces and trailing spaces are removed.
pub fn sanitise_title(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();
    cleaned.trim_end_matches(' ').to_string()
}
