use crate::db::{Bitmap, UrlDb};
use crate::state::{ContentType, UrlData};
use crate::tree::PathId;
use crate::url::decompose_url;
use crate::UrlResult;
use tracing::debug;

impl UrlDb {
    /// Inserts a URL, creating its host and path nodes as needed
    ///
    /// Adding the same URL twice returns the same node. A fragment is
    /// recorded in the node's fragment set rather than creating a new node.
    ///
    /// # Returns
    ///
    /// * `Ok(PathId)` - The node for the URL
    /// * `Err(UrlError)` - The URL couldn't be decomposed, or its host
    ///   starts with a character the search index can't file
    pub fn add_url(&mut self, url: &str) -> UrlResult<PathId> {
        let parts = decompose_url(url)?;
        let host = self.add_indexed_host(&parts.host)?;
        Ok(self.add_path(
            &parts.scheme,
            parts.port,
            host,
            &parts.path,
            parts.fragment.as_deref(),
            &parts.url,
        ))
    }

    /// Finds the node for a URL, through the search index
    ///
    /// The fragment is ignored. Returns None for malformed URLs and URLs
    /// never added.
    pub fn find_url(&self, url: &str) -> Option<PathId> {
        let parts = decompose_url(url).ok()?;
        let host = self.index.find(&parts.host)?;
        let root = self.hosts.get(host).paths;
        self.paths
            .match_path(root, &parts.scheme, parts.port, &parts.path)
    }

    /// Returns the canonical URL stored for a URL
    pub fn get_url(&self, url: &str) -> Option<&str> {
        let id = self.find_url(url)?;
        self.paths.get(id).url.as_deref()
    }

    pub fn get_url_data(&self, url: &str) -> Option<&UrlData> {
        self.find_url(url).map(|id| &self.paths.get(id).data)
    }

    fn url_data_mut(&mut self, url: &str) -> Option<&mut UrlData> {
        match self.find_url(url) {
            Some(id) => Some(&mut self.paths.get_mut(id).data),
            None => {
                debug!("Ignoring update for unknown URL {}", url);
                None
            }
        }
    }

    pub fn set_url_title(&mut self, url: &str, title: &str) {
        if let Some(data) = self.url_data_mut(url) {
            data.title = Some(title.to_string());
        }
    }

    pub fn set_url_content_type(&mut self, url: &str, content_type: ContentType) {
        if let Some(data) = self.url_data_mut(url) {
            data.content_type = content_type;
        }
    }

    /// Counts a visit to a URL at the current time
    pub fn update_visit_data(&mut self, url: &str) {
        let now = self.now();
        if let Some(data) = self.url_data_mut(url) {
            data.record_visit(now);
        }
    }

    pub fn reset_visit_data(&mut self, url: &str) {
        if let Some(data) = self.url_data_mut(url) {
            data.reset_visits();
        }
    }

    /// Attaches a thumbnail to a URL, dropping any previous one
    ///
    /// Does nothing if the URL is unknown.
    pub fn set_thumbnail(&mut self, url: &str, bitmap: Box<dyn Bitmap>) {
        if let Some(id) = self.find_url(url) {
            self.paths.get_mut(id).thumbnail = Some(bitmap);
        }
    }

    pub fn get_thumbnail(&self, url: &str) -> Option<&dyn Bitmap> {
        let id = self.find_url(url)?;
        self.paths.get(id).thumbnail.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn new_db() -> UrlDb {
        UrlDb::with_clock(Box::new(FixedClock(5000)))
    }

    #[test]
    fn test_unreachable_host_rejected() {
        let mut db = new_db();
        let url = "http://_dmarc.example.com/";
        assert_eq!(
            db.add_url(url),
            Err(crate::UrlError::UnindexableHost("_dmarc.example.com".to_string()))
        );
        assert!(db.hosts().is_empty());

        db.update_visit_data(url);
        assert!(db.get_url_data(url).is_none());
    }

    #[test]
    fn test_add_and_find() {
        let mut db = new_db();
        let id = db.add_url("http://www.example.org/a/b.html").unwrap();
        assert_eq!(db.find_url("http://www.example.org/a/b.html"), Some(id));
        assert_eq!(db.find_url("HTTP://WWW.EXAMPLE.ORG/a/b.html"), Some(id));
        assert_eq!(db.find_url("http://www.example.org/a/B.html"), None);
        assert_eq!(db.find_url("http://example.org/a/b.html"), None);
    }

    #[test]
    fn test_add_url_rejects_malformed() {
        let mut db = new_db();
        assert!(db.add_url("not a url").is_err());
        assert!(db.add_url("http:moodle.org").is_err());
        assert!(db.index().is_empty());
    }

    #[test]
    fn test_fragment_ignored_by_find() {
        let mut db = new_db();
        let id = db.add_url("http://example.org/page#one").unwrap();
        assert_eq!(db.find_url("http://example.org/page#two"), Some(id));
        assert_eq!(db.find_url("http://example.org/page"), Some(id));
        assert_eq!(db.node(id).fragments, vec!["one"]);
    }

    #[test]
    fn test_get_url_is_canonical() {
        let mut db = new_db();
        db.add_url("http://Example.ORG/x?y=1#frag").unwrap();
        assert_eq!(
            db.get_url("http://example.org/x?y=1"),
            Some("http://example.org/x?y=1")
        );
    }

    #[test]
    fn test_updates_on_unknown_url_are_ignored() {
        let mut db = new_db();
        db.set_url_title("http://example.org/", "Title");
        db.update_visit_data("http://example.org/");
        assert!(db.get_url_data("http://example.org/").is_none());
        assert!(db.index().is_empty());
    }

    #[test]
    fn test_visit_data() {
        let mut db = new_db();
        let url = "http://example.org/";
        db.add_url(url).unwrap();
        db.update_visit_data(url);
        db.update_visit_data(url);
        db.set_url_title(url, "Example");
        db.set_url_content_type(url, ContentType::Html);

        let data = db.get_url_data(url).unwrap();
        assert_eq!(data.visits, 2);
        assert_eq!(data.last_visit, 5000);
        assert_eq!(data.title.as_deref(), Some("Example"));
        assert_eq!(data.content_type, ContentType::Html);

        db.reset_visit_data(url);
        let data = db.get_url_data(url).unwrap();
        assert_eq!(data.visits, 0);
        assert_eq!(data.last_visit, 0);
        assert_eq!(data.title.as_deref(), Some("Example"));
    }

    struct CountedBitmap {
        name: &'static str,
        drops: Arc<AtomicUsize>,
    }

    impl Bitmap for CountedBitmap {
        fn filename(&self) -> Option<String> {
            Some(self.name.to_string())
        }
    }

    impl Drop for CountedBitmap {
        fn drop(&mut self) {
            self.drops.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_thumbnail_replacement_drops_previous() {
        let mut db = new_db();
        let url = "http://example.org/";
        db.add_url(url).unwrap();
        let drops = Arc::new(AtomicUsize::new(0));

        db.set_thumbnail(
            url,
            Box::new(CountedBitmap {
                name: "first.png",
                drops: drops.clone(),
            }),
        );
        db.set_thumbnail(
            url,
            Box::new(CountedBitmap {
                name: "second.png",
                drops: drops.clone(),
            }),
        );

        assert_eq!(drops.load(Ordering::SeqCst), 1);
        let thumb = db.get_thumbnail(url).unwrap();
        assert_eq!(thumb.filename().as_deref(), Some("second.png"));
    }

    #[test]
    fn test_thumbnail_for_unknown_url() {
        let mut db = new_db();
        let drops = Arc::new(AtomicUsize::new(0));
        db.set_thumbnail(
            "http://example.org/",
            Box::new(CountedBitmap {
                name: "x.png",
                drops: drops.clone(),
            }),
        );
        assert!(db.get_thumbnail("http://example.org/").is_none());
        assert_eq!(drops.load(Ordering::SeqCst), 1);
    }
}
