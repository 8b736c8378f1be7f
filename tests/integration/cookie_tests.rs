//! The cookie jar: acceptance rules, header output and deletion

use urldb::clock::FixedClock;
use urldb::{Cookie, CookieObserver, UrlDb};
use std::sync::{Arc, Mutex};

const NOW: i64 = 1_153_734_825;

fn new_db() -> UrlDb {
    UrlDb::with_clock(Box::new(FixedClock(NOW)))
}

#[test]
fn test_cookie_deletion() {
    let mut db = new_db();
    assert!(db.set_cookie(
        "name=value;Version=1;Path=/index.cgi\r\n",
        "http://example.org/index.cgi",
        None
    ));
    let header = db.get_cookie("http://example.org/index.cgi").unwrap();
    assert!(header.contains("name=value"));

    db.delete_cookie("example.org", "/index.cgi", "name");
    assert_eq!(db.get_cookie("http://example.org/index.cgi"), None);
}

#[test]
fn test_header_vectors() {
    let mut db = new_db();

    assert!(db.set_cookie("name=value;Path=/\r\n", "http://www.google.com/", None));
    assert!(db.set_cookie("name=value;Path=/foo/bar/\r\n", "http://www.example.org/foo/bar/", None));
    assert!(db.set_cookie("name=value\r\n", "http://www.example.org/foo/bar/baz/bat.html", None));
    assert!(db.get_cookie("http://www.example.org/foo/bar/baz/quux.htm").is_some());

    assert!(!db.set_cookie("name=value;Path=/index.html\r\n", "http://example.org/index.htm", None));
    assert!(!db.set_cookie(
        "name=value;Path=/foo/index.html\r\n",
        "http://www.example.org/bar/index.html",
        None
    ));
    assert!(!db.set_cookie("name=value;Domain=.foo.org\r\n", "http://192.168.0.1/", None));

    assert!(db.set_cookie("foo=value;Domain=blah.com\r\n", "http://www.example.com/", None));
    assert_eq!(db.get_cookie("http://www.example.com/").as_deref(), Some("foo=value"));

    assert!(db.set_cookie("name=value;Domain=.example.com\r\n", "http://foo.bar.example.com/", None));
    assert_eq!(
        db.get_cookie("http://www.example.com/").as_deref(),
        Some("foo=value; name=value")
    );

    assert!(db.set_cookie(
        "name=\"value=foo\\\\bar\\\\\\\";\\\\baz=quux\";Version=1\r\n",
        "http://www.example.org/",
        None
    ));
    assert_eq!(
        db.get_cookie("http://www.example.org/").as_deref(),
        Some("$Version=1; name=\"value=foo\\\\bar\\\\\\\";\\\\baz=quux\"")
    );

    assert!(db.set_cookie("a=\r\n", "http://www.example.net/", None));
    assert_eq!(db.get_cookie("http://www.example.net/").as_deref(), Some("a="));
    assert!(db.set_cookie("a=b, foo=bar; Path=/\r\n", "http://www.example.net/", None));
    assert_eq!(db.get_cookie("http://www.example.net/").as_deref(), Some("a=b; foo=bar"));

    assert!(db.set_cookie("foo=moo@foo:blah?moar\\ text\r\n", "http://example.com/", None));
    assert_eq!(
        db.get_cookie("http://example.com/").as_deref(),
        Some("foo=moo@foo:blah?moar\\ text; name=value")
    );
    assert!(db.set_cookie("foo=\"hello\";Version=1,bar=bat\r\n", "http://example.com/", None));
    assert_eq!(
        db.get_cookie("http://example.com/").as_deref(),
        Some("foo=\"hello\"; bar=bat; name=value")
    );

    assert!(db.set_cookie(
        "foo=bar; domain=.example.tld\r\n",
        "http://www.foo.example.tld/",
        Some("http://bar.example.tld/")
    ));
    assert_eq!(db.get_cookie("http://www.foo.example.tld/").as_deref(), Some("foo=bar"));

    assert!(db.set_cookie("foo=bar", "http://expires.com/", None));
    assert_eq!(db.get_cookie("http://expires.com/").as_deref(), Some("foo=bar"));
    assert!(db.set_cookie(
        "foo=bar; expires=Thu, 01-Jan-1970 00:00:01 GMT\r\n",
        "http://expires.com/",
        None
    ));
    assert_eq!(db.get_cookie("http://expires.com/"), None);
}

#[test]
fn test_secure_cookie_with_referer() {
    let mut db = new_db();
    assert!(db.set_cookie(
        "foo=bar;Path=/blah;Secure\r\n",
        "https://www.foo.com/blah/moose",
        Some("https://www.foo.com/blah/moose")
    ));
    assert_eq!(
        db.get_cookie("https://www.foo.com/blah/wxyzabc").as_deref(),
        Some("foo=bar")
    );
}

#[test]
fn test_cookie_date_with_comma_in_value() {
    let mut db = new_db();
    // The bare date after the comma is its own, malformed, cookie
    db.set_cookie(
        "details=foo|bar|Sun, 03-Jun-2007;expires=Mon, 24-Jul-2006 09:53:45 GMT\r\n",
        "http://ccdb.cropcircleresearch.com/",
        None,
    );
    assert_eq!(
        db.get_cookie("http://ccdb.cropcircleresearch.com/").as_deref(),
        Some("details=foo|bar|Sun")
    );
}

#[derive(Clone, Default)]
struct Log(Arc<Mutex<Vec<String>>>);

impl CookieObserver for Log {
    fn cookie_updated(&mut self, cookie: &Cookie) {
        self.0.lock().unwrap().push(format!("+{}", cookie.name));
    }

    fn cookie_removed(&mut self, cookie: &Cookie) {
        self.0.lock().unwrap().push(format!("-{}", cookie.name));
    }
}

#[test]
fn test_observer_sees_expiry_during_lookup() {
    let mut db = new_db();
    let log = Log::default();
    db.set_cookie_observer(Box::new(log.clone()));

    db.set_cookie("short=1; Max-Age=5, long=2; Max-Age=500", "http://example.com/", None);
    db.set_clock(Box::new(FixedClock(NOW + 10)));
    assert_eq!(db.get_cookie("http://example.com/").as_deref(), Some("long=2"));

    db.delete_cookie("example.com", "/", "long");
    assert_eq!(*log.0.lock().unwrap(), vec!["+short", "+long", "-short", "-long"]);
}

#[test]
fn test_cookie_iteration_order() {
    let mut db = new_db();
    db.set_cookie("z=1", "http://zulu.example/", None);
    db.set_cookie("a=1", "http://alpha.example/", None);
    db.set_cookie("d=1; Path=/deep/", "http://alpha.example/deep/page", None);

    let mut names = Vec::new();
    db.iterate_cookies(|cookie| {
        names.push(cookie.name.clone());
        true
    });
    assert_eq!(names, vec!["a", "d", "z"]);
}
