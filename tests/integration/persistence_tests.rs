//! Saving and loading the history and cookie files

use std::fs;
use tempfile::TempDir;
use urldb::clock::FixedClock;
use urldb::storage::StorageError;
use urldb::{ContentType, UrlDb};

const NOW: i64 = 1_700_000_000;
const DAY: i64 = 86_400;

fn db_at(now: i64) -> UrlDb {
    UrlDb::with_clock(Box::new(FixedClock(now)))
}

#[test]
fn test_round_trip_keeps_visited_urls() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("urls.db");

    let visited = [
        ("http://www.example.org/", "Example", ContentType::Html),
        ("https://www.example.org:8443/secure?x=1", "Secure", ContentType::TextPlain),
        ("http://192.168.0.1/router", "Router", ContentType::Other),
        ("file:///home/user/notes.txt", "Notes", ContentType::TextPlain),
        ("http://en.wikipedia.org/wiki/Rust", "Rust", ContentType::Unrecognised(1024)),
    ];

    let mut db = db_at(NOW);
    for (url, title, content_type) in visited {
        db.add_url(url).unwrap();
        db.update_visit_data(url);
        db.update_visit_data(url);
        db.set_url_title(url, title);
        db.set_url_content_type(url, content_type);
    }
    db.add_url("http://www.example.org/never-visited").unwrap();

    assert_eq!(db.save(&path).unwrap(), visited.len());

    let mut loaded = db_at(NOW);
    let summary = loaded.load(&path).unwrap();
    assert_eq!(summary.version, 106);
    assert_eq!(summary.urls, visited.len());

    for (url, title, content_type) in visited {
        let data = loaded.get_url_data(url).unwrap_or_else(|| panic!("missing {}", url));
        assert_eq!(data.title.as_deref(), Some(title));
        assert_eq!(data.visits, 2);
        assert_eq!(data.last_visit, NOW);
        assert_eq!(data.content_type, content_type);
    }
    assert!(loaded.find_url("http://www.example.org/never-visited").is_none());
}

#[test]
fn test_expired_visits_not_saved() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("urls.db");

    let mut db = db_at(NOW - 30 * DAY);
    db.add_url("http://old.example/").unwrap();
    db.update_visit_data("http://old.example/");

    db.set_clock(Box::new(FixedClock(NOW)));
    db.add_url("http://new.example/").unwrap();
    db.update_visit_data("http://new.example/");
    db.add_url("http://unvisited.example/").unwrap();

    db.set_expire_days(28);
    assert_eq!(db.save(&path).unwrap(), 1);

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains("new.example"));
    assert!(!text.contains("old.example"));
    assert!(!text.contains("unvisited.example"));

    db.set_expire_days(31);
    assert_eq!(db.save(&path).unwrap(), 2);
}

#[test]
fn test_corrupt_host_record_skipped() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("urls.db");
    fs::write(
        &path,
        "106\n\
         \n2\n\
         http\n\n/lost\n1\n100\n0\n\n\n\
         http\n\n/also-lost\n1\n100\n0\n\n\n\
         good.example\n1\n\
         http\n\n/kept\n4\n200\n1\n\nKept\n",
    )
    .unwrap();

    let mut db = db_at(NOW);
    let summary = db.load(&path).unwrap();
    assert_eq!(summary.skipped_hosts, 1);
    assert_eq!(summary.urls, 1);

    let data = db.get_url_data("http://good.example/kept").unwrap();
    assert_eq!(data.visits, 4);
    assert_eq!(data.title.as_deref(), Some("Kept"));
}

#[test]
fn test_legacy_encoded_title_keeps_later_hosts() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("urls.db");
    fs::write(
        &path,
        &b"106\n\
           a.example\n1\nhttp\n\n/one\n1\n1000\n0\n\nCaf\xe9\n\
           b.example\n1\nhttp\n\n/two\n2\n1000\n0\n\nTwo\n"[..],
    )
    .unwrap();

    let mut db = db_at(NOW);
    assert_eq!(db.load(&path).unwrap().urls, 2);
    assert!(db.find_url("http://a.example/one").is_some());
    assert_eq!(db.get_url_data("http://b.example/two").unwrap().visits, 2);
}

#[test]
fn test_v105_file_loads() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("urls.db");
    fs::write(
        &path,
        "105\n\
         www.example.com\n2\n\
         http://www.example.com/\n3\n1000\n1\n\nHome\n\
         http://www.example.com/about.html\n1\n900\n1\n\n\n",
    )
    .unwrap();

    let mut db = db_at(NOW);
    let summary = db.load(&path).unwrap();
    assert_eq!(summary.version, 105);
    assert_eq!(summary.urls, 2);
    assert_eq!(
        db.get_url_data("http://www.example.com/").and_then(|d| d.title.clone()),
        Some("Home".to_string())
    );
}

#[test]
fn test_unsupported_version_loads_nothing() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("urls.db");
    fs::write(&path, "99\nexample.org\n0\n").unwrap();

    let mut db = db_at(NOW);
    assert!(matches!(db.load(&path), Err(StorageError::UnsupportedVersion(99))));
    assert!(db.index().is_empty());
}

#[test]
fn test_save_replaces_atomically() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("urls.db");
    fs::write(&path, "stale contents\n").unwrap();

    let mut db = db_at(NOW);
    db.add_url("http://example.org/").unwrap();
    db.update_visit_data("http://example.org/");
    db.save(&path).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("106\n"));
    assert!(!text.contains("stale"));

    // Only the target file remains; no temporary files are left behind
    let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
    assert_eq!(entries.len(), 1);
}

#[test]
fn test_cookie_file_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cookies.db");

    let mut db = db_at(NOW);
    assert!(db.set_cookie(
        "mmblah=foo; path=/; expires=Thur, 31-Dec-2099 00:00:00 GMT\r\n",
        "http://www.minimarcos.org.uk/cgi-bin/forum/Blah.pl?,v=login,p=2",
        None
    ));
    assert!(db.set_cookie(
        "PREF=ID=a:TM=b:LM=c:S=d; path=/; domain=.google.com; Max-Age=86400\r\n",
        "http://www.google.com/",
        None
    ));
    assert!(db.set_cookie("session=1", "http://www.google.com/", None));
    assert_eq!(db.save_cookies(&path).unwrap(), 2);

    let mut loaded = db_at(NOW);
    assert_eq!(loaded.load_cookies(&path).unwrap(), 2);
    assert_eq!(
        loaded
            .get_cookie("http://www.minimarcos.org.uk/index.html")
            .as_deref(),
        Some("mmblah=foo")
    );
    assert_eq!(
        loaded.get_cookie("http://www.google.com/").as_deref(),
        Some("PREF=ID=a:TM=b:LM=c:S=d")
    );

    let original: Vec<_> = db.cookies().filter(|c| c.persistent).cloned().collect();
    let reloaded: Vec<_> = loaded.cookies().cloned().collect();
    assert_eq!(original.len(), reloaded.len());
    for cookie in &original {
        let twin = reloaded.iter().find(|c| c.name == cookie.name).unwrap();
        assert_eq!(twin.domain, cookie.domain);
        assert_eq!(twin.path, cookie.path);
        assert_eq!(twin.value, cookie.value);
        assert_eq!(twin.expires, cookie.expires);
        assert_eq!(twin.version, cookie.version);
        assert_eq!(twin.domain_from_set, cookie.domain_from_set);
    }
}
