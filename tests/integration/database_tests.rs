//! URL insertion, lookup, search and auth through the public API

use urldb::clock::FixedClock;
use urldb::{ContentType, UrlDb};

fn collect_partial(db: &UrlDb, prefix: &str) -> Vec<String> {
    let mut urls = Vec::new();
    db.iterate_partial(prefix, |url, _| {
        urls.push(url.to_string());
        true
    });
    urls
}

#[test]
fn test_add_url_is_idempotent() {
    let mut db = UrlDb::new();
    let first = db.add_url("http://www.example.org/a/b.html").unwrap();
    let nodes = db.paths().len();
    let hosts = db.hosts().len();

    let second = db.add_url("http://www.example.org/a/b.html").unwrap();
    assert_eq!(first, second);
    assert_eq!(db.paths().len(), nodes);
    assert_eq!(db.hosts().len(), hosts);
    assert_eq!(db.find_url("http://www.example.org/a/b.html"), Some(first));
    assert_eq!(db.find_url("http://www.example.org/a/b.html"), Some(first));
}

#[test]
fn test_fragments_merge_into_one_node() {
    let mut db = UrlDb::new();
    let host = db.add_host("netsurf.strcprstskrzkrk.co.uk");
    let url = "http://netsurf.strcprstskrzkrk.co.uk/path/to/resource.htm?a=b";

    let ids: Vec<_> = ["zz", "aa", "yy"]
        .iter()
        .map(|frag| db.add_path("http", 0, host, "/path/to/resource.htm?a=b", Some(frag), url))
        .collect();

    assert!(ids.iter().all(|&id| id == ids[0]));
    assert_eq!(db.node(ids[0]).fragments, vec!["aa", "yy", "zz"]);
    assert_eq!(db.find_url(url), Some(ids[0]));
}

#[test]
fn test_find_independent_of_insertion_order() {
    let hosts = [
        "www.example.org",
        "example.org",
        "mail.example.org",
        "a.b.c.example.com",
        "192.168.0.1",
        "2.bp.blogspot.com",
        "zeta.net",
        "alpha.net",
    ];

    let mut forward = UrlDb::new();
    let mut backward = UrlDb::new();
    for host in hosts {
        forward.add_url(&format!("http://{}/index.html", host)).unwrap();
    }
    for host in hosts.iter().rev() {
        backward.add_url(&format!("http://{}/index.html", host)).unwrap();
    }

    for host in hosts {
        let url = format!("http://{}/index.html", host);
        assert!(forward.find_url(&url).is_some(), "{}", url);
        assert!(backward.find_url(&url).is_some(), "{}", url);
    }

    for missing in ["www.example.com", "b.c.example.com", "192.168.0.2", "net", "org"] {
        let url = format!("http://{}/index.html", missing);
        assert!(forward.find_url(&url).is_none(), "{}", url);
        assert!(backward.find_url(&url).is_none(), "{}", url);
    }

    let forward_hosts: Vec<_> = forward.index().iter().map(|(k, _)| k.host()).collect();
    let backward_hosts: Vec<_> = backward.index().iter().map(|(k, _)| k.host()).collect();
    assert_eq!(forward_hosts, backward_hosts);
}

#[test]
fn test_prefix_search_finds_inserted_host() {
    let mut db = UrlDb::new();
    assert!(collect_partial(&db, "wikipedia").is_empty());

    db.add_url("http://www.wikipedia.org/").unwrap();
    assert_eq!(collect_partial(&db, "wikipedia"), vec!["http://www.wikipedia.org/"]);
}

#[test]
fn test_path_prefix_search() {
    let mut db = UrlDb::new();
    db.add_url("http://en.wikipedia.org/wiki/Foo").unwrap();
    db.add_url("http://en.wikipedia.org/wiki/Bar").unwrap();

    assert_eq!(
        collect_partial(&db, "en.wikipedia.org/wiki"),
        vec![
            "http://en.wikipedia.org/wiki/Bar",
            "http://en.wikipedia.org/wiki/Foo",
        ]
    );
    assert_eq!(collect_partial(&db, "en.wikipedia.org/wiki/F").len(), 1);
}

#[test]
fn test_file_urls_live_under_localhost() {
    let mut db = UrlDb::new();
    let id = db.add_url("file:///home/").unwrap();
    assert_eq!(db.find_url("file:///home/"), Some(id));

    let host = db.paths().owning_host(id).unwrap();
    assert_eq!(db.hosts().fqdn(host), "localhost");
}

#[test]
fn test_malformed_urls_rejected() {
    let mut db = UrlDb::new();
    assert!(db.add_url("http:moodle.org").is_err());
    assert!(db.get_url("http:moodle.org").is_none());

    assert!(db.add_url("http://a_a/").is_ok());
    assert!(db.get_url("http://a_a/").is_some());

    assert!(db.add_url("http://www2.2checkout.com/").is_ok());
    assert!(db.get_url("http://www2.2checkout.com/").is_some());

    let blog = "http://2.bp.blogspot.com/_448y6kVhntg/TSekubcLJ7I/AAAAAAAAHJE/yZTsV5xT5t4/s1600/covers.jpg";
    assert!(db.add_url(blog).is_ok());
    assert!(db.get_url(blog).is_some());
}

#[test]
fn test_title_on_manually_added_path() {
    let mut db = UrlDb::new();
    let host = db.add_host("intranet");
    db.add_path("http", 0, host, "/", None, "http://intranet/");
    db.set_url_title("http://intranet/", "foo");
    assert_eq!(
        db.get_url_data("http://intranet/").and_then(|d| d.title.as_deref()),
        Some("foo")
    );
}

#[test]
fn test_auth_ancestor_walk() {
    let mut db = UrlDb::new();
    db.set_auth_details("http://h/a/b/", "realm", "user:pass").unwrap();
    assert_eq!(
        db.get_auth_details("http://h/a/b/c/leaf.html", "realm"),
        Some("user:pass")
    );
    assert_eq!(db.get_auth_details("http://h/a/b/c/leaf.html", "other"), None);
}

#[test]
fn test_visit_metadata() {
    let mut db = UrlDb::with_clock(Box::new(FixedClock(42)));
    let url = "https://docs.example.org/guide/";
    db.add_url(url).unwrap();
    db.update_visit_data(url);
    db.set_url_content_type(url, ContentType::from_mime("text/html; charset=utf-8"));

    let data = db.get_url_data(url).unwrap();
    assert_eq!(data.visits, 1);
    assert_eq!(data.last_visit, 42);
    assert_eq!(data.content_type, ContentType::Html);
}

#[test]
fn test_entries_cover_every_leaf() {
    let mut db = UrlDb::new();
    db.add_url("http://b.example/one").unwrap();
    db.add_url("http://a.example/two").unwrap();
    db.add_url("http://a.example/dir/three").unwrap();

    let urls: Vec<_> = db.entries().map(|e| e.url.to_string()).collect();
    assert_eq!(
        urls,
        vec![
            "http://a.example/dir/three",
            "http://a.example/two",
            "http://b.example/one",
        ]
    );
}
