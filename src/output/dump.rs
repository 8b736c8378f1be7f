//! Structural dump of the database for debugging
//!
//! Writes the domain tree with each host's path tree beneath it, then the
//! search index bucket by bucket with each tree's shape shown by indentation.

use crate::db::UrlDb;
use crate::search::IP_BUCKET;
use crate::tree::{HostId, PathId};
use std::io::{self, Write};

/// Writes the domain, path and index structure of a database
///
/// # Arguments
///
/// * `writer` - Destination of the dump
/// * `db` - The database to describe
pub fn write_dump<W: Write + ?Sized>(writer: &mut W, db: &UrlDb) -> io::Result<()> {
    writeln!(writer, "Hosts:")?;
    for host in db.hosts().children(db.hosts().root()) {
        dump_host(writer, db, host, 0)?;
    }

    writeln!(writer, "Index:")?;
    for (bucket, tree) in db.index().buckets().iter().enumerate() {
        if tree.is_empty() {
            continue;
        }
        if bucket == IP_BUCKET {
            writeln!(writer, "[0-9]")?;
        } else {
            writeln!(writer, "[{}]", char::from(b'a' + (bucket - 1) as u8))?;
        }

        let mut result = Ok(());
        tree.visit_with_depth(|key, _, depth| {
            if result.is_ok() {
                result = writeln!(writer, "{:depth$}{}", "", key.host(), depth = depth);
            }
        });
        result?;
    }

    Ok(())
}

fn dump_host<W: Write + ?Sized>(writer: &mut W, db: &UrlDb, id: HostId, depth: usize) -> io::Result<()> {
    let node = db.hosts().get(id);
    let certs = if node.permit_invalid_certs { "permits" } else { "denies" };
    writeln!(writer, "{:indent$}{} ({} invalid certs)", "", node.label, certs, indent = depth * 2)?;

    for &child in db.paths().get(node.paths).children() {
        dump_path(writer, db, child, depth + 1)?;
    }
    for child in db.hosts().children(id) {
        dump_host(writer, db, child, depth + 1)?;
    }
    Ok(())
}

fn dump_path<W: Write + ?Sized>(writer: &mut W, db: &UrlDb, id: PathId, depth: usize) -> io::Result<()> {
    let node = db.paths().get(id);
    let indent = depth * 2;
    writeln!(writer, "{:indent$}{}:{} '{}'", "", node.scheme, node.port, node.segment, indent = indent)?;
    for fragment in &node.fragments {
        writeln!(writer, "{:indent$}#{}", "", fragment, indent = indent + 2)?;
    }
    for &child in node.children() {
        dump_path(writer, db, child, depth + 1)?;
    }
    Ok(())
}
