use crate::db::UrlDb;
use crate::state::{sanitise_title, ContentType};
use crate::storage::{LineReader, StorageError, StorageResult};
use crate::tree::{HostId, PathId, PathTree};
use std::io::{BufRead, Write};
use tracing::{debug, warn};

/// Version written by [`write_history`]
pub const HISTORY_VERSION: i64 = 106;

/// Oldest version [`read_history`] accepts
pub const MIN_HISTORY_VERSION: i64 = 105;

/// Counts of what a history load did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    /// File format version
    pub version: i64,

    /// Host records loaded
    pub hosts: usize,

    /// URL records loaded
    pub urls: usize,

    /// Host records skipped as corrupt
    pub skipped_hosts: usize,
}

/// One URL record, minus its location
struct UrlRecord {
    visits: u32,
    last_visit: i64,
    content_type: ContentType,
    title: String,
}

/// Reads a history file into the database
///
/// Records are merged into whatever the database already holds. A host
/// record with an empty host name is skipped by discarding the expected
/// number of lines; a URL that can't be placed is skipped; a file that ends
/// mid-record keeps everything read so far.
///
/// # Returns
///
/// * `Ok(LoadSummary)` - Counts of what was loaded
/// * `Err(StorageError::UnsupportedVersion)` - Version outside 105..=106;
///   nothing was loaded
/// * `Err(StorageError::Malformed)` - Missing or unreadable version line
pub fn read_history<R: BufRead>(reader: R, db: &mut UrlDb) -> StorageResult<LoadSummary> {
    let mut lines = LineReader::new(reader);

    let version = match lines.next_line()? {
        Some(line) => line.trim().parse::<i64>().map_err(|_| StorageError::Malformed {
            line: 1,
            reason: format!("invalid version line {:?}", line),
        })?,
        None => {
            return Err(StorageError::Malformed {
                line: 0,
                reason: "empty file".to_string(),
            })
        }
    };

    if !(MIN_HISTORY_VERSION..=HISTORY_VERSION).contains(&version) {
        return Err(StorageError::UnsupportedVersion(version));
    }

    let lines_per_url = if version == 105 { 6 } else { 8 };
    let mut summary = LoadSummary {
        version,
        ..Default::default()
    };

    'hosts: loop {
        let Some(host) = lines.next_line()? else {
            break;
        };
        let host = normalise_host(host, version);

        let Some(count_line) = lines.next_line()?.map(str::to_string) else {
            debug!("History file ends after host {:?}", host);
            break;
        };
        let count: usize = match count_line.trim().parse() {
            Ok(count) => count,
            Err(_) => {
                warn!(
                    "Invalid URL count {:?} at line {}, stopping load",
                    count_line,
                    lines.line()
                );
                break;
            }
        };

        if count == 0 {
            debug!("Host {:?} has no URLs", host);
            continue;
        }

        let host_id = match db.add_indexed_host(&host) {
            Ok(id) => id,
            Err(_) => {
                warn!(
                    "Skipping corrupt host record {:?} at line {} ({} URLs)",
                    host,
                    lines.line(),
                    count
                );
                for _ in 0..count * lines_per_url {
                    if lines.next_line()?.is_none() {
                        break 'hosts;
                    }
                }
                summary.skipped_hosts += 1;
                continue;
            }
        };
        summary.hosts += 1;

        for _ in 0..count {
            let location = if version == 105 {
                read_v105_location(&mut lines, db, &host)?
            } else {
                read_v106_location(&mut lines, db, host_id, &host)?
            };
            let Some(location) = location else {
                break 'hosts;
            };
            let Some(record) = read_url_record(&mut lines)? else {
                break 'hosts;
            };

            match location {
                Ok(id) => {
                    apply_record(db, id, record);
                    summary.urls += 1;
                }
                Err(reason) => warn!("Skipping URL record: {}", reason),
            }
        }
    }

    Ok(summary)
}

/// Applies the fixups older files need to their host lines
fn normalise_host(host: &str, version: i64) -> String {
    if version != 105 {
        return host.to_string();
    }
    if host == "file:/" {
        return "localhost".to_string();
    }
    match host.rfind(':') {
        Some(pos) => host[..pos].to_string(),
        None => host.to_string(),
    }
}

/// Result of reading a record's location lines
///
/// The outer None means the file ended; the inner error means the record
/// is readable but can't be placed in the database.
type Location = Option<Result<PathId, String>>;

fn read_v106_location<R: BufRead>(
    lines: &mut LineReader<R>,
    db: &mut UrlDb,
    host_id: HostId,
    host: &str,
) -> StorageResult<Location> {
    let Some(scheme) = lines.next_line()?.map(str::to_string) else {
        return Ok(None);
    };
    let Some(port) = lines.next_line()?.map(|p| p.trim().parse::<u16>().unwrap_or(0)) else {
        return Ok(None);
    };
    let Some(path) = lines.next_line()?.map(str::to_string) else {
        return Ok(None);
    };

    if scheme.is_empty() || !path.starts_with('/') {
        return Ok(Some(Err(format!("bad location {:?} {:?}", scheme, path))));
    }

    let authority = if scheme.eq_ignore_ascii_case("file") && host == "localhost" {
        ""
    } else {
        host
    };
    let url = if port != 0 {
        format!("{}://{}:{}{}", scheme, authority, port, path)
    } else {
        format!("{}://{}{}", scheme, authority, path)
    };

    Ok(Some(Ok(db.add_path(&scheme, port, host_id, &path, None, &url))))
}

fn read_v105_location<R: BufRead>(
    lines: &mut LineReader<R>,
    db: &mut UrlDb,
    host: &str,
) -> StorageResult<Location> {
    let Some(url) = lines.next_line()?.map(str::to_string) else {
        return Ok(None);
    };

    if let Some(path) = url.strip_prefix("file:") {
        let host_id = db.add_host("localhost");
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{}", path)
        };
        let canonical = format!("file://{}", path);
        return Ok(Some(Ok(db.add_path("file", 0, host_id, &path, None, &canonical))));
    }

    match db.add_url(&url) {
        Ok(id) => Ok(Some(Ok(id))),
        Err(e) => Ok(Some(Err(format!("{} (host {})", e, host)))),
    }
}

fn read_url_record<R: BufRead>(lines: &mut LineReader<R>) -> StorageResult<Option<UrlRecord>> {
    let mut fields: [String; 5] = Default::default();
    for field in fields.iter_mut() {
        match lines.next_line()? {
            Some(line) => *field = line.to_string(),
            None => return Ok(None),
        }
    }
    let [visits, last_visit, content_type, _thumbnail, title] = fields;

    Ok(Some(UrlRecord {
        visits: visits.trim().parse().unwrap_or(0),
        last_visit: last_visit.trim().parse().unwrap_or(0),
        content_type: ContentType::from_file_code(content_type.trim().parse().unwrap_or(0)),
        title,
    }))
}

fn apply_record(db: &mut UrlDb, id: PathId, record: UrlRecord) {
    let data = &mut db.node_mut(id).data;
    data.visits = record.visits;
    data.last_visit = record.last_visit;
    data.content_type = record.content_type;

    let title = sanitise_title(&record.title);
    if !title.is_empty() {
        data.title = Some(title);
    }
}

/// Writes the database as a version 106 history file
///
/// Hosts are written in search index order. Only leaf URLs that were
/// visited after `cutoff` are written, and hosts left with no such URLs are
/// omitted.
///
/// # Returns
///
/// The number of URL records written.
pub fn write_history<W: Write + ?Sized>(writer: &mut W, db: &UrlDb, cutoff: i64) -> StorageResult<usize> {
    writeln!(writer, "{}", HISTORY_VERSION)?;

    let paths = db.paths();
    let mut written = 0;
    let mut path_buf = String::new();

    for (_, host_id) in db.index().iter() {
        let root = db.hosts().get(host_id).paths;
        let count = paths
            .leaves(root)
            .filter(|&id| paths.get(id).data.is_retained(cutoff))
            .count();
        if count == 0 {
            continue;
        }

        writeln!(writer, "{}", db.hosts().fqdn(host_id))?;
        writeln!(writer, "{}", count)?;

        path_buf.clear();
        written += write_paths(writer, paths, root, &mut path_buf, cutoff)?;
    }

    Ok(written)
}

/// Writes the retained leaves below a node, building each path in `buf`
fn write_paths<W: Write + ?Sized>(
    writer: &mut W,
    paths: &PathTree,
    id: PathId,
    buf: &mut String,
    cutoff: i64,
) -> StorageResult<usize> {
    let node = paths.get(id);
    let len = buf.len();
    buf.push_str(&node.segment);

    let mut written = 0;
    if node.is_leaf() {
        if node.url.is_some() && node.data.is_retained(cutoff) {
            let port = if node.port != 0 {
                node.port.to_string()
            } else {
                String::new()
            };
            let thumbnail = node
                .thumbnail
                .as_ref()
                .and_then(|t| t.filename())
                .unwrap_or_default();
            let title = node.data.title.as_deref().map(sanitise_title).unwrap_or_default();

            writeln!(writer, "{}", node.scheme)?;
            writeln!(writer, "{}", port)?;
            writeln!(writer, "{}", buf)?;
            writeln!(writer, "{}", node.data.visits)?;
            writeln!(writer, "{}", node.data.last_visit)?;
            writeln!(writer, "{}", node.data.content_type.to_file_code())?;
            writeln!(writer, "{}", thumbnail)?;
            writeln!(writer, "{}", title)?;
            written = 1;
        }
    } else {
        buf.push('/');
        for &child in node.children() {
            written += write_paths(writer, paths, child, buf, cutoff)?;
        }
    }

    buf.truncate(len);
    Ok(written)
}
