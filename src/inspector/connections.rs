//! External data connections from `xl/connections.xml`

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};
use zip::result::ZipError;
use zip::ZipArchive;

use super::InspectError;
use crate::models::DataConnection;

const CONNECTIONS_PART: &str = "xl/connections.xml";

/// Read the connections part of an OOXML package.
///
/// A package without the part has no connections.
pub fn read_connections(path: &Path) -> Result<Vec<DataConnection>, InspectError> {
    let file = File::open(path).map_err(|source| InspectError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let package_err = |source: ZipError| InspectError::Package {
        path: path.to_path_buf(),
        source,
    };
    let mut archive = ZipArchive::new(file).map_err(package_err)?;

    let mut part = match archive.by_name(CONNECTIONS_PART) {
        Ok(part) => part,
        Err(ZipError::FileNotFound) => {
            debug!("{} has no {}", path.display(), CONNECTIONS_PART);
            return Ok(Vec::new());
        }
        Err(e) => return Err(package_err(e)),
    };

    let mut xml = String::new();
    part.read_to_string(&mut xml)
        .map_err(|source| InspectError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    parse_connections_xml(&xml)
}

/// Like [`read_connections`], but a failure is logged and yields no connections
pub(super) fn read_connections_or_warn(path: &Path) -> Vec<DataConnection> {
    read_connections(path).unwrap_or_else(|e| {
        warn!("Could not read data connections: {}", e);
        Vec::new()
    })
}

/// Parse the `<connections>` part.
///
/// The connection string comes from the first of `dbPr@connection`,
/// `webPr@url`, `textPr@sourceFile` or the connection's own `odcFile`.
pub fn parse_connections_xml(xml: &str) -> Result<Vec<DataConnection>, InspectError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();

    let mut out = Vec::new();
    let mut current: Option<(DataConnection, String)> = None;

    loop {
        match reader
            .read_event_into(&mut buf)
            .map_err(|source| InspectError::Xml {
                part: CONNECTIONS_PART.to_string(),
                source,
            })? {
            Event::Eof => break,
            Event::Start(e) if e.local_name().as_ref() == b"connection" => {
                current = Some(start_connection(&e));
            }
            Event::Empty(e) if e.local_name().as_ref() == b"connection" => {
                out.push(finish_connection(start_connection(&e)));
            }
            Event::Start(e) | Event::Empty(e) => {
                if let Some((conn, _)) = current.as_mut() {
                    if conn.connection_string.is_empty() {
                        if let Some(value) = source_attribute(&e) {
                            conn.connection_string = value;
                        }
                    }
                }
            }
            Event::End(e) if e.local_name().as_ref() == b"connection" => {
                if let Some(pending) = current.take() {
                    out.push(finish_connection(pending));
                }
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(out)
}

fn start_connection(e: &BytesStart<'_>) -> (DataConnection, String) {
    let conn = DataConnection {
        name: attribute(e, b"name").unwrap_or_default(),
        description: attribute(e, b"description").unwrap_or_default(),
        connection_string: String::new(),
    };
    (conn, attribute(e, b"odcFile").unwrap_or_default())
}

fn finish_connection((mut conn, odc_file): (DataConnection, String)) -> DataConnection {
    if conn.connection_string.is_empty() {
        conn.connection_string = odc_file;
    }
    conn
}

/// Connection target carried by a `dbPr`, `webPr` or `textPr` child
fn source_attribute(e: &BytesStart<'_>) -> Option<String> {
    let key: &[u8] = match e.local_name().as_ref() {
        b"dbPr" => b"connection",
        b"webPr" => b"url",
        b"textPr" => b"sourceFile",
        _ => return None,
    };
    attribute(e, key)
}

fn attribute(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .with_checks(false)
        .flatten()
        .find(|a| a.key.local_name().as_ref() == key)
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}
