//! Workbook inspection
//!
//! Builds a [`WorkbookSnapshot`] from a file on disk. Spreadsheet formats go
//! through calamine; a `.json` file is taken to be an already-extracted
//! snapshot so external extractors can feed the scoring core.

mod connections;
mod workbook;

pub use connections::{parse_connections_xml, read_connections};
pub use workbook::column_letters;

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::models::WorkbookSnapshot;

/// Extensions calamine can open
pub const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "xla", "xlam"];

/// Extensions stored as OOXML zip packages with an `xl/connections.xml` part
const OOXML_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlam"];

#[derive(Error, Debug)]
pub enum InspectError {
    #[error("Unsupported file type '{extension}' for {path} (expected one of: json, {supported})", supported = WORKBOOK_EXTENSIONS.join(", "))]
    UnsupportedExtension { path: PathBuf, extension: String },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to open workbook {path}: {source}")]
    Workbook {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },

    #[error("Invalid snapshot JSON in {path}: {source}")]
    Snapshot {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to read package {path}: {source}")]
    Package {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("Malformed XML in {part}: {source}")]
    Xml {
        part: String,
        #[source]
        source: quick_xml::Error,
    },
}

/// Inspect a workbook (or snapshot JSON) into a snapshot
pub fn inspect_workbook(path: &Path) -> Result<WorkbookSnapshot, InspectError> {
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    let snapshot = match extension.as_str() {
        "json" => load_snapshot_json(path)?,
        ext if WORKBOOK_EXTENSIONS.contains(&ext) => {
            let mut snapshot = workbook::read_workbook(path)?;
            if OOXML_EXTENSIONS.contains(&ext) {
                snapshot.connections = connections::read_connections_or_warn(path);
            }
            snapshot
        }
        _ => {
            return Err(InspectError::UnsupportedExtension {
                path: path.to_path_buf(),
                extension,
            })
        }
    };

    info!(
        "Inspected {}: {} sheets, {} formulas, {} VBA modules, {} connections",
        snapshot.file_name(),
        snapshot.sheet_count(),
        snapshot.formula_count(),
        snapshot.vba_module_count(),
        snapshot.connection_count()
    );

    Ok(snapshot)
}

fn load_snapshot_json(path: &Path) -> Result<WorkbookSnapshot, InspectError> {
    debug!("Loading snapshot JSON from {}", path.display());
    let content = std::fs::read_to_string(path).map_err(|source| InspectError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut snapshot: WorkbookSnapshot =
        serde_json::from_str(&content).map_err(|source| InspectError::Snapshot {
            path: path.to_path_buf(),
            source,
        })?;
    if snapshot.file_path.as_os_str().is_empty() {
        snapshot.file_path = path.to_path_buf();
    }
    Ok(snapshot)
}
