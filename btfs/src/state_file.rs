//! Flat-file persistence of a namespace.
//!
//! # File Format
//!
//! One line per entry, three comma-separated fields:
//!
//! ```text
//! kind,name,parentPath
//! ```
//!
//! - `kind`: `file` or `folder`
//! - `name`: the entry name
//! - `parentPath`: segments of the parent folder joined by `/`, the root
//!   contributing none (an entry directly under the root has an empty field)
//!
//! Lines are written in pre-order, so every folder precedes its children, and
//! loading replays them as create calls in file order.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::index::MinDegree;
use crate::namespace::{EntryKind, Namespace, NsPath, Record, RestoreSummary};

impl Record {
    /// Encode as one state-file line, without the trailing newline.
    #[must_use]
    pub fn to_line(&self) -> String {
        format!("{},{},{}", self.kind, self.name, self.parent.state_string())
    }

    /// Decode one state-file line.
    ///
    /// Returns `None` unless the line has exactly three fields and a known
    /// kind. Only a trailing `\r` is stripped: names may begin or end with
    /// whitespace.
    #[must_use]
    pub fn parse_line(line: &str) -> Option<Self> {
        let line = line.strip_suffix('\r').unwrap_or(line);
        let mut fields = line.split(',');
        let (Some(kind), Some(name), Some(parent), None) =
            (fields.next(), fields.next(), fields.next(), fields.next())
        else {
            return None;
        };

        Some(Self {
            kind: EntryKind::parse(kind)?,
            name: name.to_string(),
            parent: NsPath::parse(parent),
        })
    }
}

/// Write the namespace to `path`, replacing any existing file.
///
/// Returns the number of records written.
pub fn save(namespace: &Namespace, path: &Path) -> Result<usize, StateFileError> {
    let file = File::create(path).map_err(StateFileError::Io)?;
    let mut writer = BufWriter::new(file);

    let mut written = 0;
    for record in namespace.walk().map(Record::from) {
        writeln!(writer, "{}", record.to_line()).map_err(StateFileError::Io)?;
        written += 1;
    }
    writer.flush().map_err(StateFileError::Io)?;

    tracing::info!("File system state saved to '{}' ({written} entries)", path.display());
    Ok(written)
}

/// Read the records stored at `path`.
///
/// Malformed lines are skipped with a warning.
pub fn read_records(path: &Path) -> Result<Vec<Record>, StateFileError> {
    let file = File::open(path).map_err(StateFileError::Io)?;
    let mut records = Vec::new();

    for (number, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(StateFileError::Io)?;
        if line.trim().is_empty() {
            continue;
        }
        match Record::parse_line(&line) {
            Some(record) => records.push(record),
            None => tracing::warn!("skipping malformed line {}: {line:?}", number + 1),
        }
    }

    Ok(records)
}

/// Load a namespace from `path`.
///
/// Returns `Ok(None)` if the file does not exist, so the caller can start
/// from an empty namespace.
pub fn load(
    path: &Path,
    degree: MinDegree,
) -> Result<Option<(Namespace, RestoreSummary)>, StateFileError> {
    if !path.exists() {
        tracing::info!("No saved file system state found at '{}'", path.display());
        return Ok(None);
    }

    let records = read_records(path)?;
    let (namespace, summary) = Namespace::from_records(degree, records);

    if summary.rejected > 0 {
        tracing::warn!(
            "File system state loaded from '{}' with {} rejected records",
            path.display(),
            summary.rejected
        );
    } else {
        tracing::info!(
            "File system state loaded from '{}' ({} entries)",
            path.display(),
            summary.restored
        );
    }

    Ok(Some((namespace, summary)))
}

/// Errors that can occur while saving or loading a state file.
#[derive(Debug)]
pub enum StateFileError {
    /// I/O error.
    Io(std::io::Error),
}

impl std::fmt::Display for StateFileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "state file I/O error: {e}"),
        }
    }
}

impl std::error::Error for StateFileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for StateFileError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
