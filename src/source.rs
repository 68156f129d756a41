//! Student data sources
//!
//! The assessment endpoint never owns its data. It asks an injected
//! [`StudentSource`] for the current roster, so the in-memory list can be
//! swapped for a file or a real store without touching the classifier.

use std::path::PathBuf;

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::models::{FieldViolation, RecordError, StudentRecord};

/// A roster entry that failed validation
#[derive(Debug, Clone, Serialize)]
pub struct InvalidRecord {
    pub index: usize,
    pub student_id: String,
    pub violations: Vec<FieldViolation>,
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read student data from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed student data in {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{} student record(s) failed validation", .0.len())]
    InvalidRecords(Vec<InvalidRecord>),
}

/// Anything that can produce the current ordered set of students.
pub trait StudentSource: Send + Sync {
    fn students(&self) -> Result<Vec<StudentRecord>, SourceError>;
}

/// Validate raw entries, collecting every failure instead of stopping at the
/// first one. Missing and mistyped fields count as violations of the entry.
pub fn validate_roster(entries: &[Map<String, Value>]) -> Result<Vec<StudentRecord>, SourceError> {
    let mut records = Vec::with_capacity(entries.len());
    let mut invalid = Vec::new();

    for (index, entry) in entries.iter().enumerate() {
        let student_id = entry
            .get("student_id")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        match StudentRecord::try_from(entry) {
            Ok(record) => records.push(record),
            Err(err) => invalid.push(InvalidRecord {
                index,
                student_id,
                violations: err.violations().to_vec(),
            }),
        }
    }

    if invalid.is_empty() {
        Ok(records)
    } else {
        Err(SourceError::InvalidRecords(invalid))
    }
}

/// The built-in Stage 1 roster
#[derive(Debug, Clone)]
pub struct FixedRoster {
    students: Vec<StudentRecord>,
}

impl FixedRoster {
    pub fn new() -> Result<Self, RecordError> {
        let students = vec![
            StudentRecord::new("LASU_CS_001", 2.2, 55, 2, 2, 4)?,
            StudentRecord::new("LASU_CS_002", 4.1, 95, 5, 15, 1)?,
            StudentRecord::new("LASU_CS_003", 3.4, 80, 4, 8, 2)?,
            StudentRecord::new("LASU_CS_004", 2.8, 92, 3, 5, 3)?,
            StudentRecord::new("LASU_CS_005", 3.9, 88, 4, 12, 2)?,
            StudentRecord::new("LASU_CS_006", 1.9, 45, 1, 1, 5)?,
        ];

        Ok(Self { students })
    }
}

impl StudentSource for FixedRoster {
    fn students(&self) -> Result<Vec<StudentRecord>, SourceError> {
        Ok(self.students.clone())
    }
}

/// Roster stored as a JSON array on disk, re-read on every call.
///
/// The roster is all or nothing: one invalid entry fails the whole call with
/// [`SourceError::InvalidRecords`] naming every bad entry, rather than
/// serving a partial list. Only a file that is not a JSON array of objects
/// is [`SourceError::Malformed`].
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl StudentSource for JsonFileSource {
    fn students(&self) -> Result<Vec<StudentRecord>, SourceError> {
        let contents = std::fs::read_to_string(&self.path).map_err(|source| SourceError::Io {
            path: self.path.clone(),
            source,
        })?;

        let entries: Vec<Map<String, Value>> =
            serde_json::from_str(&contents).map_err(|source| SourceError::Malformed {
                path: self.path.clone(),
                source,
            })?;

        let records = validate_roster(&entries)?;
        tracing::debug!("Loaded {} students from {}", records.len(), self.path.display());
        Ok(records)
    }
}
