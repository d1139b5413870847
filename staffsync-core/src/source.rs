//! Origin systems for employee records.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

// ============================================================================
// SOURCE
// ============================================================================

/// One of the three systems the backend aggregates employee records from.
///
/// The backend is inconsistent about casing (`"CSV"` in the unified table,
/// `"csv"` in paths and stat maps, `"MySQL"` in some payloads), so parsing is
/// case-insensitive and serialization always uses the path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Source {
    /// Flat file, read-only from this client.
    Csv,
    Mysql,
    Postgresql,
}

impl Source {
    pub fn all() -> &'static [Source] {
        &[Source::Csv, Source::Mysql, Source::Postgresql]
    }

    /// Path segment used in `/sources/{source}/...` endpoints.
    pub fn as_path(&self) -> &'static str {
        match self {
            Source::Csv => "csv",
            Source::Mysql => "mysql",
            Source::Postgresql => "postgresql",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Source::Csv => "CSV",
            Source::Mysql => "MySQL",
            Source::Postgresql => "PostgreSQL",
        }
    }

    /// Returns the mutable view of this source, or `None` for the flat file.
    pub fn mutable(&self) -> Option<MutableSource> {
        match self {
            Source::Csv => None,
            Source::Mysql => Some(MutableSource::Mysql),
            Source::Postgresql => Some(MutableSource::Postgresql),
        }
    }

    pub fn is_read_only(&self) -> bool {
        self.mutable().is_none()
    }

    pub fn index(&self) -> usize {
        match self {
            Source::Csv => 0,
            Source::Mysql => 1,
            Source::Postgresql => 2,
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Source {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Source::Csv),
            "mysql" => Ok(Source::Mysql),
            "postgresql" | "postgres" => Ok(Source::Postgresql),
            other => Err(ValidationError::InvalidValue {
                field: "source".to_string(),
                reason: format!("unknown source '{}'", other),
            }),
        }
    }
}

impl TryFrom<String> for Source {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Source> for String {
    fn from(source: Source) -> Self {
        source.as_path().to_string()
    }
}

// ============================================================================
// MUTABLE SOURCE
// ============================================================================

/// A source that accepts create, update and delete requests.
///
/// Write operations take this type rather than [`Source`], so the flat-file
/// source cannot be mutated through the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MutableSource {
    Mysql,
    Postgresql,
}

impl MutableSource {
    pub fn source(&self) -> Source {
        match self {
            MutableSource::Mysql => Source::Mysql,
            MutableSource::Postgresql => Source::Postgresql,
        }
    }

    pub fn as_path(&self) -> &'static str {
        self.source().as_path()
    }
}

impl fmt::Display for MutableSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.source().fmt(f)
    }
}

impl From<MutableSource> for Source {
    fn from(source: MutableSource) -> Self {
        source.source()
    }
}
