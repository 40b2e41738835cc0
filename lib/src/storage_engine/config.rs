// lib/src/storage_engine/config.rs

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::errors::RxError;

/// Where the record store lives, parsed from the database connection string.
///
/// Accepted forms: `sled://<path>`, a bare filesystem path, or `memory`
/// (also `sled://memory`) for a temporary database that is removed when the
/// store is dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseTarget {
    Path(PathBuf),
    Temporary,
}

impl FromStr for DatabaseTarget {
    type Err = RxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let location = trimmed.strip_prefix("sled://").unwrap_or(trimmed);
        if location.is_empty() {
            return Err(RxError::ConfigurationError(format!(
                "Database connection string '{}' names no location",
                s
            )));
        }
        if location.eq_ignore_ascii_case("memory") || location == ":memory:" {
            return Ok(DatabaseTarget::Temporary);
        }
        if let Some((scheme, _)) = location.split_once("://") {
            return Err(RxError::ConfigurationError(format!(
                "Unsupported database scheme '{}'; expected sled://",
                scheme
            )));
        }
        Ok(DatabaseTarget::Path(PathBuf::from(location)))
    }
}

impl fmt::Display for DatabaseTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatabaseTarget::Path(path) => write!(f, "sled://{}", path.display()),
            DatabaseTarget::Temporary => f.write_str("memory"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_supported_forms() {
        assert_eq!(
            "sled://./data/rx".parse::<DatabaseTarget>().unwrap(),
            DatabaseTarget::Path(PathBuf::from("./data/rx"))
        );
        assert_eq!(
            "/var/lib/rxtrack".parse::<DatabaseTarget>().unwrap(),
            DatabaseTarget::Path(PathBuf::from("/var/lib/rxtrack"))
        );
        assert_eq!("memory".parse::<DatabaseTarget>().unwrap(), DatabaseTarget::Temporary);
        assert_eq!("sled://memory".parse::<DatabaseTarget>().unwrap(), DatabaseTarget::Temporary);
    }

    #[test]
    fn rejects_foreign_schemes_and_empty_strings() {
        assert!("mongodb://localhost/rx".parse::<DatabaseTarget>().is_err());
        assert!("sled://".parse::<DatabaseTarget>().is_err());
        assert!("  ".parse::<DatabaseTarget>().is_err());
    }
}
