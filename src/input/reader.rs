//! Input file reading and parsing.
//!
//! The whole document is read into memory and parsed as a JSON array of
//! record-like objects. A malformed document is fatal; missing fields
//! inside a record are not (they take the documented defaults during
//! aggregation).

use crate::error::ReshapeError;
use crate::models::WeeklyRecord;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Read and parse the input record array.
pub fn read_records(path: &Path) -> Result<Vec<WeeklyRecord>, ReshapeError> {
    let content = fs::read_to_string(path).map_err(|source| ReshapeError::InputRead {
        path: path.to_path_buf(),
        source,
    })?;

    let records: Vec<WeeklyRecord> =
        serde_json::from_str(&content).map_err(|source| ReshapeError::InputParse {
            path: path.to_path_buf(),
            source,
        })?;

    debug!("parsed {} records from {}", records.len(), path.display());
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_input(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_read_valid_array() {
        let file = write_input(
            r#"[
                {"country_code": "NO", "year_week": "2020-10", "indicator": "cases", "weekly_count": 5},
                {"country_code": "SE", "year_week": "2020-10", "indicator": "deaths"}
            ]"#,
        );

        let records = read_records(file.path()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].country_code(), "NO");
        assert_eq!(records[1].weekly_count(), 0);
    }

    #[test]
    fn test_empty_array_is_valid() {
        let file = write_input("[]");
        let records = read_records(file.path()).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let err = read_records(Path::new("/nonexistent/weekly.json")).unwrap_err();
        assert!(matches!(err, ReshapeError::InputRead { .. }));
    }

    #[test]
    fn test_top_level_object_is_parse_error() {
        let file = write_input(r#"{"country_code": "NO"}"#);
        let err = read_records(file.path()).unwrap_err();
        assert!(matches!(err, ReshapeError::InputParse { .. }));
    }

    #[test]
    fn test_non_object_element_is_parse_error() {
        let file = write_input(r#"[{"country_code": "NO"}, 42]"#);
        let err = read_records(file.path()).unwrap_err();
        assert!(matches!(err, ReshapeError::InputParse { .. }));
    }
}
