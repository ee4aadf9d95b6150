//! Output document rendering.
//!
//! Renders the reshaped document as pretty-printed JSON with a stable,
//! human-readable indent and writes it to the output path. Rendering is
//! separate from writing so a dry run never touches the filesystem, and
//! the file write stays the final step of a run.

use crate::error::ReshapeError;
use crate::models::ReshapedData;
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Render the document as pretty JSON with `indent` spaces per level.
pub fn render_document(document: &ReshapedData, indent: usize) -> Result<String, ReshapeError> {
    let indent_bytes = vec![b' '; indent];
    let formatter = PrettyFormatter::with_indent(&indent_bytes);

    let mut buf = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut buf, formatter);
    document
        .serialize(&mut serializer)
        .map_err(ReshapeError::Serialize)?;

    // serde_json never emits invalid UTF-8.
    Ok(String::from_utf8(buf).expect("rendered JSON is UTF-8"))
}

/// Render and write the document to `path`.
pub fn write_document(
    document: &ReshapedData,
    path: &Path,
    indent: usize,
) -> Result<(), ReshapeError> {
    let content = render_document(document, indent)?;

    fs::write(path, &content).map_err(|source| ReshapeError::OutputWrite {
        path: path.to_path_buf(),
        source,
    })?;

    debug!("wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::reshape;
    use crate::models::WeeklyRecord;
    use serde_json::json;

    fn sample_document() -> ReshapedData {
        let records: Vec<WeeklyRecord> = serde_json::from_value(json!([
            {
                "country": "Norway",
                "country_code": "NO",
                "continent": "Europe",
                "population": 5367580,
                "source": "weekly data",
                "year_week": "2020-10",
                "indicator": "cases",
                "weekly_count": 5,
                "cumulative_count": 50,
                "rate_14_day": 1.5
            },
            {
                "country_code": "NO",
                "year_week": "2020-10",
                "indicator": "deaths",
                "weekly_count": 1,
                "cumulative_count": 10
            }
        ]))
        .unwrap();

        reshape(&records).0
    }

    #[test]
    fn test_render_uses_four_space_indent() {
        let rendered = render_document(&sample_document(), 4).unwrap();

        assert!(rendered.starts_with("{\n    \"NO\""));
        assert!(rendered.contains("\n        \"properties\""));
    }

    #[test]
    fn test_render_honors_configured_indent() {
        let rendered = render_document(&sample_document(), 2).unwrap();
        assert!(rendered.starts_with("{\n  \"NO\""));
    }

    #[test]
    fn test_rendered_world_entry_has_no_rate_fields() {
        let rendered = render_document(&sample_document(), 4).unwrap();
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();

        let world_week = &value["WORLD"]["data"]["2020-10"];
        assert_eq!(world_week["cases"], json!(5));
        assert!(world_week.get("rate_14_day_cases").is_none());

        let country_week = &value["NO"]["data"]["2020-10"];
        assert_eq!(country_week["rate_14_day_cases"], json!(1.5));
    }

    #[test]
    fn test_render_is_deterministic() {
        let document = sample_document();
        assert_eq!(
            render_document(&document, 4).unwrap(),
            render_document(&document, 4).unwrap()
        );
    }

    #[test]
    fn test_write_then_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pandemicData.json");

        let document = sample_document();
        write_document(&document, &path, 4).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, render_document(&document, 4).unwrap());
    }

    #[test]
    fn test_unwritable_destination_is_write_error() {
        let err = write_document(&sample_document(), Path::new("/nonexistent/out.json"), 4)
            .unwrap_err();
        assert!(matches!(err, ReshapeError::OutputWrite { .. }));
    }
}
