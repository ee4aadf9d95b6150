//! Error types for the reshaping pipeline.
//!
//! Only I/O, parse, and serialization faults are errors: a missing optional
//! field falls back to its documented default, and a record with an
//! unrecognized indicator is skipped without accumulation. All variants are
//! fatal; the run aborts and nothing is written.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal faults of a reshaping run.
#[derive(Debug, Error)]
pub enum ReshapeError {
    /// Input file missing or unreadable. Raised before any aggregation.
    #[error("failed to read input file {}: {source}", path.display())]
    InputRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Input is not a JSON array of record-like objects. Raised before any
    /// aggregation.
    #[error("input file {} is not a JSON array of records: {source}", path.display())]
    InputParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The reshaped document could not be serialized.
    #[error("failed to serialize output document: {0}")]
    Serialize(#[source] serde_json::Error),

    /// Output destination unwritable. Raised after aggregation succeeds.
    #[error("failed to write output file {}: {source}", path.display())]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
