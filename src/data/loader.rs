//! CSV Data Loader Module
//! Reads a CSV file with an ordered encoding fallback and parses it using Polars.

use crate::data::encoding::TextEncoding;
use polars::prelude::*;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to read the CSV file with any of the attempted encodings: {tried}")]
    DataLoad { tried: String },
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse CSV: {0}")]
    Csv(#[from] PolarsError),
}

/// Result of a successful load.
#[derive(Debug, Clone)]
pub struct LoadedCsv {
    pub df: DataFrame,
    pub encoding: TextEncoding,
}

/// Handles CSV file loading with Polars.
pub struct DataLoader;

impl DataLoader {
    /// Load a CSV file, trying each encoding in order until one decodes.
    pub fn load_csv(path: &Path, encodings: &[TextEncoding]) -> Result<LoadedCsv, LoaderError> {
        info!("Loading {}", path.display());
        let bytes = std::fs::read(path).map_err(|source| LoaderError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse_with_fallback(&bytes, encodings)
    }

    /// Decode `bytes` with the first encoding that succeeds, then parse them as CSV.
    ///
    /// Decoding happens on the whole buffer before any parsing, so a failed
    /// attempt never leaves a partial table behind. A CSV syntax error after a
    /// successful decode is returned as is and does not move on to the next
    /// encoding.
    pub fn parse_with_fallback(
        bytes: &[u8],
        encodings: &[TextEncoding],
    ) -> Result<LoadedCsv, LoaderError> {
        for &encoding in encodings {
            match encoding.decode(bytes) {
                Ok(text) => {
                    info!("Successfully read the file with {encoding} encoding.");
                    let df = Self::parse_csv(text)?;
                    debug!("Parsed {} rows, {} columns", df.height(), df.width());
                    return Ok(LoadedCsv { df, encoding });
                }
                Err(e) => {
                    warn!("Failed to read with {encoding} encoding, trying next... ({e})");
                }
            }
        }

        let tried = encodings
            .iter()
            .map(|e| e.label())
            .collect::<Vec<_>>()
            .join(", ");
        Err(LoaderError::DataLoad { tried })
    }

    fn parse_csv(text: String) -> Result<DataFrame, LoaderError> {
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(10000))
            .with_ignore_errors(true)
            .into_reader_with_file_handle(Cursor::new(text.into_bytes()))
            .finish()?;
        Ok(df)
    }
}
