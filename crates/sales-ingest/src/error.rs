use thiserror::Error;

/// Failures while loading the sales table.
///
/// A malformed row fails the whole load rather than being dropped, so a
/// partially-ingested dataset can never silently undercount.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("missing column `{0}` in header row")]
    MissingColumn(&'static str),
    #[error("row {row}: invalid {column} value `{value}`: {reason}")]
    DataFormat {
        /// 1-based data row number, excluding the header.
        row: usize,
        column: &'static str,
        value: String,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, IngestError>;
