//! Request-scoped error taxonomy.
//!
//! Every variant is returned to the caller with a human-readable message;
//! none of them terminate the process. The HTTP layer maps variants onto
//! status codes in [`crate::server`].

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No searchable columns configured. Surfaces at rebuild time, not at
    /// startup, so a broken config file still lets the process boot.
    #[error("no searchable columns configured; set [search] columns in the config file")]
    NoSearchColumns,

    /// A configured search column is absent from the uploaded dataset.
    #[error("configured column \"{0}\" was not found in the uploaded file")]
    MissingColumn(String),

    /// The fixed category column is absent but a category filter was requested.
    #[error("category column \"{0}\" was not found in the uploaded file")]
    MissingCategoryColumn(&'static str),

    /// No file has been ingested yet.
    #[error("no dataset has been uploaded yet")]
    NoDataset,

    #[error("failed to parse dataset: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Unexpected failure during vectorization or similarity computation.
    #[error("computation failed: {0}")]
    Computation(String),
}
