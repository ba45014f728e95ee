use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for workflow operations.
pub type IngestResult<T> = Result<T, IngestError>;

#[derive(Error, Debug)]
pub enum IngestError {
    /// The chosen root does not exist, is not a directory, or cannot be read.
    #[error("cannot read source folder '{path}': {source}")]
    FilesystemAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Process was invoked with an empty selection.
    #[error("nothing selected - pick at least one file or folder")]
    NoSelection,

    /// The ingestion collaborator failed; the staging directory is left in
    /// place for inspection and no digest is written.
    #[error("ingestion failed: {message}")]
    IngestionFailure {
        staging_dir: PathBuf,
        message: String,
    },

    /// A path handed to the staging step does not resolve under the root.
    #[error("path '{path}' escapes source folder '{root}'")]
    EscapesRoot { path: PathBuf, root: PathBuf },

    /// A path was toggled that is not part of the current tree.
    #[error("unknown entry '{path}'")]
    UnknownEntry { path: PathBuf },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
