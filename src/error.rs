//! Error taxonomy shared by the store, the exporter and the presenter. Every
//! variant is recoverable: the presenter turns them into modal notices and the
//! application keeps running.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures surfaced while managing the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A required field was blank or the year did not parse as an integer.
    #[error("{0}")]
    Validation(String),

    /// SQLite rejected a statement or the database file is unusable.
    #[error("database error: {0}")]
    Persistence(#[from] rusqlite::Error),

    /// The directory holding the database file could not be created.
    #[error("could not prepare {}: {source}", path.display())]
    DataDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A row-scoped action ran while no row was selected.
    #[error("Select the book you want to delete.")]
    Selection,

    /// Writing the CSV export failed.
    #[error("could not export to {}: {source}", path.display())]
    ExportIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Coarse classification used by notices and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Persistence,
    Selection,
    ExportIo,
}

impl CatalogError {
    pub fn validation<S: Into<String>>(message: S) -> Self {
        CatalogError::Validation(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            CatalogError::Validation(_) => ErrorKind::Validation,
            CatalogError::Persistence(_) | CatalogError::DataDir { .. } => ErrorKind::Persistence,
            CatalogError::Selection => ErrorKind::Selection,
            CatalogError::ExportIo { .. } => ErrorKind::ExportIo,
        }
    }

    /// Short heading for the modal dialog that reports this error.
    pub fn title(&self) -> &'static str {
        match self.kind() {
            ErrorKind::Validation => "Invalid Input",
            ErrorKind::Persistence => "Database Error",
            ErrorKind::Selection => "Select a Row",
            ErrorKind::ExportIo => "Export Failed",
        }
    }
}

pub type Result<T, E = CatalogError> = std::result::Result<T, E>;
