//! CSV export of the catalog.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use tracing::info;

use crate::error::{CatalogError, Result};
use crate::models::{Book, GRID_COLUMNS};

/// Write the header row plus one row per book to `writer`.
pub fn write_csv<W: Write>(books: &[Book], writer: W) -> csv::Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(GRID_COLUMNS.iter().map(|column| column.header()))?;
    for book in books {
        writer.write_record(book.cells())?;
    }
    writer.flush()?;
    Ok(())
}

/// Create (or truncate) `path` and write `books` into it as CSV.
pub fn export_books(books: &[Book], path: &Path) -> Result<()> {
    let to_export_error = |source: io::Error| CatalogError::ExportIo {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(to_export_error)?;
    write_csv(books, file).map_err(|err| to_export_error(err.into()))?;

    info!(path = %path.display(), count = books.len(), "exported books");
    Ok(())
}
