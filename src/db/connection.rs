use std::fs;
use std::path::Path;

use rusqlite::Connection;
use tracing::{debug, info};

use crate::error::{CatalogError, Result};
use crate::models::{Book, BookField, NewBook};

use super::books;

/// Create the `books` table when it does not exist yet. Safe to run on every
/// startup; an existing table and its rows are left untouched.
pub fn ensure_schema(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS books (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT,
            author TEXT,
            category TEXT,
            year INTEGER
        )",
        [],
    )?;
    Ok(())
}

/// The single process-wide handle on the catalog database. Dropping the store
/// closes the connection.
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open (or create) the database file at `path` and make sure the schema
    /// exists before any other call can run.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| CatalogError::DataDir {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        let conn = Connection::open(path)?;
        info!(path = %path.display(), "opened catalog database");
        Self::with_connection(conn)
    }

    /// Throwaway database used by tests and previews.
    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        let store = Self { conn };
        store.initialize()?;
        Ok(store)
    }

    /// Idempotent schema setup.
    pub fn initialize(&self) -> Result<()> {
        ensure_schema(&self.conn)?;
        debug!("catalog schema ready");
        Ok(())
    }

    pub fn insert(&self, book: &NewBook) -> Result<i64> {
        books::insert_book(&self.conn, book)
    }

    pub fn list_all(&self) -> Result<Vec<Book>> {
        books::fetch_books(&self.conn)
    }

    pub fn search(&self, title_substring: &str) -> Result<Vec<Book>> {
        books::search_books(&self.conn, title_substring)
    }

    pub fn get(&self, id: i64) -> Result<Option<Book>> {
        books::fetch_book(&self.conn, id)
    }

    pub fn update_field(&self, id: i64, field: BookField, value: &str) -> Result<()> {
        books::update_book_field(&self.conn, id, field, value)
    }

    pub fn delete(&self, id: i64) -> Result<()> {
        books::delete_book(&self.conn, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initialize_is_idempotent() {
        let store = Store::open_in_memory().unwrap();
        let id = store
            .insert(&NewBook {
                title: "Dune".into(),
                author: "Herbert".into(),
                category: "Sci-Fi".into(),
                year: 1965,
            })
            .unwrap();

        store.initialize().unwrap();
        store.initialize().unwrap();

        let books = store.list_all().unwrap();
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].id, id);
    }

    #[test]
    fn open_creates_missing_parent_directories() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("dir").join("books.sqlite");

        let store = Store::open(&path).unwrap();
        assert!(store.list_all().unwrap().is_empty());
        assert!(path.exists());
    }
}
