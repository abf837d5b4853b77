use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, info};

use crate::error::Result;
use crate::models::{parse_year, Book, BookField, NewBook};

const SELECT_BOOKS: &str = "SELECT id, title, author, category, year FROM books";

/// Hydrate a `Book` from a row selected with `SELECT_BOOKS`. Columns cleared
/// by hand outside the app read back as empty values instead of failing.
fn book_from_row(row: &Row<'_>) -> rusqlite::Result<Book> {
    Ok(Book {
        id: row.get(0)?,
        title: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
        author: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
        category: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
        year: row.get::<_, Option<i64>>(4)?.unwrap_or_default(),
    })
}

/// Every book in insertion order.
pub fn fetch_books(conn: &Connection) -> Result<Vec<Book>> {
    let mut stmt = conn.prepare(&format!("{SELECT_BOOKS} ORDER BY id"))?;
    let books = stmt
        .query_map([], book_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    debug!(count = books.len(), "loaded books");
    Ok(books)
}

/// Books whose title contains `needle`, compared byte for byte. `instr`
/// keeps `%` and `_` literal, unlike `LIKE`.
pub fn search_books(conn: &Connection, needle: &str) -> Result<Vec<Book>> {
    if needle.is_empty() {
        return fetch_books(conn);
    }

    let mut stmt =
        conn.prepare(&format!("{SELECT_BOOKS} WHERE instr(title, ?1) > 0 ORDER BY id"))?;
    let books = stmt
        .query_map([needle], book_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    debug!(needle, count = books.len(), "searched books by title");
    Ok(books)
}

pub fn fetch_book(conn: &Connection, id: i64) -> Result<Option<Book>> {
    let book = conn
        .query_row(
            &format!("{SELECT_BOOKS} WHERE id = ?1"),
            [id],
            book_from_row,
        )
        .optional()?;
    Ok(book)
}

/// Insert a new record and return the id SQLite assigned to it.
pub fn insert_book(conn: &Connection, book: &NewBook) -> Result<i64> {
    conn.execute(
        "INSERT INTO books (title, author, category, year) VALUES (?1, ?2, ?3, ?4)",
        params![book.title, book.author, book.category, book.year],
    )?;

    let id = conn.last_insert_rowid();
    info!(id, title = %book.title, "inserted book");
    Ok(id)
}

/// Overwrite a single column of one record. The year must parse as an integer;
/// other fields are written as given, even when empty. Unknown ids are a no-op.
pub fn update_book_field(conn: &Connection, id: i64, field: BookField, value: &str) -> Result<()> {
    let sql = format!("UPDATE books SET {} = ?1 WHERE id = ?2", field.column_name());

    let updated = match field {
        BookField::Year => {
            let year = parse_year(value)?;
            conn.execute(&sql, params![year, id])?
        }
        BookField::Title | BookField::Author | BookField::Category => {
            conn.execute(&sql, params![value, id])?
        }
    };

    if updated == 0 {
        debug!(id, field = field.column_name(), "update skipped, no such book");
    } else {
        info!(id, field = field.column_name(), "updated book");
    }
    Ok(())
}

/// Remove a record. Deleting an id that is already gone is not an error.
pub fn delete_book(conn: &Connection, id: i64) -> Result<()> {
    let deleted = conn.execute("DELETE FROM books WHERE id = ?1", params![id])?;
    if deleted == 0 {
        debug!(id, "delete skipped, no such book");
    } else {
        info!(id, "deleted book");
    }
    Ok(())
}
