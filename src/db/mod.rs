//! Persistence module split across logical submodules.

mod books;
mod connection;

pub use books::{delete_book, fetch_book, fetch_books, insert_book, search_books, update_book_field};
pub use connection::{ensure_schema, Store};
