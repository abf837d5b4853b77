//! Core library surface for the Book Catalog TUI application.
//!
//! The binary wires these pieces together; tests and other tooling can reuse
//! the store, presenter and exporter without a terminal.
pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod logging;
pub mod models;
pub mod presenter;
pub mod ui;

/// Persistence entry points.
pub use db::{ensure_schema, Store};

pub use error::{CatalogError, ErrorKind};
pub use models::{Book, BookDraft, BookField, GridColumn, NewBook};
pub use presenter::{Notice, NoticeKind, Presenter};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
