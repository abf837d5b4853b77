//! View-model that keeps the book grid in step with the store. Every user
//! action maps to one `on_*` call: the presenter issues the store call, reloads
//! the grid from the store and, when something goes wrong, raises a modal
//! [`Notice`] instead of returning the error. Nothing here is fatal.

mod grid;

use std::path::Path;

use tracing::{debug, warn};

use crate::db::Store;
use crate::error::{CatalogError, ErrorKind, Result};
use crate::export::export_books;
use crate::models::BookDraft;

pub use grid::{Grid, GridLayout, COLUMN_COUNT};

/// How a notice should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error(ErrorKind),
}

/// A message the user has to acknowledge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub message: String,
    pub kind: NoticeKind,
}

impl Notice {
    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self.kind {
            NoticeKind::Info => None,
            NoticeKind::Error(kind) => Some(kind),
        }
    }
}

pub struct Presenter {
    store: Store,
    layout: GridLayout,
    grid: Grid,
    inputs: BookDraft,
    search_text: String,
    notice: Option<Notice>,
    status: Option<String>,
}

impl Presenter {
    /// Take ownership of the store, check the column mapping and fill the grid.
    pub fn new(store: Store) -> Result<Self> {
        let layout = GridLayout::standard()?;
        let mut presenter = Self {
            store,
            layout,
            grid: Grid::default(),
            inputs: BookDraft::default(),
            search_text: String::new(),
            notice: None,
            status: None,
        };
        presenter.try_reload()?;
        Ok(presenter)
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn inputs(&self) -> &BookDraft {
        &self.inputs
    }

    pub fn inputs_mut(&mut self) -> &mut BookDraft {
        &mut self.inputs
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn dismiss_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    /// One-line summary of the last successful action, consumed by the footer.
    pub fn take_status(&mut self) -> Option<String> {
        self.status.take()
    }

    pub fn select(&mut self, row: Option<usize>) {
        self.grid.select(row);
    }

    pub fn select_next(&mut self) {
        self.grid.select_next();
    }

    pub fn select_previous(&mut self) {
        self.grid.select_previous();
    }

    /// Create a record from the form inputs. Blank fields or a bad year raise a
    /// validation notice and leave both the store and the inputs untouched.
    pub fn on_save(&mut self) {
        let book = match self.inputs.validate() {
            Ok(book) => book,
            Err(err) => return self.report(err),
        };

        match self.store.insert(&book) {
            Ok(_) => {
                self.inputs.clear();
                self.status = Some(format!("Saved \"{}\".", book.title));
                self.reload();
            }
            Err(err) => self.report(err),
        }
    }

    /// Live filter by title. An empty query shows every record.
    pub fn on_search_text_changed(&mut self, text: &str) {
        self.search_text = text.to_string();
        match self.store.search(text) {
            Ok(books) => {
                debug!(query = text, rows = books.len(), "filtered grid");
                self.grid.load(&books);
            }
            Err(err) => self.report(err),
        }
    }

    /// Write the text now shown in `(row, column)` back to the store. The id
    /// column and cells outside the grid are ignored. A rejected value raises a
    /// notice and reloads the grid so the stored value is shown again.
    pub fn on_cell_edited(&mut self, row: usize, column: usize) {
        let Some(field) = self.layout.field(column) else {
            return;
        };
        let (Some(id), Some(value)) = (self.grid.record_id(row), self.grid.cell(row, column))
        else {
            return;
        };
        let value = value.to_string();

        match self.store.update_field(id, field, &value) {
            Ok(()) => {
                self.status = Some(format!("Updated {} of book {id}.", field.label()));
            }
            Err(err) => {
                self.report(err);
                self.reload();
            }
        }
    }

    /// Type `text` into a grid cell and fire the cell-edited handler. The id
    /// column is read-only.
    pub fn edit_cell(&mut self, row: usize, column: usize, text: &str) {
        if self.layout.field(column).is_none() {
            return;
        }
        if self.grid.set_cell(row, column, text) {
            self.on_cell_edited(row, column);
        }
    }

    /// Delete the record in the selected row.
    pub fn on_delete_selected(&mut self) {
        let Some(id) = self.grid.selected().and_then(|row| self.grid.record_id(row)) else {
            return self.report(CatalogError::Selection);
        };

        match self.store.delete(id) {
            Ok(()) => {
                self.status = Some(format!("Deleted book {id}."));
                self.reload();
            }
            Err(err) => self.report(err),
        }
    }

    /// Export every record to `path`. `None` means the user cancelled the
    /// destination prompt and nothing happens.
    pub fn on_export(&mut self, path: Option<&Path>) {
        let Some(path) = path else {
            return;
        };

        let result = self
            .store
            .list_all()
            .and_then(|books| export_books(&books, path).map(|_| books.len()));

        match result {
            Ok(count) => {
                self.notice = Some(Notice {
                    title: "Export Complete".to_string(),
                    message: format!("Exported {count} books to {}.", path.display()),
                    kind: NoticeKind::Info,
                });
            }
            Err(err) => self.report(err),
        }
    }

    /// Refill the grid with every record and drop any active search.
    pub fn reload(&mut self) {
        if let Err(err) = self.try_reload() {
            self.report(err);
        }
    }

    fn try_reload(&mut self) -> Result<()> {
        let books = self.store.list_all()?;
        self.search_text.clear();
        self.grid.load(&books);
        debug!(rows = books.len(), "reloaded grid");
        Ok(())
    }

    fn report(&mut self, err: CatalogError) {
        warn!(error = %err, "action failed");
        self.notice = Some(Notice {
            title: err.title().to_string(),
            message: err.to_string(),
            kind: NoticeKind::Error(err.kind()),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewBook;

    fn presenter() -> Presenter {
        Presenter::new(Store::open_in_memory().unwrap()).unwrap()
    }

    fn fill(presenter: &mut Presenter, title: &str, author: &str, category: &str, year: &str) {
        *presenter.inputs_mut() = BookDraft::new(title, author, category, year);
    }

    fn seed(presenter: &mut Presenter, titles: &[&str]) {
        for title in titles {
            fill(presenter, title, "Author", "Category", "2000");
            presenter.on_save();
            assert!(presenter.notice().is_none());
        }
    }

    fn error_kind(presenter: &Presenter) -> Option<ErrorKind> {
        presenter.notice().and_then(Notice::error_kind)
    }

    #[test]
    fn save_inserts_clears_inputs_and_reloads() {
        let mut presenter = presenter();
        fill(&mut presenter, "Dune", "Herbert", "Sci-Fi", "1965");
        presenter.on_save();

        assert!(presenter.notice().is_none());
        assert_eq!(presenter.inputs(), &BookDraft::default());
        assert_eq!(presenter.grid().len(), 1);
        assert_eq!(presenter.grid().rows()[0][1], "Dune");
        assert_eq!(presenter.take_status().as_deref(), Some("Saved \"Dune\"."));
    }

    #[test]
    fn save_with_blank_field_reports_validation_and_keeps_inputs() {
        let mut presenter = presenter();
        fill(&mut presenter, "Dune", "", "Sci-Fi", "1965");
        presenter.on_save();

        assert_eq!(error_kind(&presenter), Some(ErrorKind::Validation));
        assert_eq!(presenter.inputs().title, "Dune");
        assert!(presenter.store().list_all().unwrap().is_empty());
    }

    #[test]
    fn save_stores_text_exactly_as_typed() {
        let mut presenter = presenter();
        fill(&mut presenter, " Dune ", "Herbert", "Sci-Fi", " 1965 ");
        presenter.on_save();
        fill(&mut presenter, "   ", "Herbert", "Sci-Fi", "1965");
        presenter.on_save();

        assert!(presenter.notice().is_none());
        let titles: Vec<_> = presenter
            .store()
            .list_all()
            .unwrap()
            .into_iter()
            .map(|book| book.title)
            .collect();
        assert_eq!(titles, [" Dune ", "   "]);
    }

    #[test]
    fn save_with_bad_year_reports_validation() {
        let mut presenter = presenter();
        fill(&mut presenter, "Dune", "Herbert", "Sci-Fi", "sixties");
        presenter.on_save();

        assert_eq!(error_kind(&presenter), Some(ErrorKind::Validation));
        assert!(presenter.store().list_all().unwrap().is_empty());
    }

    #[test]
    fn search_filters_and_empty_query_shows_everything() {
        let mut presenter = presenter();
        seed(&mut presenter, &["Dune", "Emma", "Dune Messiah"]);

        presenter.on_search_text_changed("Dune");
        assert_eq!(presenter.grid().len(), 2);
        assert_eq!(presenter.search_text(), "Dune");

        presenter.on_search_text_changed("");
        assert_eq!(presenter.grid().len(), 3);
    }

    #[test]
    fn cell_edit_updates_only_that_field() {
        let mut presenter = presenter();
        seed(&mut presenter, &["Dune"]);
        let id = presenter.grid().record_id(0).unwrap();

        presenter.edit_cell(0, 2, "Frank Herbert");

        let book = presenter.store().get(id).unwrap().unwrap();
        assert_eq!(book.author, "Frank Herbert");
        assert_eq!(book.title, "Dune");
        assert!(presenter.notice().is_none());
    }

    #[test]
    fn bad_year_edit_is_rejected_and_grid_reverts() {
        let mut presenter = presenter();
        seed(&mut presenter, &["Dune"]);
        let id = presenter.grid().record_id(0).unwrap();

        presenter.edit_cell(0, 4, "notanumber");

        assert_eq!(error_kind(&presenter), Some(ErrorKind::Validation));
        assert_eq!(presenter.grid().cell(0, 4), Some("2000"));
        assert_eq!(presenter.store().get(id).unwrap().unwrap().year, 2000);
    }

    #[test]
    fn id_column_is_read_only() {
        let mut presenter = presenter();
        seed(&mut presenter, &["Dune"]);

        presenter.edit_cell(0, 0, "99");
        presenter.on_cell_edited(0, 0);

        assert_eq!(presenter.grid().cell(0, 0), Some("1"));
        assert!(presenter.store().get(1).unwrap().is_some());
    }

    #[test]
    fn blanking_a_text_field_after_creation_is_persisted() {
        let mut presenter = presenter();
        seed(&mut presenter, &["Dune"]);

        presenter.edit_cell(0, 1, "");

        assert!(presenter.notice().is_none());
        assert_eq!(presenter.store().get(1).unwrap().unwrap().title, "");
    }

    #[test]
    fn delete_without_selection_reports_selection_error() {
        let mut presenter = presenter();
        seed(&mut presenter, &["Dune"]);
        presenter.select(None);

        presenter.on_delete_selected();

        assert_eq!(error_kind(&presenter), Some(ErrorKind::Selection));
        assert_eq!(presenter.store().list_all().unwrap().len(), 1);
    }

    #[test]
    fn delete_removes_selected_row_and_reloads() {
        let mut presenter = presenter();
        seed(&mut presenter, &["Dune", "Emma"]);
        presenter.select(Some(1));

        presenter.on_delete_selected();

        let titles: Vec<_> = presenter
            .store()
            .list_all()
            .unwrap()
            .into_iter()
            .map(|book| book.title)
            .collect();
        assert_eq!(titles, ["Dune"]);
        assert_eq!(presenter.grid().len(), 1);
        assert_eq!(presenter.grid().selected(), None);
    }

    #[test]
    fn filtering_away_the_selected_row_leaves_nothing_to_delete() {
        let mut presenter = presenter();
        seed(&mut presenter, &["Dune", "Emma", "Dune Messiah"]);
        presenter.select(Some(1));

        presenter.on_search_text_changed("Dune");
        assert_eq!(presenter.grid().selected(), None);
        presenter.on_delete_selected();

        assert_eq!(error_kind(&presenter), Some(ErrorKind::Selection));
        assert_eq!(presenter.store().list_all().unwrap().len(), 3);
    }

    #[test]
    fn selection_stays_on_the_same_book_when_rows_shift() {
        let mut presenter = presenter();
        seed(&mut presenter, &["Dune", "Emma", "Dune Messiah"]);
        presenter.select(Some(2));

        presenter.on_search_text_changed("Dune");
        assert_eq!(presenter.grid().selected(), Some(1));
        presenter.on_delete_selected();

        let titles: Vec<_> = presenter
            .store()
            .list_all()
            .unwrap()
            .into_iter()
            .map(|book| book.title)
            .collect();
        assert_eq!(titles, ["Dune", "Emma"]);
    }

    #[test]
    fn store_failures_become_persistence_notices() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("books.sqlite");
        let mut presenter = Presenter::new(Store::open(&path).unwrap()).unwrap();

        rusqlite::Connection::open(&path)
            .unwrap()
            .execute_batch("DROP TABLE books")
            .unwrap();

        fill(&mut presenter, "Dune", "Herbert", "Sci-Fi", "1965");
        presenter.on_save();
        assert_eq!(error_kind(&presenter), Some(ErrorKind::Persistence));
        assert_eq!(presenter.inputs().title, "Dune");
        presenter.dismiss_notice();

        presenter.on_search_text_changed("Dune");
        assert_eq!(error_kind(&presenter), Some(ErrorKind::Persistence));
        presenter.dismiss_notice();

        presenter.store().initialize().unwrap();
        presenter.on_save();
        assert!(presenter.notice().is_none());
        assert_eq!(presenter.grid().len(), 1);
    }

    #[test]
    fn reload_after_mutation_drops_active_search() {
        let mut presenter = presenter();
        seed(&mut presenter, &["Dune", "Emma"]);
        presenter.on_search_text_changed("Emma");
        assert_eq!(presenter.grid().len(), 1);

        fill(&mut presenter, "Persuasion", "Austen", "Novel", "1817");
        presenter.on_save();

        assert_eq!(presenter.search_text(), "");
        assert_eq!(presenter.grid().len(), 3);
    }

    #[test]
    fn cancelled_export_does_nothing() {
        let mut presenter = presenter();
        presenter.on_export(None);
        assert!(presenter.notice().is_none());
    }

    #[test]
    fn export_reports_success_and_failure() {
        let tmp = tempfile::TempDir::new().unwrap();
        let mut presenter = presenter();
        presenter
            .store()
            .insert(&NewBook {
                title: "Dune".into(),
                author: "Herbert".into(),
                category: "Sci-Fi".into(),
                year: 1965,
            })
            .unwrap();

        let path = tmp.path().join("books.csv");
        presenter.on_export(Some(&path));
        let notice = presenter.dismiss_notice().unwrap();
        assert_eq!(notice.kind, NoticeKind::Info);
        assert!(notice.message.contains("Exported 1 books"));
        assert!(path.exists());

        presenter.on_export(Some(&tmp.path().join("missing").join("books.csv")));
        assert_eq!(error_kind(&presenter), Some(ErrorKind::ExportIo));
    }

    #[test]
    fn edits_against_vanished_rows_are_silent() {
        let mut presenter = presenter();
        seed(&mut presenter, &["Dune"]);
        presenter.store().delete(1).unwrap();

        presenter.edit_cell(0, 4, "1970");

        assert!(presenter.notice().is_none());
        assert!(presenter.store().list_all().unwrap().is_empty());
    }
}
