use crate::error::{CatalogError, Result};
use crate::models::{Book, BookField, GridColumn, GRID_COLUMNS};

/// Number of columns in the book grid.
pub const COLUMN_COUNT: usize = GRID_COLUMNS.len();

/// Column-index to field mapping, checked once when the presenter starts.
#[derive(Debug, Clone)]
pub struct GridLayout {
    columns: [GridColumn; COLUMN_COUNT],
}

impl GridLayout {
    pub fn standard() -> Result<Self> {
        Self::new(GRID_COLUMNS)
    }

    /// Accept a layout only when column 0 is the id and every editable field
    /// shows up exactly once.
    pub fn new(columns: [GridColumn; COLUMN_COUNT]) -> Result<Self> {
        if columns[0] != GridColumn::Id {
            return Err(CatalogError::validation("grid column 0 must hold the id"));
        }
        for field in BookField::ALL {
            let hits = columns
                .iter()
                .filter(|column| **column == GridColumn::Field(field))
                .count();
            if hits != 1 {
                return Err(CatalogError::validation(format!(
                    "grid must show the {} column exactly once",
                    field.column_name()
                )));
            }
        }
        Ok(Self { columns })
    }

    pub fn column(&self, index: usize) -> Option<GridColumn> {
        self.columns.get(index).copied()
    }

    /// The field behind an editable column, `None` for the id or out of range.
    pub fn field(&self, index: usize) -> Option<BookField> {
        match self.column(index)? {
            GridColumn::Id => None,
            GridColumn::Field(field) => Some(field),
        }
    }

    pub fn headers(&self) -> [&'static str; COLUMN_COUNT] {
        self.columns.map(GridColumn::header)
    }
}

/// Text cells mirrored from the store plus the current row selection. The grid
/// never talks to the store; the presenter refills it after every mutation.
#[derive(Debug, Default, Clone)]
pub struct Grid {
    rows: Vec<[String; COLUMN_COUNT]>,
    selected: Option<usize>,
}

impl Grid {
    /// Replace every row. The selection follows the record it pointed at and is
    /// cleared when that record is no longer shown.
    pub fn load(&mut self, books: &[Book]) {
        let selected_id = self.selected.and_then(|row| self.record_id(row));
        self.rows = books.iter().map(Book::cells).collect();
        self.selected =
            selected_id.and_then(|id| books.iter().position(|book| book.id == id));
    }

    pub fn rows(&self) -> &[[String; COLUMN_COUNT]] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.rows.get(row)?.get(column).map(String::as_str)
    }

    /// Overwrite a cell's text. Returns `false` when the cell does not exist.
    pub(crate) fn set_cell(&mut self, row: usize, column: usize, text: &str) -> bool {
        match self.rows.get_mut(row).and_then(|cells| cells.get_mut(column)) {
            Some(cell) => {
                *cell = text.to_string();
                true
            }
            None => false,
        }
    }

    /// Record id shown in the row's id cell.
    pub fn record_id(&self, row: usize) -> Option<i64> {
        self.cell(row, 0)?.parse().ok()
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Select a row, or clear the selection with `None`. Out-of-range rows
    /// clear it as well.
    pub fn select(&mut self, row: Option<usize>) {
        self.selected = row.filter(|row| *row < self.rows.len());
    }

    pub fn select_next(&mut self) {
        if self.rows.is_empty() {
            return;
        }
        self.selected = Some(match self.selected {
            Some(row) => (row + 1).min(self.rows.len() - 1),
            None => 0,
        });
    }

    pub fn select_previous(&mut self) {
        if self.rows.is_empty() {
            return;
        }
        self.selected = Some(self.selected.map_or(0, |row| row.saturating_sub(1)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn books(count: i64) -> Vec<Book> {
        (1..=count)
            .map(|id| Book {
                id,
                title: format!("Book {id}"),
                author: "Author".into(),
                category: "Category".into(),
                year: 2000 + id,
            })
            .collect()
    }

    #[test]
    fn standard_layout_maps_columns_to_fields() {
        let layout = GridLayout::standard().unwrap();
        assert_eq!(layout.column(0), Some(GridColumn::Id));
        assert_eq!(layout.field(0), None);
        assert_eq!(layout.field(1), Some(BookField::Title));
        assert_eq!(layout.field(2), Some(BookField::Author));
        assert_eq!(layout.field(3), Some(BookField::Category));
        assert_eq!(layout.field(4), Some(BookField::Year));
        assert_eq!(layout.field(5), None);
    }

    #[test]
    fn layouts_without_leading_id_or_with_duplicates_are_rejected() {
        let mut swapped = GRID_COLUMNS;
        swapped.swap(0, 1);
        assert!(GridLayout::new(swapped).is_err());

        let mut duplicated = GRID_COLUMNS;
        duplicated[4] = GridColumn::Field(BookField::Title);
        assert!(GridLayout::new(duplicated).is_err());
    }

    #[test]
    fn reload_follows_the_selected_record() {
        let mut grid = Grid::default();
        grid.load(&books(3));
        grid.select(Some(1));

        let shifted: Vec<_> = books(3).into_iter().skip(1).collect();
        grid.load(&shifted);
        assert_eq!(grid.selected(), Some(0));
        assert_eq!(grid.record_id(0), Some(2));

        grid.load(&books(1));
        assert_eq!(grid.selected(), None);

        grid.select(Some(0));
        grid.load(&[]);
        assert_eq!(grid.selected(), None);
    }

    #[test]
    fn selection_moves_within_bounds() {
        let mut grid = Grid::default();
        grid.select_next();
        assert_eq!(grid.selected(), None);

        grid.load(&books(2));
        grid.select_previous();
        assert_eq!(grid.selected(), Some(0));
        grid.select_next();
        grid.select_next();
        assert_eq!(grid.selected(), Some(1));

        grid.select(Some(7));
        assert_eq!(grid.selected(), None);
    }

    #[test]
    fn cells_render_books_as_text() {
        let mut grid = Grid::default();
        grid.load(&books(1));
        assert_eq!(grid.cell(0, 0), Some("1"));
        assert_eq!(grid.cell(0, 4), Some("2001"));
        assert_eq!(grid.record_id(0), Some(1));
        assert!(!grid.set_cell(3, 1, "nope"));
    }
}
