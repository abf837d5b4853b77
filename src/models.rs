//! Domain models that mirror the `books` table and the grid that displays it.
//! The types stay light-weight data holders; validation lives next to the
//! data it guards so the presenter and the store agree on the rules.

use crate::error::{CatalogError, Result};

/// A stored book. Text columns that were cleared by an in-place edit come back
/// as empty strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    /// Primary key assigned by SQLite. Never reused after deletion.
    pub id: i64,
    pub title: String,
    pub author: String,
    pub category: String,
    pub year: i64,
}

impl Book {
    /// Cell texts in grid column order: id, title, author, category, year.
    pub fn cells(&self) -> [String; 5] {
        [
            self.id.to_string(),
            self.title.clone(),
            self.author.clone(),
            self.category.clone(),
            self.year.to_string(),
        ]
    }
}

/// Editable columns of the `books` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BookField {
    Title,
    Author,
    Category,
    Year,
}

impl BookField {
    pub const ALL: [BookField; 4] = [
        BookField::Title,
        BookField::Author,
        BookField::Category,
        BookField::Year,
    ];

    /// SQL column name. Only ever interpolated from this closed set.
    pub fn column_name(self) -> &'static str {
        match self {
            BookField::Title => "title",
            BookField::Author => "author",
            BookField::Category => "category",
            BookField::Year => "year",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BookField::Title => "Title",
            BookField::Author => "Author",
            BookField::Category => "Category",
            BookField::Year => "Year",
        }
    }
}

/// A column of the book grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridColumn {
    /// Read-only primary key column.
    Id,
    Field(BookField),
}

impl GridColumn {
    pub fn header(self) -> &'static str {
        match self {
            GridColumn::Id => "ID",
            GridColumn::Field(field) => field.label(),
        }
    }
}

/// Fixed column order of the grid and of the CSV export.
pub const GRID_COLUMNS: [GridColumn; 5] = [
    GridColumn::Id,
    GridColumn::Field(BookField::Title),
    GridColumn::Field(BookField::Author),
    GridColumn::Field(BookField::Category),
    GridColumn::Field(BookField::Year),
];

/// Parse a year the way users type it: surrounding whitespace and a leading
/// sign are accepted, anything else is a validation error.
pub fn parse_year(raw: &str) -> Result<i64> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| CatalogError::validation("Year must be a number."))
}

/// Validated values for a new record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub category: String,
    pub year: i64,
}

/// Raw contents of the creation form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookDraft {
    pub title: String,
    pub author: String,
    pub category: String,
    pub year: String,
}

impl BookDraft {
    pub fn new(title: &str, author: &str, category: &str, year: &str) -> Self {
        Self {
            title: title.to_string(),
            author: author.to_string(),
            category: category.to_string(),
            year: year.to_string(),
        }
    }

    pub fn value(&self, field: BookField) -> &str {
        match field {
            BookField::Title => &self.title,
            BookField::Author => &self.author,
            BookField::Category => &self.category,
            BookField::Year => &self.year,
        }
    }

    pub fn value_mut(&mut self, field: BookField) -> &mut String {
        match field {
            BookField::Title => &mut self.title,
            BookField::Author => &mut self.author,
            BookField::Category => &mut self.category,
            BookField::Year => &mut self.year,
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Check that every field is non-empty and the year parses. Text is kept
    /// exactly as typed; only the year tolerates surrounding whitespace.
    pub fn validate(&self) -> Result<NewBook> {
        if BookField::ALL
            .iter()
            .any(|field| self.value(*field).is_empty())
        {
            return Err(CatalogError::validation("All fields must be filled in."));
        }

        Ok(NewBook {
            title: self.title.clone(),
            author: self.author.clone(),
            category: self.category.clone(),
            year: parse_year(&self.year)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn complete_draft_keeps_text_as_typed() {
        let draft = BookDraft::new(" Dune ", "Herbert", "Sci-Fi", " 1965 ");
        let book = draft.validate().unwrap();
        assert_eq!(book.title, " Dune ");
        assert_eq!(book.year, 1965);
    }

    #[test]
    fn whitespace_only_text_counts_as_filled_in() {
        let draft = BookDraft::new("   ", "Herbert", "Sci-Fi", "1965");
        assert_eq!(draft.validate().unwrap().title, "   ");

        let draft = BookDraft::new("Dune", "Herbert", "Sci-Fi", "   ");
        assert_eq!(draft.validate().unwrap_err().kind(), ErrorKind::Validation);
    }

    #[test]
    fn any_blank_field_is_rejected() {
        for field in BookField::ALL {
            let mut draft = BookDraft::new("Dune", "Herbert", "Sci-Fi", "1965");
            draft.value_mut(field).clear();
            let err = draft.validate().unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Validation, "field {field:?}");
        }
    }

    #[test]
    fn non_integer_year_is_rejected() {
        let draft = BookDraft::new("Dune", "Herbert", "Sci-Fi", "nineteen");
        assert_eq!(draft.validate().unwrap_err().kind(), ErrorKind::Validation);
        assert!(parse_year("19.5").is_err());
        assert_eq!(parse_year("-44").unwrap(), -44);
        assert_eq!(parse_year("+2001").unwrap(), 2001);
    }

    #[test]
    fn grid_columns_follow_export_header() {
        let headers: Vec<_> = GRID_COLUMNS.iter().map(|c| c.header()).collect();
        assert_eq!(headers, ["ID", "Title", "Author", "Category", "Year"]);
    }
}
