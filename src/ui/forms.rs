use std::path::{Path, PathBuf};

use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::models::{BookDraft, BookField};

/// Tracks which input of the "new book" form has focus. The text itself lives
/// in the presenter's draft so the presenter can read it on save.
#[derive(Clone, Copy)]
pub(crate) struct BookForm {
    pub(crate) active: BookField,
}

impl Default for BookForm {
    fn default() -> Self {
        Self {
            active: BookField::Title,
        }
    }
}

impl BookForm {
    /// Move focus forward, wrapping from Year back to Title.
    pub(crate) fn next_field(&mut self) {
        self.active = match self.active {
            BookField::Title => BookField::Author,
            BookField::Author => BookField::Category,
            BookField::Category => BookField::Year,
            BookField::Year => BookField::Title,
        };
    }

    pub(crate) fn previous_field(&mut self) {
        self.active = match self.active {
            BookField::Title => BookField::Year,
            BookField::Author => BookField::Title,
            BookField::Category => BookField::Author,
            BookField::Year => BookField::Category,
        };
    }

    /// Append a character to the focused input. Control characters are
    /// ignored; anything printable is accepted so validation can speak up on
    /// save.
    pub(crate) fn push_char(&self, draft: &mut BookDraft, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        draft.value_mut(self.active).push(ch);
        true
    }

    pub(crate) fn backspace(&self, draft: &mut BookDraft) {
        draft.value_mut(self.active).pop();
    }

    /// Render one input line, highlighting the focused field and hinting at
    /// empty ones.
    pub(crate) fn build_line(
        &self,
        draft: &BookDraft,
        field: BookField,
        focused: bool,
    ) -> Line<'static> {
        let value = draft.value(field);
        let is_active = focused && self.active == field;

        let display = if value.is_empty() {
            "<required>".to_string()
        } else {
            value.to_string()
        };

        let style = if is_active {
            Style::default().fg(Color::Yellow)
        } else if value.is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        Line::from(vec![
            Span::raw(label_prefix(field)),
            Span::styled(display, style),
        ])
    }
}

/// `"Title:    "` style prefix, padded so the inputs line up.
pub(crate) fn label_prefix(field: BookField) -> String {
    format!("{:<10}", format!("{}:", field.label()))
}

/// In-progress edit of a single grid cell.
#[derive(Clone)]
pub(crate) struct CellEditor {
    pub(crate) row: usize,
    pub(crate) column: usize,
    pub(crate) field: BookField,
    pub(crate) buffer: String,
}

impl CellEditor {
    pub(crate) fn new(row: usize, column: usize, field: BookField, current: &str) -> Self {
        Self {
            row,
            column,
            field,
            buffer: current.to_string(),
        }
    }

    pub(crate) fn push_char(&mut self, ch: char) {
        if !ch.is_control() {
            self.buffer.push(ch);
        }
    }

    pub(crate) fn backspace(&mut self) {
        self.buffer.pop();
    }
}

/// Pending confirmation before a row is deleted.
#[derive(Clone)]
pub(crate) struct ConfirmDelete {
    pub(crate) id: i64,
    pub(crate) title: String,
}

/// Destination prompt shown before exporting.
#[derive(Clone)]
pub(crate) struct PathPrompt {
    pub(crate) path: String,
}

impl PathPrompt {
    pub(crate) fn with_default(path: &Path) -> Self {
        Self {
            path: path.display().to_string(),
        }
    }

    pub(crate) fn push_char(&mut self, ch: char) {
        if !ch.is_control() {
            self.path.push(ch);
        }
    }

    pub(crate) fn backspace(&mut self) {
        self.path.pop();
    }

    /// The chosen file, or `None` when the prompt was left blank.
    pub(crate) fn target(&self) -> Option<PathBuf> {
        let trimmed = self.path.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(PathBuf::from(trimmed))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn focus_cycles_in_both_directions() {
        let mut form = BookForm::default();
        form.next_field();
        form.next_field();
        form.next_field();
        assert!(form.active == BookField::Year);
        form.next_field();
        assert!(form.active == BookField::Title);
        form.previous_field();
        assert!(form.active == BookField::Year);
    }

    #[test]
    fn typing_goes_to_the_focused_input() {
        let mut draft = BookDraft::default();
        let mut form = BookForm::default();
        form.push_char(&mut draft, 'D');
        form.next_field();
        assert!(form.push_char(&mut draft, 'H'));
        assert!(!form.push_char(&mut draft, '\u{7}'));
        form.backspace(&mut draft);
        form.push_char(&mut draft, 'h');

        assert_eq!(draft.title, "D");
        assert_eq!(draft.author, "h");
    }

    #[test]
    fn blank_prompt_means_cancel() {
        let mut prompt = PathPrompt::with_default(Path::new("books.csv"));
        assert_eq!(prompt.target(), Some(PathBuf::from("books.csv")));
        prompt.path = "   ".into();
        assert_eq!(prompt.target(), None);
    }
}
