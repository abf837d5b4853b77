use std::mem;
use std::path::PathBuf;

use anyhow::Result;
use crossterm::event::KeyCode;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Tabs, Wrap,
};
use ratatui::Frame;

use crate::models::BookField;
use crate::presenter::{NoticeKind, Presenter, COLUMN_COUNT};

use super::forms::{label_prefix, BookForm, CellEditor, ConfirmDelete, PathPrompt};
use super::helpers::{centered_rect, cursor_column, key_hints};

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Height of the tab bar.
const TABS_HEIGHT: u16 = 3;
/// Four inputs plus the surrounding border.
const FORM_HEIGHT: u16 = 6;
const SEARCH_HEIGHT: u16 = 3;
/// First and last editable grid column; column 0 holds the read-only id.
const FIRST_EDITABLE_COLUMN: usize = 1;
const LAST_EDITABLE_COLUMN: usize = COLUMN_COUNT - 1;
const SEARCH_PREFIX: &str = "Search: ";
const VALUE_PREFIX: &str = "Value: ";
const FILE_PREFIX: &str = "File: ";

/// Top-level tabs, mirroring the two pages of the catalog window.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Tab {
    Books,
    Export,
}

impl Tab {
    const TITLES: [&'static str; 2] = ["Books", "Export"];

    fn index(self) -> usize {
        match self {
            Tab::Books => 0,
            Tab::Export => 1,
        }
    }

    fn toggled(self) -> Self {
        match self {
            Tab::Books => Tab::Export,
            Tab::Export => Tab::Books,
        }
    }
}

/// Fine-grained input modes. Exactly one widget owns the keyboard at a time.
enum Mode {
    Normal,
    EditingForm,
    Searching,
    EditingCell(CellEditor),
    ConfirmDelete(ConfirmDelete),
    ExportPrompt(PathPrompt),
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Terminal front end around the [`Presenter`]. Keys become presenter calls;
/// drawing reads the presenter's grid, inputs and notice.
pub struct App {
    presenter: Presenter,
    tab: Tab,
    mode: Mode,
    form: BookForm,
    column: usize,
    default_export_path: PathBuf,
    status: Option<StatusMessage>,
}

impl App {
    pub fn new(presenter: Presenter, default_export_path: PathBuf) -> Self {
        Self {
            presenter,
            tab: Tab::Books,
            mode: Mode::Normal,
            form: BookForm::default(),
            column: FIRST_EDITABLE_COLUMN,
            default_export_path,
            status: None,
        }
    }

    pub fn presenter(&self) -> &Presenter {
        &self.presenter
    }

    /// Handle one key press. Returns `true` when the user asked to quit.
    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        if self.presenter.notice().is_some() {
            self.presenter.dismiss_notice();
            return Ok(false);
        }

        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit)?,
            Mode::EditingForm => self.handle_form_key(code)?,
            Mode::Searching => self.handle_search_key(code)?,
            Mode::EditingCell(editor) => self.handle_cell_edit(code, editor)?,
            Mode::ConfirmDelete(confirm) => self.handle_confirm_delete(code, confirm)?,
            Mode::ExportPrompt(prompt) => self.handle_export_prompt(code, prompt)?,
        };

        self.sync_status();
        Ok(exit)
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => {
                *exit = true;
                return Ok(Mode::Normal);
            }
            KeyCode::Tab | KeyCode::BackTab => {
                self.tab = self.tab.toggled();
                return Ok(Mode::Normal);
            }
            KeyCode::Char('1') => {
                self.tab = Tab::Books;
                return Ok(Mode::Normal);
            }
            KeyCode::Char('2') => {
                self.tab = Tab::Export;
                return Ok(Mode::Normal);
            }
            _ => {}
        }

        match self.tab {
            Tab::Books => self.handle_books_key(code),
            Tab::Export => {
                if matches!(code, KeyCode::Char('x') | KeyCode::Char('X') | KeyCode::Enter) {
                    self.clear_status();
                    return Ok(Mode::ExportPrompt(PathPrompt::with_default(
                        &self.default_export_path,
                    )));
                }
                Ok(Mode::Normal)
            }
        }
    }

    fn handle_books_key(&mut self, code: KeyCode) -> Result<Mode> {
        match code {
            KeyCode::Char('a') | KeyCode::Char('A') | KeyCode::Char('+') => {
                self.clear_status();
                return Ok(Mode::EditingForm);
            }
            KeyCode::Char('/') | KeyCode::Char('f') => {
                self.clear_status();
                return Ok(Mode::Searching);
            }
            KeyCode::Up => self.presenter.select_previous(),
            KeyCode::Down => self.presenter.select_next(),
            KeyCode::Left => {
                self.column = self.column.saturating_sub(1).max(FIRST_EDITABLE_COLUMN);
            }
            KeyCode::Right => {
                self.column = (self.column + 1).min(LAST_EDITABLE_COLUMN);
            }
            KeyCode::Char('r') | KeyCode::Char('R') => {
                self.presenter.reload();
                self.set_status("Reloaded.", StatusKind::Info);
            }
            KeyCode::Enter | KeyCode::Char('e') | KeyCode::Char('E') => {
                if let Some(editor) = self.open_cell_editor() {
                    self.clear_status();
                    return Ok(Mode::EditingCell(editor));
                }
                self.set_status("No book selected to edit.", StatusKind::Error);
            }
            KeyCode::Char('d') | KeyCode::Char('D') | KeyCode::Char('-') | KeyCode::Delete => {
                let grid = self.presenter.grid();
                let target = grid
                    .selected()
                    .and_then(|row| Some((grid.record_id(row)?, grid.cell(row, 1)?.to_string())));
                match target {
                    Some((id, title)) => {
                        let confirm = ConfirmDelete { id, title };
                        self.clear_status();
                        return Ok(Mode::ConfirmDelete(confirm));
                    }
                    // Nothing selected: let the presenter raise its selection notice.
                    None => self.presenter.on_delete_selected(),
                }
            }
            _ => {}
        }
        Ok(Mode::Normal)
    }

    fn handle_form_key(&mut self, code: KeyCode) -> Result<Mode> {
        match code {
            KeyCode::Esc => return Ok(Mode::Normal),
            KeyCode::Tab | KeyCode::Down => self.form.next_field(),
            KeyCode::BackTab | KeyCode::Up => self.form.previous_field(),
            KeyCode::Backspace => self.form.backspace(self.presenter.inputs_mut()),
            KeyCode::Enter => {
                self.presenter.on_save();
                if self.presenter.notice().is_none() {
                    self.form = BookForm::default();
                }
            }
            KeyCode::Char(ch) => {
                self.form.push_char(self.presenter.inputs_mut(), ch);
            }
            _ => {}
        }
        Ok(Mode::EditingForm)
    }

    fn handle_search_key(&mut self, code: KeyCode) -> Result<Mode> {
        match code {
            KeyCode::Esc | KeyCode::Enter => return Ok(Mode::Normal),
            KeyCode::Up => self.presenter.select_previous(),
            KeyCode::Down => self.presenter.select_next(),
            KeyCode::Backspace => {
                let mut query = self.presenter.search_text().to_string();
                if query.pop().is_some() {
                    self.presenter.on_search_text_changed(&query);
                }
            }
            KeyCode::Char(ch) if !ch.is_control() => {
                let mut query = self.presenter.search_text().to_string();
                query.push(ch);
                self.presenter.on_search_text_changed(&query);
            }
            _ => {}
        }
        Ok(Mode::Searching)
    }

    fn handle_cell_edit(&mut self, code: KeyCode, mut editor: CellEditor) -> Result<Mode> {
        match code {
            KeyCode::Esc => {
                self.set_status("Edit cancelled.", StatusKind::Info);
                Ok(Mode::Normal)
            }
            KeyCode::Enter => {
                self.presenter
                    .edit_cell(editor.row, editor.column, &editor.buffer);
                Ok(Mode::Normal)
            }
            KeyCode::Backspace => {
                editor.backspace();
                Ok(Mode::EditingCell(editor))
            }
            KeyCode::Char(ch) => {
                editor.push_char(ch);
                Ok(Mode::EditingCell(editor))
            }
            _ => Ok(Mode::EditingCell(editor)),
        }
    }

    fn handle_confirm_delete(&mut self, code: KeyCode, confirm: ConfirmDelete) -> Result<Mode> {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Deletion cancelled.", StatusKind::Info);
                Ok(Mode::Normal)
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                self.presenter.on_delete_selected();
                Ok(Mode::Normal)
            }
            _ => Ok(Mode::ConfirmDelete(confirm)),
        }
    }

    fn handle_export_prompt(&mut self, code: KeyCode, mut prompt: PathPrompt) -> Result<Mode> {
        match code {
            KeyCode::Esc => {
                self.presenter.on_export(None);
                self.set_status("Export cancelled.", StatusKind::Info);
                Ok(Mode::Normal)
            }
            KeyCode::Enter => {
                let target = prompt.target();
                if target.is_none() {
                    self.set_status("Export cancelled.", StatusKind::Info);
                }
                self.presenter.on_export(target.as_deref());
                Ok(Mode::Normal)
            }
            KeyCode::Backspace => {
                prompt.backspace();
                Ok(Mode::ExportPrompt(prompt))
            }
            KeyCode::Char(ch) => {
                prompt.push_char(ch);
                Ok(Mode::ExportPrompt(prompt))
            }
            _ => Ok(Mode::ExportPrompt(prompt)),
        }
    }

    fn open_cell_editor(&self) -> Option<CellEditor> {
        let grid = self.presenter.grid();
        let row = grid.selected()?;
        let field = self.presenter.layout().field(self.column)?;
        let current = grid.cell(row, self.column)?;
        Some(CellEditor::new(row, self.column, field, current))
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(TABS_HEIGHT),
                Constraint::Min(0),
                Constraint::Length(FOOTER_HEIGHT),
            ])
            .split(area);

        self.draw_tabs(frame, chunks[0]);
        match self.tab {
            Tab::Books => self.draw_books(frame, chunks[1]),
            Tab::Export => self.draw_export(frame, chunks[1]),
        }
        self.draw_footer(frame, chunks[2]);

        match &self.mode {
            Mode::EditingCell(editor) => self.draw_cell_editor(frame, area, editor),
            Mode::ConfirmDelete(confirm) => self.draw_confirm_delete(frame, area, confirm),
            Mode::ExportPrompt(prompt) => self.draw_export_prompt(frame, area, prompt),
            Mode::Normal | Mode::EditingForm | Mode::Searching => {}
        }

        self.draw_notice(frame, area);
    }

    fn draw_tabs(&self, frame: &mut Frame, area: Rect) {
        let tabs = Tabs::new(Tab::TITLES)
            .select(self.tab.index())
            .block(Block::default().borders(Borders::ALL).title("Book Catalog"))
            .highlight_style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            );
        frame.render_widget(tabs, area);
    }

    fn draw_books(&self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(FORM_HEIGHT),
                Constraint::Length(SEARCH_HEIGHT),
                Constraint::Min(0),
            ])
            .split(area);

        self.draw_form(frame, chunks[0]);
        self.draw_search(frame, chunks[1]);
        self.draw_grid(frame, chunks[2]);
    }

    fn draw_form(&self, frame: &mut Frame, area: Rect) {
        let focused = matches!(self.mode, Mode::EditingForm);
        let block = focus_block("New Book", focused);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let inputs = self.presenter.inputs();
        let lines: Vec<Line> = BookField::ALL
            .iter()
            .map(|field| self.form.build_line(inputs, *field, focused))
            .collect();
        frame.render_widget(Paragraph::new(lines), inner);

        if focused && self.presenter.notice().is_none() {
            let active = self.form.active;
            let line = BookField::ALL
                .iter()
                .position(|field| *field == active)
                .unwrap_or_default() as u16;
            let x = cursor_column(inner, &label_prefix(active), inputs.value(active));
            frame.set_cursor_position((x, inner.y + line));
        }
    }

    fn draw_search(&self, frame: &mut Frame, area: Rect) {
        let focused = matches!(self.mode, Mode::Searching);
        let block = focus_block("Search Title", focused);
        let query = self.presenter.search_text();
        let paragraph = Paragraph::new(Line::from(vec![
            Span::raw(SEARCH_PREFIX),
            Span::raw(query.to_string()),
        ]))
        .block(block.clone());
        frame.render_widget(paragraph, area);

        if focused && self.presenter.notice().is_none() {
            let inner = block.inner(area);
            frame.set_cursor_position((cursor_column(inner, SEARCH_PREFIX, query), inner.y));
        }
    }

    fn draw_grid(&self, frame: &mut Frame, area: Rect) {
        if area.height == 0 {
            return;
        }

        let grid = self.presenter.grid();
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!("Books ({})", grid.len()));

        if grid.is_empty() {
            let message = if self.presenter.search_text().is_empty() {
                "No books yet. Press 'a' to add one."
            } else {
                "No titles match the current search."
            };
            let paragraph = Paragraph::new(message)
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(paragraph, area);
            return;
        }

        let header = Row::new(self.presenter.layout().headers())
            .style(Style::default().add_modifier(Modifier::BOLD));

        let selected = grid.selected();
        let rows = grid.rows().iter().enumerate().map(|(row_idx, cells)| {
            Row::new(cells.iter().enumerate().map(|(col_idx, text)| {
                let style = if col_idx == 0 {
                    Style::default().fg(Color::DarkGray)
                } else if selected == Some(row_idx) && col_idx == self.column {
                    Style::default().add_modifier(Modifier::REVERSED)
                } else {
                    Style::default()
                };
                Cell::from(text.clone()).style(style)
            }))
        });

        let widths = [
            Constraint::Length(6),
            Constraint::Percentage(35),
            Constraint::Percentage(25),
            Constraint::Percentage(20),
            Constraint::Length(8),
        ];

        let table = Table::new(rows, widths)
            .header(header)
            .block(block)
            .row_highlight_style(Style::default().fg(Color::Yellow))
            .highlight_symbol("> ");

        let mut state = TableState::default().with_selected(selected);
        frame.render_stateful_widget(table, area, &mut state);
    }

    fn draw_export(&self, frame: &mut Frame, area: Rect) {
        let lines = vec![
            Line::from(Span::styled(
                "Export to CSV",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from("Writes every book with the header ID,Title,Author,Category,Year."),
            Line::from(format!(
                "Suggested file: {}",
                self.default_export_path.display()
            )),
            Line::from(""),
            Line::from(Span::styled(
                "Press x or Enter to choose the destination.",
                Style::default().fg(Color::Gray),
            )),
        ];
        let paragraph = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("Export"))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let paragraph =
            Paragraph::new(vec![status_line, self.footer_instructions()]).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        if self.presenter.notice().is_some() {
            return key_hints(&[("any key", "Dismiss")]);
        }
        match (&self.mode, self.tab) {
            (Mode::EditingForm, _) => key_hints(&[
                ("Tab", "Next Field"),
                ("Enter", "Save"),
                ("Esc", "Done"),
            ]),
            (Mode::Searching, _) => key_hints(&[
                ("type", "Filter Titles"),
                ("↑↓", "Select"),
                ("Enter/Esc", "Done"),
            ]),
            (Mode::EditingCell(_), _) => key_hints(&[("Enter", "Save"), ("Esc", "Cancel")]),
            (Mode::ConfirmDelete(_), _) => key_hints(&[("y", "Delete"), ("n", "Keep")]),
            (Mode::ExportPrompt(_), _) => key_hints(&[("Enter", "Export"), ("Esc", "Cancel")]),
            (Mode::Normal, Tab::Export) => key_hints(&[
                ("x", "Export"),
                ("Tab", "Books"),
                ("q", "Quit"),
            ]),
            (Mode::Normal, Tab::Books) => key_hints(&[
                ("↑↓←→", "Move"),
                ("e", "Edit Cell"),
                ("a", "Add"),
                ("/", "Search"),
                ("d", "Delete"),
                ("r", "Reload"),
                ("Tab", "Export"),
                ("q", "Quit"),
            ]),
        }
    }

    fn draw_cell_editor(&self, frame: &mut Frame, area: Rect, editor: &CellEditor) {
        let popup_area = centered_rect(60, 25, area);
        frame.render_widget(Clear, popup_area);

        let id = self
            .presenter
            .grid()
            .cell(editor.row, 0)
            .unwrap_or_default()
            .to_string();
        let block = Block::default()
            .title(format!("Edit {} (book {id})", editor.field.label()))
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            Line::from(vec![
                Span::raw(VALUE_PREFIX),
                Span::styled(editor.buffer.clone(), Style::default().fg(Color::Yellow)),
            ]),
            Line::from(""),
            Line::from(Span::styled(
                "Enter to save • Esc to cancel",
                Style::default().fg(Color::Gray),
            )),
        ];
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);

        if self.presenter.notice().is_none() {
            frame.set_cursor_position((
                cursor_column(inner, VALUE_PREFIX, &editor.buffer),
                inner.y,
            ));
        }
    }

    fn draw_confirm_delete(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmDelete) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title("Confirm Removal")
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            Line::from(format!("Delete book {} ({})?", confirm.id, confirm.title)),
            Line::from(""),
            Line::from(Span::styled(
                "Press Y to confirm or N / Esc to cancel.",
                Style::default().fg(Color::Gray),
            )),
        ];

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn draw_export_prompt(&self, frame: &mut Frame, area: Rect, prompt: &PathPrompt) {
        let popup_area = centered_rect(70, 25, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("Save CSV").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            Line::from(vec![
                Span::raw(FILE_PREFIX),
                Span::styled(prompt.path.clone(), Style::default().fg(Color::Yellow)),
            ]),
            Line::from(""),
            Line::from(Span::styled(
                "Enter to export • Esc or an empty path to cancel",
                Style::default().fg(Color::Gray),
            )),
        ];
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);

        if self.presenter.notice().is_none() {
            frame.set_cursor_position((cursor_column(inner, FILE_PREFIX, &prompt.path), inner.y));
        }
    }

    fn draw_notice(&self, frame: &mut Frame, area: Rect) {
        let Some(notice) = self.presenter.notice() else {
            return;
        };

        let popup_area = centered_rect(50, 30, area);
        frame.render_widget(Clear, popup_area);

        let border = match notice.kind {
            NoticeKind::Info => Style::default().fg(Color::Green),
            NoticeKind::Error(_) => Style::default().fg(Color::Red),
        };
        let block = Block::default()
            .title(notice.title.clone())
            .borders(Borders::ALL)
            .border_style(border);

        let lines = vec![
            Line::from(notice.message.clone()),
            Line::from(""),
            Line::from(Span::styled(
                "Press any key to continue.",
                Style::default().fg(Color::Gray),
            )),
        ];
        let paragraph = Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, popup_area);
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    /// Move the presenter's latest success message into the footer.
    fn sync_status(&mut self) {
        if let Some(text) = self.presenter.take_status() {
            self.set_status(text, StatusKind::Info);
        }
    }
}

/// Bordered block whose border turns yellow while its widget has focus.
fn focus_block(title: &str, focused: bool) -> Block<'static> {
    let style = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    Block::default()
        .borders(Borders::ALL)
        .title(title.to_string())
        .border_style(style)
}
