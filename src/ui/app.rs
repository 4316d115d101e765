use std::mem;

use anyhow::{Context, Result};
use chrono::{Datelike, Local};
use crossterm::event::KeyCode;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Bar, BarChart, BarGroup, Block, Borders, Clear, Gauge, List, ListItem, ListState, Paragraph,
    Wrap,
};
use ratatui::Frame;

use crate::catalog::{Change, Library, SearchField, WritePolicy};
use crate::models::Book;
use crate::stats::Stats;
use crate::store::StoreError;

use super::forms::{BookField, BookForm, ConfirmRemove, MIN_YEAR};
use super::helpers::{centered_rect, read_badge, surface_error, visible_window};
use super::screens::{LibraryScreen, SearchScreen};

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Width of the navigation sidebar.
const SIDEBAR_WIDTH: u16 = 26;
/// Height allocation per book card in the library view.
const BOOK_CARD_HEIGHT: u16 = 5;
/// Authors listed on the statistics screen.
const TOP_AUTHORS: usize = 10;

/// Views reachable from the sidebar.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub(crate) enum Screen {
    Library,
    AddBook,
    Search,
    Stats,
}

impl Screen {
    const ALL: [Screen; 4] = [Screen::Library, Screen::AddBook, Screen::Search, Screen::Stats];

    fn title(self) -> &'static str {
        match self {
            Screen::Library => "View Library",
            Screen::AddBook => "Add Book",
            Screen::Search => "Search Books",
            Screen::Stats => "Library Statistics",
        }
    }

    fn index(self) -> usize {
        Self::ALL.iter().position(|s| *s == self).unwrap_or(0)
    }

    fn cycle(self, offset: isize) -> Screen {
        let len = Self::ALL.len() as isize;
        Self::ALL[(self.index() as isize + offset).rem_euclid(len) as usize]
    }

    fn from_digit(ch: char) -> Option<Screen> {
        let idx = ch.to_digit(10)?.checked_sub(1)? as usize;
        Self::ALL.get(idx).copied()
    }
}

/// Modal overlays on top of the current screen.
enum Mode {
    Normal,
    ConfirmRemove(ConfirmRemove),
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
enum StatusKind {
    Info,
    Warning,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Warning => Style::default().fg(Color::Yellow),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state shared across the TUI. Owns the session's
/// [`Library`] for as long as the terminal is up.
pub struct App {
    library: Library,
    authors: Vec<String>,
    current_year: i64,
    screen: Screen,
    mode: Mode,
    status: Option<StatusMessage>,
    list: LibraryScreen,
    form: BookForm,
    search: SearchScreen,
}

impl App {
    /// `load_error` is the failure, if any, hit while opening the library; it
    /// is shown in the footer on the first frame.
    pub fn new(library: Library, load_error: Option<StoreError>) -> Self {
        let mut app = Self {
            authors: Vec::new(),
            current_year: i64::from(Local::now().year()),
            library,
            screen: Screen::Library,
            mode: Mode::Normal,
            status: None,
            list: LibraryScreen::default(),
            form: BookForm::default(),
            search: SearchScreen::default(),
        };
        app.reload_authors();
        if let Some(err) = load_error {
            app.set_status(
                format!("Error loading library: {err}. Starting with an empty library."),
                StatusKind::Error,
            );
        }
        app
    }

    pub fn library(&self) -> &Library {
        &self.library
    }

    /// Returns `true` when the user asked to quit.
    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit)?,
            Mode::ConfirmRemove(confirm) => self.handle_confirm_remove(code, confirm),
        };

        Ok(exit)
    }

    /// Explicit save, mostly useful with the manual write policy.
    pub fn handle_ctrl_s(&mut self) {
        if !self.library.is_dirty() {
            self.set_status("Nothing to save.", StatusKind::Info);
            return;
        }
        match self.library.flush() {
            Ok(()) => self.set_status("Library saved.", StatusKind::Info),
            Err(err) => self.set_status(format!("Error saving library: {err}"), StatusKind::Error),
        }
    }

    /// Flush anything still pending before the process exits.
    pub fn finish(&mut self) -> Result<()> {
        self.library
            .flush()
            .context("failed to save library on exit")
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        match self.screen {
            Screen::Library => {
                let len = self.library.len();
                match code {
                    KeyCode::Char('q') | KeyCode::Esc => *exit = true,
                    KeyCode::Up => self.list.move_selection(-1, len),
                    KeyCode::Down => self.list.move_selection(1, len),
                    KeyCode::PageUp => self.list.move_selection(-5, len),
                    KeyCode::PageDown => self.list.move_selection(5, len),
                    KeyCode::Home => self.list.selected = 0,
                    KeyCode::End => self.list.select_last(len),
                    KeyCode::Char('-') | KeyCode::Delete => {
                        if let Some(book) = self.list.current(&self.library) {
                            let confirm = ConfirmRemove::from(book);
                            self.clear_status();
                            return Ok(Mode::ConfirmRemove(confirm));
                        }
                        self.set_status("No book selected to remove.", StatusKind::Error);
                    }
                    other => self.handle_navigation(other),
                }
            }
            Screen::Stats => match code {
                KeyCode::Char('q') | KeyCode::Esc => *exit = true,
                other => self.handle_navigation(other),
            },
            Screen::AddBook => self.handle_form_key(code),
            Screen::Search => self.handle_search_key(code),
        }
        Ok(Mode::Normal)
    }

    /// Sidebar shortcuts shared by the read-only screens.
    fn handle_navigation(&mut self, code: KeyCode) {
        let target = match code {
            KeyCode::Tab => Some(self.screen.cycle(1)),
            KeyCode::BackTab => Some(self.screen.cycle(-1)),
            KeyCode::Char(ch) => Screen::from_digit(ch),
            _ => None,
        };
        if let Some(screen) = target {
            self.open_screen(screen);
        }
    }

    fn open_screen(&mut self, screen: Screen) {
        if screen != self.screen {
            self.clear_status();
        }
        if screen == Screen::Library {
            self.list.ensure_in_bounds(self.library.len());
        }
        self.screen = screen;
    }

    fn handle_form_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => {
                if !self.form.cancel_autocomplete() {
                    self.open_screen(Screen::Library);
                }
            }
            KeyCode::Tab => {
                let consumed = self.form.has_active_suggestion() && self.form.accept_suggestion();
                if !consumed {
                    self.form.next_field();
                }
                self.form.update_suggestion(&self.authors);
            }
            KeyCode::Down => {
                self.form.next_field();
                self.form.update_suggestion(&self.authors);
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.form.previous_field();
                self.form.update_suggestion(&self.authors);
            }
            KeyCode::Left => self.form.adjust(-1),
            KeyCode::Right => self.form.adjust(1),
            KeyCode::Backspace => {
                self.form.backspace();
                self.form.update_suggestion(&self.authors);
            }
            KeyCode::Enter => {
                if let Err(err) = self.submit_form() {
                    let message = surface_error(&err);
                    self.form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            }
            KeyCode::Char(ch) => {
                if self.form.push_char(ch) {
                    self.form.error = None;
                    self.form.update_suggestion(&self.authors);
                }
            }
            _ => {}
        }
    }

    fn handle_search_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => self.open_screen(Screen::Library),
            KeyCode::Tab | KeyCode::Right => self.search.cycle_field(1),
            KeyCode::BackTab | KeyCode::Left => self.search.cycle_field(-1),
            KeyCode::Up => self.search.move_selection(-1),
            KeyCode::Down => self.search.move_selection(1),
            KeyCode::PageUp => self.search.move_selection(-5),
            KeyCode::PageDown => self.search.move_selection(5),
            KeyCode::Backspace => {
                self.search.query.pop();
            }
            KeyCode::Enter => {
                let count = self.search.run(&self.library);
                if count == 0 {
                    self.set_status("No matching books found.", StatusKind::Warning);
                } else {
                    self.set_status(format!("Found {count} book(s)."), StatusKind::Info);
                }
            }
            KeyCode::Char(ch) => {
                if !ch.is_control() {
                    self.search.query.push(ch);
                }
            }
            _ => {}
        }
    }

    fn handle_confirm_remove(&mut self, code: KeyCode, confirm: ConfirmRemove) -> Mode {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Removal cancelled.", StatusKind::Info);
                Mode::Normal
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                self.perform_remove(&confirm);
                Mode::Normal
            }
            _ => Mode::ConfirmRemove(confirm),
        }
    }

    fn submit_form(&mut self) -> Result<()> {
        let new_book = self.form.parse_inputs(self.current_year)?;
        let title = new_book.title.clone();
        let Change { value: id, saved } = self.library.add_book(new_book);

        self.form = BookForm::default();
        self.reload_authors();
        self.list.focus(&self.library, id);
        self.report_change(saved, "Book added successfully!", &title);
        Ok(())
    }

    fn perform_remove(&mut self, confirm: &ConfirmRemove) {
        let Change { value, saved } = self.library.remove_book(confirm.id);
        if value.is_none() {
            self.set_status("That book is no longer in the library.", StatusKind::Error);
            return;
        }

        self.list.ensure_in_bounds(self.library.len());
        self.search.retain_existing(&self.library);
        self.reload_authors();
        self.report_change(saved, "Book removed successfully!", &confirm.title);
    }

    /// Status line for a mutation, depending on whether it reached the disk.
    fn report_change(&mut self, saved: Result<(), StoreError>, done: &str, title: &str) {
        match saved {
            Ok(()) if self.library.policy() == WritePolicy::Manual => self.set_status(
                format!("{done} ({title}) Press Ctrl+S to save."),
                StatusKind::Info,
            ),
            Ok(()) => self.set_status(format!("{done} ({title})"), StatusKind::Info),
            Err(err) => self.set_status(
                format!("{done} ({title}) Error saving library: {err}"),
                StatusKind::Error,
            ),
        }
    }

    /// Distinct authors for autocomplete, ordered case-insensitively.
    fn reload_authors(&mut self) {
        let mut authors: Vec<String> = self
            .library
            .books()
            .iter()
            .map(|b| b.author.trim().to_string())
            .filter(|a| !a.is_empty())
            .collect();
        authors.sort_by(|a, b| a.to_lowercase().cmp(&b.to_lowercase()).then(a.cmp(b)));
        authors.dedup();
        self.authors = authors;
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

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(0)])
            .split(area);
        self.draw_sidebar(frame, columns[0]);

        let main = columns[1];
        let footer_height = FOOTER_HEIGHT.min(main.height);
        let (content_area, footer_area) = if main.height > footer_height {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(footer_height)])
                .split(main);
            (chunks[0], chunks[1])
        } else {
            (main, main)
        };

        match self.screen {
            Screen::Library => self.draw_library(frame, content_area),
            Screen::AddBook => self.draw_add_form(frame, content_area),
            Screen::Search => self.draw_search(frame, content_area),
            Screen::Stats => self.draw_stats(frame, content_area, &self.library.statistics()),
        }

        if main.height >= footer_height {
            self.draw_footer(frame, footer_area);
        }

        if let Mode::ConfirmRemove(confirm) = &self.mode {
            self.draw_confirm_remove(frame, area, confirm);
        }
    }

    fn draw_sidebar(&self, frame: &mut Frame, area: Rect) {
        let items: Vec<ListItem> = Screen::ALL
            .iter()
            .enumerate()
            .map(|(idx, screen)| ListItem::new(format!("{} {}", idx + 1, screen.title())))
            .collect();

        let mut title = String::from("Navigation");
        if self.library.is_dirty() {
            title.push_str(" *");
        }
        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title(title))
            .highlight_style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("> ");

        let mut state = ListState::default();
        state.select(Some(self.screen.index()));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_library(&self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(1)])
            .split(area);

        let header = Paragraph::new(Line::from(vec![
            Span::styled(
                "Your Library",
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!("  -  {} book(s)", self.library.len())),
        ]))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Personal Library Manager"),
        );
        frame.render_widget(header, chunks[0]);

        if self.library.is_empty() {
            let message = Paragraph::new("Your library is empty. Press '2' to add a book.")
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL));
            frame.render_widget(message, chunks[1]);
            return;
        }

        self.render_book_cards(frame, chunks[1], self.library.books(), self.list.selected);
    }

    fn render_book_cards(&self, frame: &mut Frame, area: Rect, books: &[Book], selected: usize) {
        if books.is_empty() || area.height == 0 {
            return;
        }

        let capacity = (area.height / BOOK_CARD_HEIGHT).max(1) as usize;
        let window = visible_window(selected, capacity, books.len());
        let constraints: Vec<Constraint> = window
            .clone()
            .map(|_| Constraint::Length(BOOK_CARD_HEIGHT))
            .collect();
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        for (chunk, book_index) in rows.iter().zip(window) {
            if chunk.height == 0 {
                continue;
            }
            let book = &books[book_index];
            let is_selected = book_index == selected;

            let mut block = Block::default().borders(Borders::ALL);
            if is_selected {
                block = block.border_style(Style::default().fg(Color::Yellow));
            }

            let title = if is_selected {
                format!("> {}", book.title)
            } else {
                book.title.clone()
            };
            let lines = vec![
                Line::from(vec![
                    Span::styled(title, Style::default().add_modifier(Modifier::BOLD)),
                    Span::raw("  "),
                    read_badge(book),
                ]),
                Line::from(Span::styled(
                    format!("by {}", book.author),
                    Style::default().fg(Color::Gray),
                )),
                Line::from(Span::styled(
                    format!(
                        "Published: {}  |  Genre: {}  |  Added: {}",
                        book.publication_year, book.genre, book.added_date
                    ),
                    Style::default().fg(Color::DarkGray),
                )),
            ];

            let paragraph = Paragraph::new(lines)
                .block(block)
                .wrap(Wrap { trim: true });
            frame.render_widget(paragraph, *chunk);
        }
    }

    fn draw_add_form(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title("Add a New Book")
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let mut lines: Vec<Line> = [
            BookField::Title,
            BookField::Author,
            BookField::Year,
            BookField::Genre,
            BookField::Read,
        ]
        .into_iter()
        .map(|field| self.form.build_line(field))
        .collect();
        lines.push(Line::from(""));

        if let Some(error) = &self.form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                format!(
                    "Year must be between {MIN_YEAR} and {}. Enter to submit.",
                    self.current_year
                ),
                Style::default().fg(Color::Gray),
            )));
        }

        frame.render_widget(Paragraph::new(lines), inner);

        if let Some(len) = self.form.value_len(self.form.active) {
            let prefix = self.form.active.label().chars().count() + 2;
            let cursor_x = inner.x + (prefix + len) as u16;
            let cursor_y = inner.y + self.form.active.row();
            if cursor_x < inner.right() && cursor_y < inner.bottom() {
                frame.set_cursor_position((cursor_x, cursor_y));
            }
        }
    }

    fn draw_search(&self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(1),
                Constraint::Min(1),
            ])
            .split(area);

        let input_block = Block::default().borders(Borders::ALL).title("Search Books");
        let input = Paragraph::new(Span::raw(format!("Enter search term: {}", self.search.query)))
            .block(input_block.clone());
        frame.render_widget(input, chunks[0]);
        let inner = input_block.inner(chunks[0]);
        let cursor_x = inner.x
            + "Enter search term: ".len() as u16
            + self.search.query.chars().count() as u16;
        if cursor_x < inner.right() {
            frame.set_cursor_position((cursor_x, inner.y));
        }

        let mut field_spans = vec![Span::raw(" Search by: ")];
        for field in SearchField::ALL {
            let style = if field == self.search.field {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            let marker = if field == self.search.field { "(x)" } else { "( )" };
            field_spans.push(Span::styled(format!("{marker} {field}   "), style));
        }
        frame.render_widget(Paragraph::new(Line::from(field_spans)), chunks[1]);

        let results_block = Block::default().borders(Borders::ALL).title("Results");
        match &self.search.results {
            None => {
                let hint = Paragraph::new("Type a term and press Enter to search.")
                    .alignment(Alignment::Center)
                    .block(results_block);
                frame.render_widget(hint, chunks[2]);
            }
            Some(results) if results.is_empty() => {
                let warning = Paragraph::new(Span::styled(
                    "No matching books found.",
                    Style::default().fg(Color::Yellow),
                ))
                .alignment(Alignment::Center)
                .block(results_block);
                frame.render_widget(warning, chunks[2]);
            }
            Some(results) => {
                let items: Vec<ListItem> = results
                    .iter()
                    .map(|book| {
                        ListItem::new(Line::from(vec![
                            Span::raw(book.display_line()),
                            Span::styled(
                                format!("  [{}]  ", book.genre),
                                Style::default().fg(Color::Gray),
                            ),
                            read_badge(book),
                        ]))
                    })
                    .collect();
                let list = List::new(items)
                    .block(results_block)
                    .highlight_style(Style::default().fg(Color::Yellow))
                    .highlight_symbol("> ");
                let mut state = ListState::default();
                state.select(Some(self.search.selected));
                frame.render_stateful_widget(list, chunks[2], &mut state);
            }
        }
    }

    fn draw_stats(&self, frame: &mut Frame, area: Rect, stats: &Stats) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(7),
                Constraint::Length(3),
                Constraint::Min(0),
            ])
            .split(area);

        let summary = Paragraph::new(vec![
            Line::from(format!("Total books: {}", stats.total_books)),
            Line::from(format!("Books read: {}", stats.read_books)),
            Line::from(format!("Books unread: {}", stats.unread_books)),
            Line::from(format!("Percentage read: {:.2}%", stats.percent_read)),
            Line::from(format!("Percentage unread: {:.2}%", stats.percent_unread())),
        ])
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Library Statistics"),
        );
        frame.render_widget(summary, chunks[0]);

        if stats.total_books == 0 {
            let message = Paragraph::new("Add some books to see charts here.")
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL));
            frame.render_widget(message, chunks[1]);
            return;
        }

        let gauge = Gauge::default()
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Read vs Unread Books"),
            )
            .gauge_style(Style::default().fg(Color::Green).bg(Color::Red))
            .ratio((stats.percent_read / 100.0).clamp(0.0, 1.0))
            .label(format!(
                "{} read / {} unread",
                stats.read_books, stats.unread_books
            ));
        frame.render_widget(gauge, chunks[1]);

        let charts = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(40),
                Constraint::Percentage(35),
                Constraint::Percentage(25),
            ])
            .split(chunks[2]);

        let genre_bars: Vec<Bar> = stats
            .genres
            .iter()
            .map(|(genre, count)| {
                Bar::default()
                    .value(*count as u64)
                    .label(Line::from(genre.clone()))
            })
            .collect();
        let genres = BarChart::default()
            .block(Block::default().borders(Borders::ALL).title("Books by Genre"))
            .direction(Direction::Horizontal)
            .bar_width(1)
            .bar_gap(0)
            .bar_style(Style::default().fg(Color::Blue))
            .data(BarGroup::default().bars(&genre_bars));
        frame.render_widget(genres, charts[0]);

        let decade_bars: Vec<Bar> = stats
            .decades
            .iter()
            .map(|(decade, count)| {
                Bar::default()
                    .value(*count as u64)
                    .label(Line::from(format!("{decade}s")))
            })
            .collect();
        let decades = BarChart::default()
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Books by Publication Decade"),
            )
            .bar_width(5)
            .bar_gap(1)
            .bar_style(Style::default().fg(Color::Cyan))
            .data(BarGroup::default().bars(&decade_bars));
        frame.render_widget(decades, charts[1]);

        let authors: Vec<ListItem> = stats
            .authors
            .iter()
            .take(TOP_AUTHORS)
            .map(|(author, count)| ListItem::new(format!("{count:>3}  {author}")))
            .collect();
        let authors = List::new(authors).block(Block::default().borders(Borders::ALL).title("Top Authors"));
        frame.render_widget(authors, charts[2]);
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

        let paragraph = Paragraph::new(vec![status_line, self.footer_instructions()])
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let hints: &[(&str, &str)] = match (&self.mode, self.screen) {
            (Mode::ConfirmRemove(_), _) => &[("[Y]", "Remove"), ("[N/Esc]", "Cancel")],
            (_, Screen::Library) => &[
                ("[1-4/Tab]", "Views"),
                ("[Up/Down]", "Navigate"),
                ("[-]", "Remove"),
                ("[Ctrl+S]", "Save"),
                ("[q]", "Quit"),
            ],
            (_, Screen::AddBook) => &[
                ("[Tab]", "Next/Accept"),
                ("[Left/Right]", "Genre/Read"),
                ("[Space]", "Toggle Read"),
                ("[Enter]", "Submit"),
                ("[Esc]", "Back"),
            ],
            (_, Screen::Search) => &[
                ("[Enter]", "Search"),
                ("[Tab/Left/Right]", "Field"),
                ("[Up/Down]", "Results"),
                ("[Esc]", "Back"),
            ],
            (_, Screen::Stats) => &[("[1-4/Tab]", "Views"), ("[q]", "Quit")],
        };

        let mut spans = Vec::with_capacity(hints.len() * 2);
        for (key, action) in hints {
            spans.push(Span::styled(key.to_string(), key_style));
            spans.push(Span::raw(format!(" {action}   ")));
        }
        Line::from(spans)
    }

    fn draw_confirm_remove(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmRemove) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title("Confirm Removal")
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            Line::from(format!("Remove \"{}\" by {}?", confirm.title, confirm.author)),
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

    #[cfg(test)]
    fn selected_book_id(&self) -> Option<crate::models::BookId> {
        self.list.current(&self.library).map(|b| b.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewBook;
    use crate::store::JsonStore;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn app_in(dir: &tempfile::TempDir, policy: WritePolicy) -> App {
        let (library, err) = Library::open(JsonStore::new(dir.path().join("library.json")), policy);
        App::new(library, err)
    }

    fn press(app: &mut App, codes: impl IntoIterator<Item = KeyCode>) {
        for code in codes {
            assert!(!app.handle_key(code).unwrap());
        }
    }

    fn type_text(app: &mut App, text: &str) {
        press(app, text.chars().map(KeyCode::Char));
    }

    fn rendered(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal.draw(|frame| app.draw(frame)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn add_book_through_form() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(&dir, WritePolicy::WriteThrough);

        press(&mut app, [KeyCode::Char('2')]);
        type_text(&mut app, "Dune");
        press(&mut app, [KeyCode::Tab]);
        type_text(&mut app, "Frank Herbert");
        press(&mut app, [KeyCode::Tab]);
        press(&mut app, [KeyCode::Backspace; 4]);
        type_text(&mut app, "1965");
        press(&mut app, [KeyCode::Tab, KeyCode::Right, KeyCode::Right, KeyCode::Tab]);
        press(&mut app, [KeyCode::Enter]);

        let books = app.library().books();
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].title, "Dune");
        assert_eq!(books[0].author, "Frank Herbert");
        assert_eq!(books[0].publication_year.as_year(), Some(1965));
        assert_eq!(books[0].genre, "Science");
        assert!(books[0].read_status);
        assert!(!app.library().is_dirty());
        assert!(rendered(&app).contains("Book added successfully!"));
    }

    #[test]
    fn invalid_form_shows_error_and_adds_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(&dir, WritePolicy::WriteThrough);

        press(&mut app, [KeyCode::Char('2'), KeyCode::Enter]);

        assert!(app.library().is_empty());
        assert_eq!(app.form.error.as_deref(), Some("Book title is required."));
    }

    #[test]
    fn remove_requires_confirmation() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(&dir, WritePolicy::WriteThrough);
        let _ = app.library.add_book(NewBook::new("Dune", "Herbert", 1965, "Science", true));
        let _ = app.library.add_book(NewBook::new("1984", "Orwell", 1949, "Fiction", false));

        press(&mut app, [KeyCode::Down, KeyCode::Char('-'), KeyCode::Char('n')]);
        assert_eq!(app.library().len(), 2);

        press(&mut app, [KeyCode::Char('-')]);
        assert!(rendered(&app).contains("Remove \"1984\" by Orwell?"));
        press(&mut app, [KeyCode::Char('y')]);

        assert_eq!(app.library().len(), 1);
        assert_eq!(app.library().books()[0].title, "Dune");
        assert_eq!(app.selected_book_id(), Some(app.library().books()[0].id));
    }

    #[test]
    fn search_view_lists_matches() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(&dir, WritePolicy::WriteThrough);
        let _ = app.library.add_book(NewBook::new("Dune", "Herbert", 1965, "Science", true));
        let _ = app.library.add_book(NewBook::new("1984", "Orwell", 1949, "Fiction", false));

        press(&mut app, [KeyCode::Char('3')]);
        type_text(&mut app, "orwell");
        press(&mut app, [KeyCode::Tab, KeyCode::Enter]);

        let results = app.search.results.as_ref().unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "1984");
        let screen = rendered(&app);
        assert!(screen.contains("1984 by Orwell (1949)"));
        assert!(screen.contains(" Unread "));

        press(&mut app, [KeyCode::Backspace; 6]);
        type_text(&mut app, "tolkien");
        press(&mut app, [KeyCode::Enter]);
        assert!(rendered(&app).contains("No matching books found."));
    }

    #[test]
    fn stats_view_renders_totals() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(&dir, WritePolicy::WriteThrough);
        let _ = app.library.add_book(NewBook::new("Dune", "Herbert", 1965, "Science", true));
        let _ = app.library.add_book(NewBook::new("1984", "Orwell", 1949, "Fiction", false));

        press(&mut app, [KeyCode::Char('4')]);
        let screen = rendered(&app);

        assert!(screen.contains("Total books: 2"));
        assert!(screen.contains("Percentage read: 50.00%"));
        assert!(screen.contains("Percentage unread: 50.00%"));
        assert!(screen.contains("Books by Publication Decade"));
    }

    #[test]
    fn manual_policy_saves_on_ctrl_s() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("library.json");
        let mut app = app_in(&dir, WritePolicy::Manual);
        let _ = app.library.add_book(NewBook::new("Dune", "Herbert", 1965, "Science", true));
        assert!(!path.exists());

        app.handle_ctrl_s();

        assert!(path.exists());
        assert!(!app.library().is_dirty());
    }

    #[test]
    fn load_error_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("library.json"), "not json").unwrap();

        let app = app_in(&dir, WritePolicy::WriteThrough);

        assert!(app.library().is_empty());
        let status = app.status.as_ref().unwrap();
        assert_eq!(status.kind, StatusKind::Error);
        assert!(status.text.starts_with("Error loading library"));
    }

    #[test]
    fn quit_from_library() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(&dir, WritePolicy::WriteThrough);
        assert!(app.handle_key(KeyCode::Char('q')).unwrap());
    }
}
