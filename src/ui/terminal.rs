use std::io::{self, Stdout};
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use super::app::App;

/// Spin up the terminal backend, enter the draw loop, and keep processing input
/// until the user quits. Unsaved changes are flushed once the terminal is
/// restored.
pub fn run_app(app: &mut App) -> Result<()> {
    let mut stdout = io::stdout();
    enable_raw_mode().context("failed to enable raw mode")?;
    execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("failed to create terminal backend")?;

    let result = event_loop(&mut terminal, app);
    let cleaned = cleanup_terminal(&mut terminal);
    finish_session(app, result, cleaned)
}

/// Save pending changes before reporting loop or cleanup failures.
fn finish_session(app: &mut App, result: Result<()>, cleaned: Result<()>) -> Result<()> {
    let flushed = app.finish();
    result?;
    cleaned?;
    flushed
}

fn event_loop(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal
            .draw(|frame| app.draw(frame))
            .context("failed to draw frame")?;

        if !event::poll(Duration::from_millis(250)).context("event polling failed")? {
            continue;
        }
        let Event::Key(key_event) = event::read().context("failed to read event")? else {
            continue;
        };
        if key_event.kind != KeyEventKind::Press {
            continue;
        }

        if key_event.modifiers.contains(KeyModifiers::CONTROL) {
            match key_event.code {
                KeyCode::Char('s') => {
                    app.handle_ctrl_s();
                    continue;
                }
                KeyCode::Char('c') => return Ok(()),
                _ => {}
            }
        }

        if app.handle_key(key_event.code)? {
            return Ok(());
        }
    }
}

fn cleanup_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal
        .show_cursor()
        .context("failed to restore cursor visibility")
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;

    use super::*;
    use crate::catalog::{Library, WritePolicy};
    use crate::models::NewBook;
    use crate::store::JsonStore;

    #[test]
    fn unsaved_books_are_flushed_when_cleanup_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("library.json");
        let (mut library, _) = Library::open(JsonStore::new(&path), WritePolicy::Manual);
        library
            .add_book(NewBook::new("Dune", "Herbert", 1965, "Science", true))
            .saved
            .unwrap();
        let mut app = App::new(library, None);

        let cleaned = Err(anyhow!("failed to leave alternate screen"));
        let outcome = finish_session(&mut app, Ok(()), cleaned);

        assert!(outcome.is_err());
        assert!(!app.library().is_dirty());
        assert_eq!(JsonStore::new(&path).load().unwrap().len(), 1);
    }
}
