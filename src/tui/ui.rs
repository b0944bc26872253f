use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::time::Duration;
use tracing::info;

use super::app::{App, AppEffect};
use super::opener::open_path;
use super::render::render_ui;
use crate::constants::UI_REFRESH_INTERVAL_MS;

/// Run the terminal UI
pub async fn run_ui(mut app: App) -> Result<()> {
    // Check if we have an interactive terminal
    if !crossterm::tty::IsTty::is_tty(&io::stdout()) {
        eprintln!("marktree requires an interactive terminal.");
        eprintln!("   For pipes and scripts use: marktree scan [PATH]");
        return Err(anyhow::anyhow!("No interactive terminal available"));
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let res = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    let stats = app.cache().get_stats();
    info!("{}", stats.format());

    res
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    app.start_watching();
    let mut dirty = true;

    loop {
        if dirty {
            terminal.draw(|f| render_ui(f, app))?;
            dirty = false;
        }

        if event::poll(Duration::from_millis(UI_REFRESH_INTERVAL_MS))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if let Some(AppEffect::Open(path)) = app.handle_key(key) {
                        open_path(&path);
                    }
                    dirty = true;
                }
                Event::Mouse(mouse) => {
                    app.handle_mouse(mouse);
                    dirty = true;
                }
                Event::Resize(_, _) => dirty = true,
                _ => {}
            }
        }

        dirty |= app.tick();

        if !app.running {
            break;
        }

        // Let the opener's reaper tasks make progress
        tokio::task::yield_now().await;
    }

    Ok(())
}
