//! Interactive TUI dashboard: plan cards plus the "new plan" modal.

pub mod app;
mod ui;

use std::io;

use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use evplan_core::PlanPipeline;
use evplan_store::EventList;

use app::App;

/// Launch the interactive TUI dashboard.
///
/// `pipeline` is an error message instead when no API key is configured;
/// the dashboard then still lists and deletes plans.
pub async fn run_dashboard(list: EventList, pipeline: Result<PlanPipeline, String>) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(list, pipeline);
    let result = run_event_loop(&mut terminal, &mut app).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

async fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    let tick_rate = app.tick_rate;

    loop {
        app.poll_results();
        terminal.draw(|f| ui::render(f, app))?;

        // Poll with a short timeout so settled requests show up promptly.
        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    // Clear status message on any keypress.
                    app.status_message = None;
                    app.handle_key(key);
                }
            }
        }

        if app.should_quit {
            return Ok(());
        }
        tokio::task::yield_now().await;
    }
}
