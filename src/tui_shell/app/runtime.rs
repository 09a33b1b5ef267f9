use std::io::IsTerminal;
use std::sync::mpsc;

use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};

use crate::templates::VaultProxmoxSource;

use super::tasks::Worker;
use super::*;

pub(in crate::tui_shell) fn run(opts: crate::tui::TuiRunOptions) -> Result<()> {
    if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        anyhow::bail!("TUI requires an interactive terminal (TTY)");
    }

    let mut app = App::new(opts);
    app.refresh_env();

    let orchestrator = LifecycleOrchestrator::from_settings(app.settings(), app.catalog());
    let templates = VaultProxmoxSource::from_env(&app.settings().template_filter)?;
    let (tx, rx) = mpsc::channel();
    let worker = Worker::new(Arc::new(orchestrator), Arc::new(templates), tx);

    let mut stdout = io::stdout();
    enable_raw_mode().context("enable raw mode")?;
    execute!(stdout, EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;
    terminal.clear().ok();

    tracing::info!("session started");
    let res = super::event_loop::run_loop(&mut terminal, &mut app, &worker, &rx);

    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
    terminal.show_cursor().ok();
    tracing::info!("session ended");

    res
}
