use std::sync::mpsc::Receiver;

use super::tasks::Worker;
use super::*;

pub(super) fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    worker: &Worker,
    rx: &Receiver<AppEvent>,
) -> Result<()> {
    loop {
        terminal
            .draw(|f| super::render::draw(f, app))
            .context("draw")?;
        if app.should_quit() {
            return Ok(());
        }

        while let Ok(ev) = rx.try_recv() {
            if let Some(task) = app.handle_event(ev) {
                worker.spawn(task);
            }
        }

        if event::poll(Duration::from_millis(50)).context("poll")? {
            match event::read().context("read event")? {
                Event::Key(k) if k.kind == KeyEventKind::Press => {
                    if let Some(task) = app.handle_event(AppEvent::Key(k)) {
                        worker.spawn(task);
                    }
                }
                _ => {}
            }
        }
    }
}
