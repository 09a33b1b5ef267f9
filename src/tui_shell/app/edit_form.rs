use super::*;

pub(super) struct EditFormScene;

impl SceneHandler for EditFormScene {
    fn on_key(&self, app: &mut App, key: KeyEvent) -> Transition {
        let stay = Transition::to(Scene::EditForm);
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => return Transition::to(Scene::Launcher),
            KeyCode::Char('c') if ctrl => return Transition::to(Scene::Launcher),
            KeyCode::Char('a') if ctrl => return stay.with_task(app.apply_task()),
            KeyCode::Tab | KeyCode::Down => app.edit.focus_next(),
            KeyCode::BackTab | KeyCode::Up => app.edit.focus_prev(),
            KeyCode::Enter => app.save_edit(),
            _ => {
                let options = match app.edit.focused_key() {
                    Some("zone") => Some(app.options.zones.clone()),
                    Some("cluster") => Some(app.options.clusters.clone()),
                    _ => None,
                };
                match options {
                    Some(options) => {
                        let step = match key.code {
                            KeyCode::Left => -1,
                            KeyCode::Right | KeyCode::Char(' ') => 1,
                            _ => return stay,
                        };
                        if let Some(field) = app.edit.focused_mut() {
                            let next = cycle_option(&field.input.buf, &options, step);
                            field.input.set(next);
                        }
                    }
                    None => {
                        app.edit.edit_focused(key);
                    }
                }
            }
        }
        stay
    }

    fn hints(&self) -> &'static str {
        "[Tab/Shift+Tab] Move  [Enter] Save  [Ctrl+A] Apply  [Esc] Back"
    }
}

impl App {
    pub(in crate::tui_shell) fn edit_target(&self) -> String {
        self.edit_path
            .parent()
            .and_then(|dir| dir.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Writes the edit form back into the deployment's parameter file.
    fn save_edit(&mut self) {
        let values = self.edit.values();
        let updates = params::format_updates(
            values.iter().map(|(k, v)| (k.as_str(), v.as_str())),
            &self.catalog,
        );
        match params::save(&self.edit_path, &updates) {
            Ok(()) => {
                tracing::info!(path = %self.edit_path.display(), "parameters saved");
                self.info("Saved! (You may now apply changes as needed.)");
                self.reload_deployments();
            }
            Err(err) => self.error(format!("Save failed: {:#}", err)),
        }
    }

    fn apply_task(&mut self) -> Task {
        let dir = self
            .edit_path
            .parent()
            .map(PathBuf::from)
            .unwrap_or_default();
        self.info(format!("Applying '{}'...", self.edit_target()));
        Task::Lifecycle(LifecycleTask::Apply { dir })
    }
}
