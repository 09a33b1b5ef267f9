use super::*;

pub(super) struct LauncherScene;

impl SceneHandler for LauncherScene {
    fn on_key(&self, app: &mut App, key: KeyEvent) -> Transition {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                app.quit = true;
                Transition::to(Scene::Launcher)
            }
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                app.quit = true;
                Transition::to(Scene::Launcher)
            }
            KeyCode::Up | KeyCode::Char('k') => {
                app.move_selection(-1);
                Transition::to(Scene::Launcher)
            }
            KeyCode::Down | KeyCode::Char('j') => {
                app.move_selection(1);
                Transition::to(Scene::Launcher)
            }
            KeyCode::Char('n') => {
                app.status = None;
                Transition::to(Scene::CreateForm)
            }
            KeyCode::Enter | KeyCode::Char('e') => app.open_edit_form(),
            KeyCode::Char('d') | KeyCode::Char('D') => match app.selected_deployment().cloned() {
                Some(info) => {
                    app.pending_destroy = Some(info);
                    Transition::to(Scene::ConfirmDestroy)
                }
                None => Transition::to(Scene::Launcher),
            },
            KeyCode::Char('r') | KeyCode::Char('R') => {
                app.reload_deployments();
                app.refresh_env();
                app.info("Deployments refreshed!");
                Transition::to(Scene::Launcher)
            }
            _ => Transition::to(Scene::Launcher),
        }
    }

    fn hints(&self) -> &'static str {
        "[n] New  [Enter/e] Edit  [d] Destroy  [r] Refresh  [j/k] Move  [q] Quit"
    }
}

impl App {
    pub(super) fn move_selection(&mut self, delta: isize) {
        if self.deployments.is_empty() {
            return;
        }
        let last = self.deployments.len() - 1;
        self.selected = if delta < 0 {
            self.selected.saturating_sub(delta.unsigned_abs())
        } else {
            (self.selected + delta as usize).min(last)
        };
        self.reload_details();
    }

    /// Loads the selected deployment's parameters into the edit form. A
    /// parameter file that cannot be read keeps the launcher in front.
    fn open_edit_form(&mut self) -> Transition {
        let Some(info) = self.selected_deployment() else {
            return Transition::to(Scene::Launcher);
        };
        let path = info.path.join(PARAMS_FILE);
        let set = match params::load(&path) {
            Ok(set) => set,
            Err(err) => {
                self.error(format!("Could not load {}: {:#}", PARAMS_FILE, err));
                return Transition::to(Scene::Launcher);
            }
        };

        let catalog = Arc::clone(&self.catalog);
        let mut form = Form::new(
            FORM_FIELDS
                .iter()
                .copied()
                .filter(|key| !catalog.is_read_only(key)),
        );
        for field in &mut form.fields {
            let raw = set.get(&field.key).unwrap_or("");
            field.input = Input::with_value(&params::unquote(raw));
        }
        self.edit = form;
        self.edit_path = path;
        self.status = None;
        Transition::to(Scene::EditForm)
    }
}
