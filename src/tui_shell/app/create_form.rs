use super::*;

/// Fields whose value is picked from a list instead of typed.
const CYCLE_FIELDS: &[&str] = &["zone", "cluster", "vm_template"];

pub(super) struct CreateFormScene;

impl SceneHandler for CreateFormScene {
    fn on_key(&self, app: &mut App, key: KeyEvent) -> Transition {
        let stay = Transition::to(Scene::CreateForm);
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => return Transition::to(Scene::Launcher),
            KeyCode::Char('c') if ctrl => return Transition::to(Scene::Launcher),
            KeyCode::Tab | KeyCode::Down => app.create.focus_next(),
            KeyCode::BackTab | KeyCode::Up => app.create.focus_prev(),
            KeyCode::F(2) => app.cycle_preset(-1),
            KeyCode::F(3) => app.cycle_preset(1),
            KeyCode::Enter => return app.submit_create(),
            _ => {
                let focused = app.create.focused_key().unwrap_or("");
                if CYCLE_FIELDS.contains(&focused) {
                    let step = match key.code {
                        KeyCode::Left => -1,
                        KeyCode::Right | KeyCode::Char(' ') => 1,
                        _ => return stay,
                    };
                    if let Some(task) = app.cycle_create_field(step) {
                        return stay.with_task(task);
                    }
                } else {
                    app.create.edit_focused(key);
                }
            }
        }
        stay
    }

    fn hints(&self) -> &'static str {
        "[Tab/Shift+Tab] Move  [Left/Right/Space] Choose  [F2/F3] Preset  [Enter] Create  [Esc] Cancel"
    }
}

impl App {
    pub(in crate::tui_shell) fn active_preset(&self) -> Option<&Preset> {
        self.presets.get(self.preset_idx)
    }

    pub(in crate::tui_shell) fn is_fetching(&self) -> bool {
        self.fetching
    }

    /// Overwrites the create form with the active preset's values. Fields the
    /// preset does not mention keep their current text.
    pub(super) fn apply_preset(&mut self) {
        let Some(preset) = self.presets.get(self.preset_idx) else {
            return;
        };
        for field in &mut self.create.fields {
            if let Some(value) = preset.values.get(&field.key) {
                field.input.set(value.form_text());
            }
        }
    }

    pub(super) fn cycle_preset(&mut self, step: isize) {
        let n = self.presets.len();
        if n == 0 {
            return;
        }
        self.preset_idx = (self.preset_idx as isize + step).rem_euclid(n as isize) as usize;
        self.apply_preset();
    }

    /// Cycles the focused choice field. Picking a cluster starts a template
    /// fetch for it.
    fn cycle_create_field(&mut self, step: isize) -> Option<Task> {
        let key = self.create.focused_key()?.to_string();
        let options = match key.as_str() {
            "zone" => &self.options.zones,
            "cluster" => &self.options.clusters,
            "vm_template" => &self.templates,
            _ => return None,
        };
        let current = self.create.value(&key).unwrap_or("");
        let next = cycle_option(current, options, step);
        self.create.set(&key, next.clone());

        if key == "cluster" {
            return Some(self.start_fetch(next));
        }
        None
    }

    fn start_fetch(&mut self, cluster: String) -> Task {
        self.fetch_seq += 1;
        self.fetching = true;
        Task::Fetch(FetchRequest {
            seq: self.fetch_seq,
            cluster,
        })
    }

    /// Applies a finished template lookup. Results from anything but the
    /// latest request are dropped.
    pub(super) fn merge_templates(
        &mut self,
        seq: u64,
        cluster: &str,
        result: std::result::Result<Vec<String>, String>,
    ) {
        if seq != self.fetch_seq {
            tracing::debug!(seq, latest = self.fetch_seq, cluster, "discarding stale template list");
            return;
        }
        self.fetching = false;
        match result {
            Ok(templates) => {
                let first = templates.first().cloned().unwrap_or_default();
                self.templates = templates;
                self.create.set("vm_template", first);
            }
            Err(msg) => {
                self.templates.clear();
                self.error(format!("Could not fetch templates for {}: {}", cluster, msg));
            }
        }
    }

    fn submit_create(&mut self) -> Transition {
        let values = self.create.values();
        let name = deployment_name(&self.settings.provider, &values);
        self.info(format!("Creating deployment '{}'...", name));
        Transition::to(Scene::CreateForm).with_task(Task::Lifecycle(LifecycleTask::Create { values }))
    }
}
