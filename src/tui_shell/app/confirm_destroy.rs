use super::*;

pub(super) struct ConfirmDestroyScene;

impl SceneHandler for ConfirmDestroyScene {
    fn on_key(&self, app: &mut App, key: KeyEvent) -> Transition {
        let stay = Transition::to(Scene::ConfirmDestroy);
        let Some(dir) = app.pending_destroy.as_ref().map(|info| info.path.clone()) else {
            return Transition::to(Scene::Launcher);
        };
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                app.info("Running terraform destroy...");
                stay.with_task(Task::Lifecycle(LifecycleTask::Destroy { dir }))
            }
            KeyCode::Char('p') | KeyCode::Char('P') => {
                app.info("Running terraform plan -destroy...");
                stay.with_task(Task::Lifecycle(LifecycleTask::PlanDestroy { dir }))
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.pending_destroy = None;
                app.info("Destroy canceled.");
                Transition::to(Scene::Launcher)
            }
            _ => stay,
        }
    }

    fn hints(&self) -> &'static str {
        "[y/Enter] Destroy  [p] Plan destroy  [n/Esc] Cancel"
    }
}

impl App {
    pub(in crate::tui_shell) fn pending_destroy(&self) -> Option<&DeploymentInfo> {
        self.pending_destroy.as_ref()
    }
}
