use super::*;

use super::confirm_destroy::ConfirmDestroyScene;
use super::create_form::CreateFormScene;
use super::edit_form::EditFormScene;
use super::launcher::LauncherScene;

/// Result of a key press: the scene to show next and, optionally, work to
/// start in the background.
#[derive(Debug)]
pub(in crate::tui_shell) struct Transition {
    pub(in crate::tui_shell) next: Scene,
    pub(in crate::tui_shell) task: Option<Task>,
}

impl Transition {
    pub(in crate::tui_shell) fn to(next: Scene) -> Self {
        Self { next, task: None }
    }

    pub(in crate::tui_shell) fn with_task(mut self, task: Task) -> Self {
        self.task = Some(task);
        self
    }
}

pub(in crate::tui_shell) trait SceneHandler {
    fn on_key(&self, app: &mut App, key: KeyEvent) -> Transition;

    /// Key hints shown in the footer.
    fn hints(&self) -> &'static str;
}

/// Placeholder scene; any key except Esc leaves it unchanged.
struct EditTableScene;

impl SceneHandler for EditTableScene {
    fn on_key(&self, _app: &mut App, key: KeyEvent) -> Transition {
        match key.code {
            KeyCode::Esc => Transition::to(Scene::Launcher),
            _ => Transition::to(Scene::EditTable),
        }
    }

    fn hints(&self) -> &'static str {
        "[Esc] Back"
    }
}

impl Scene {
    pub(in crate::tui_shell) fn handler(self) -> &'static dyn SceneHandler {
        match self {
            Scene::Launcher => &LauncherScene,
            Scene::CreateForm => &CreateFormScene,
            Scene::EditForm => &EditFormScene,
            Scene::EditTable => &EditTableScene,
            Scene::ConfirmDestroy => &ConfirmDestroyScene,
        }
    }
}
