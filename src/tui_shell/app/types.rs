use super::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(in crate::tui_shell) enum Scene {
    Launcher,
    CreateForm,
    EditForm,
    EditTable,
    ConfirmDestroy,
}

impl Scene {
    pub(in crate::tui_shell) fn title(self) -> &'static str {
        match self {
            Scene::Launcher => "Deployments",
            Scene::CreateForm => "Create Deployment",
            Scene::EditForm => "Edit Deployment",
            Scene::EditTable => "Edit Table",
            Scene::ConfirmDestroy => "Confirm Destroy",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(in crate::tui_shell) enum StatusKind {
    Info,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(in crate::tui_shell) struct StatusLine {
    pub(in crate::tui_shell) kind: StatusKind,
    pub(in crate::tui_shell) text: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(in crate::tui_shell) enum GitIndicator {
    /// No repository configured, or not refreshed yet.
    Unknown,
    Known(GitStatus),
    Error,
}
