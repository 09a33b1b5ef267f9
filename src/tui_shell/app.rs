use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap};

use crate::catalog::{FORM_FIELDS, FieldCatalog};
use crate::config::{ClusterOptions, EnvStatus, Settings};
use crate::gitstatus::{GitStatus, git_status};
use crate::lifecycle::{LifecycleOrchestrator, SequenceResult, Step, deployment_name};
use crate::model::{DeploymentInfo, Preset};
use crate::params::{self, PARAMS_FILE};
use crate::registry;
use crate::templates::TemplateSource;

use super::input::Input;

mod confirm_destroy;
mod create_form;
mod edit_form;
mod event_loop;
mod form;
mod launcher;
mod render;
mod runtime;
mod scenes;
mod tasks;
mod types;

pub(super) use self::form::{Form, FormField, cycle_option};
pub(super) use self::scenes::{SceneHandler, Transition};
pub(super) use self::tasks::{AppEvent, FetchRequest, LifecycleTask, Task, TaskKind, TaskOutcome};
pub(super) use self::types::{GitIndicator, Scene, StatusKind, StatusLine};

pub(super) use self::runtime::run;

/// The interactive session: one scene at a time plus the data every scene
/// reads. Key handling never blocks; lifecycle and template work comes back
/// through [`App::handle_event`].
pub(super) struct App {
    settings: Arc<Settings>,
    catalog: Arc<FieldCatalog>,
    options: ClusterOptions,

    presets: Vec<Preset>,
    preset_idx: usize,

    scene: Scene,

    create: Form,
    edit: Form,
    edit_path: PathBuf,

    deployments: Vec<DeploymentInfo>,
    selected: usize,
    details: Vec<(String, String)>,
    pending_destroy: Option<DeploymentInfo>,

    templates: Vec<String>,
    fetching: bool,
    fetch_seq: u64,

    // Set while a lifecycle sequence runs on the worker thread.
    busy: bool,

    status: Option<StatusLine>,
    env: EnvStatus,
    git: GitIndicator,

    quit: bool,
    // Quit requested mid-sequence; honored once the worker reports back.
    quit_after_task: bool,
}

impl App {
    pub(super) fn new(opts: crate::tui::TuiRunOptions) -> Self {
        let crate::tui::TuiRunOptions {
            settings,
            catalog,
            presets,
            options,
        } = opts;
        let mut app = Self {
            settings: Arc::new(settings),
            catalog: Arc::new(catalog),
            options,
            presets,
            preset_idx: 0,
            scene: Scene::Launcher,
            create: Form::new(FORM_FIELDS.iter().copied()),
            edit: Form::default(),
            edit_path: PathBuf::new(),
            deployments: Vec::new(),
            selected: 0,
            details: Vec::new(),
            pending_destroy: None,
            templates: Vec::new(),
            fetching: false,
            fetch_seq: 0,
            busy: false,
            status: None,
            env: EnvStatus::default(),
            git: GitIndicator::Unknown,
            quit: false,
            quit_after_task: false,
        };
        app.apply_preset();
        app.reload_deployments();
        app
    }

    pub(super) fn scene(&self) -> Scene {
        self.scene
    }

    pub(super) fn is_busy(&self) -> bool {
        self.busy
    }

    pub(super) fn should_quit(&self) -> bool {
        self.quit
    }

    pub(super) fn is_quit_pending(&self) -> bool {
        self.quit_after_task
    }

    pub(super) fn settings(&self) -> &Settings {
        &self.settings
    }

    pub(super) fn catalog(&self) -> Arc<FieldCatalog> {
        Arc::clone(&self.catalog)
    }

    pub(super) fn status(&self) -> Option<&StatusLine> {
        self.status.as_ref()
    }

    fn set_status(&mut self, kind: StatusKind, text: impl Into<String>) {
        self.status = Some(StatusLine {
            kind,
            text: text.into(),
        });
    }

    fn info(&mut self, text: impl Into<String>) {
        self.set_status(StatusKind::Info, text);
    }

    fn error(&mut self, text: impl Into<String>) {
        self.set_status(StatusKind::Error, text);
    }

    /// Re-reads AWS/Vault environment flags and the repository git status.
    pub(super) fn refresh_env(&mut self) {
        self.env = EnvStatus::detect(&self.settings);
        self.git = match &self.settings.terraform_path {
            None => GitIndicator::Unknown,
            Some(repo) => match git_status(repo) {
                Ok(status) => GitIndicator::Known(status),
                Err(err) => {
                    tracing::debug!(error = %format!("{:#}", err), "git status unavailable");
                    GitIndicator::Error
                }
            },
        };
    }

    /// Rebuilds the deployment snapshot, keeping the selection in range.
    pub(super) fn reload_deployments(&mut self) {
        match registry::list(&self.settings.apps_path) {
            Ok(list) => self.deployments = list,
            Err(err) => {
                self.deployments.clear();
                self.error(format!("Could not list deployments: {:#}", err));
            }
        }
        self.selected = self.selected.min(self.deployments.len().saturating_sub(1));
        self.reload_details();
    }

    fn reload_details(&mut self) {
        self.details = self
            .deployments
            .get(self.selected)
            .map(|info| registry::details(info, &self.catalog))
            .unwrap_or_default();
    }

    fn selected_deployment(&self) -> Option<&DeploymentInfo> {
        self.deployments.get(self.selected)
    }

    /// Dispatches one event. A returned task must be started by the caller.
    pub(super) fn handle_event(&mut self, event: AppEvent) -> Option<Task> {
        match event {
            AppEvent::Key(key) => self.handle_key(key),
            AppEvent::TemplatesFetched {
                seq,
                cluster,
                result,
            } => {
                self.merge_templates(seq, &cluster, result);
                None
            }
            AppEvent::Progress(msg) => {
                self.info(msg);
                None
            }
            AppEvent::TaskFinished(outcome) => {
                self.finish_task(outcome);
                None
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Option<Task> {
        if self.busy {
            if is_quit_key(key) && !self.quit_after_task {
                self.quit_after_task = true;
                self.info("Quitting after the current sequence finishes...");
            }
            return None;
        }

        let Transition { next, task } = self.scene.handler().on_key(self, key);
        self.scene = next;
        if let Some(Task::Lifecycle(_)) = &task {
            self.busy = true;
        }
        task
    }
}

fn is_quit_key(key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => true,
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

#[cfg(test)]
#[path = "../tests/tui_shell/app_tests.rs"]
mod tests;
