use std::thread;

use super::*;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(in crate::tui_shell) struct FetchRequest {
    pub(in crate::tui_shell) seq: u64,
    pub(in crate::tui_shell) cluster: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(in crate::tui_shell) enum LifecycleTask {
    Create { values: Vec<(String, String)> },
    Apply { dir: PathBuf },
    Destroy { dir: PathBuf },
    PlanDestroy { dir: PathBuf },
}

impl LifecycleTask {
    pub(in crate::tui_shell) fn kind(&self) -> TaskKind {
        match self {
            LifecycleTask::Create { .. } => TaskKind::Create,
            LifecycleTask::Apply { .. } => TaskKind::Apply,
            LifecycleTask::Destroy { .. } => TaskKind::Destroy,
            LifecycleTask::PlanDestroy { .. } => TaskKind::PlanDestroy,
        }
    }
}

/// Background work requested by a scene.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(in crate::tui_shell) enum Task {
    Fetch(FetchRequest),
    Lifecycle(LifecycleTask),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(in crate::tui_shell) enum TaskKind {
    Create,
    Apply,
    Destroy,
    PlanDestroy,
}

#[derive(Debug)]
pub(in crate::tui_shell) struct TaskOutcome {
    pub(in crate::tui_shell) kind: TaskKind,
    pub(in crate::tui_shell) result: SequenceResult,
}

/// Everything the event loop feeds into [`App::handle_event`].
#[derive(Debug)]
pub(in crate::tui_shell) enum AppEvent {
    Key(KeyEvent),
    TemplatesFetched {
        seq: u64,
        cluster: String,
        result: std::result::Result<Vec<String>, String>,
    },
    Progress(String),
    TaskFinished(TaskOutcome),
}

pub(in crate::tui_shell) fn run_lifecycle(
    orchestrator: &LifecycleOrchestrator,
    task: LifecycleTask,
    progress: &mut dyn FnMut(String),
) -> TaskOutcome {
    let kind = task.kind();
    let result = match task {
        LifecycleTask::Create { values } => orchestrator.create(&values, progress),
        LifecycleTask::Apply { dir } => orchestrator.apply_existing(&dir, progress),
        LifecycleTask::Destroy { dir } => orchestrator.destroy(&dir, progress),
        LifecycleTask::PlanDestroy { dir } => orchestrator.plan_destroy(&dir, progress),
    };
    TaskOutcome { kind, result }
}

/// Starts background work; results come back as [`AppEvent`]s on `tx`.
pub(in crate::tui_shell) struct Worker {
    orchestrator: Arc<LifecycleOrchestrator>,
    templates: Arc<dyn TemplateSource>,
    tx: Sender<AppEvent>,
}

impl Worker {
    pub(in crate::tui_shell) fn new(
        orchestrator: Arc<LifecycleOrchestrator>,
        templates: Arc<dyn TemplateSource>,
        tx: Sender<AppEvent>,
    ) -> Self {
        Self {
            orchestrator,
            templates,
            tx,
        }
    }

    pub(in crate::tui_shell) fn spawn(&self, task: Task) {
        match task {
            Task::Fetch(req) => self.spawn_fetch(req),
            Task::Lifecycle(task) => self.spawn_lifecycle(task),
        }
    }

    fn spawn_fetch(&self, req: FetchRequest) {
        let source = Arc::clone(&self.templates);
        let tx = self.tx.clone();
        thread::spawn(move || {
            let result = source
                .templates_for_cluster(&req.cluster)
                .map_err(|err| format!("{:#}", err));
            // The receiver is gone once the session has ended.
            let _ = tx.send(AppEvent::TemplatesFetched {
                seq: req.seq,
                cluster: req.cluster,
                result,
            });
        });
    }

    fn spawn_lifecycle(&self, task: LifecycleTask) {
        let orchestrator = Arc::clone(&self.orchestrator);
        let tx = self.tx.clone();
        thread::spawn(move || {
            let progress_tx = tx.clone();
            let mut progress = move |msg: String| {
                let _ = progress_tx.send(AppEvent::Progress(msg));
            };
            let outcome = run_lifecycle(&orchestrator, task, &mut progress);
            let _ = tx.send(AppEvent::TaskFinished(outcome));
        });
    }
}

impl App {
    /// Turns a finished sequence into a status message and the next scene.
    pub(super) fn finish_task(&mut self, outcome: TaskOutcome) {
        self.busy = false;
        match (outcome.kind, outcome.result) {
            (TaskKind::Create, Ok(report)) => {
                self.info(format!("Deployment '{}' deployed and ready!", report.name));
                self.scene = Scene::Launcher;
            }
            (TaskKind::Create, Err(failure)) => {
                self.error(failure.to_string());
                // A name collision changed nothing; let the user fix the form.
                if failure.step != Step::CheckTarget {
                    self.scene = Scene::Launcher;
                }
            }
            (TaskKind::Apply, Ok(_)) => self.info("Deployment applied and ready!"),
            (TaskKind::Apply, Err(failure)) => self.error(failure.to_string()),
            (TaskKind::Destroy, result) => {
                match result {
                    Ok(report) => match report.soft_failure(Step::RemoveDirectory) {
                        Some(soft) => self.error(format!(
                            "Destroyed, but failed to delete directory: {}",
                            soft.message
                        )),
                        // Remote cleanup failures were already logged as warnings.
                        None if !report.soft_failures.is_empty() => {
                            self.info("Destroyed: terraform + directory removed (remote state cleanup skipped).")
                        }
                        None => self.info("Destroyed: terraform + remote state + directory removed."),
                    },
                    Err(failure) => self.error(failure.to_string()),
                }
                self.pending_destroy = None;
                self.scene = Scene::Launcher;
            }
            (TaskKind::PlanDestroy, Ok(_)) => self.info("plan -destroy completed successfully."),
            (TaskKind::PlanDestroy, Err(failure)) => self.error(failure.to_string()),
        }
        self.reload_deployments();
        if self.quit_after_task {
            self.quit = true;
        }
    }
}
