use std::fmt;

/// One unit of work inside a lifecycle sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Step {
    CheckTarget,
    CopyTemplate,
    WriteParameters,
    WriteBackend,
    MarkReady,
    Init,
    MarkInitialized,
    Apply,
    MarkDeployed,
    Destroy,
    MarkDestroyed,
    PurgeRemoteState,
    RemoveDirectory,
    PlanDestroy,
}

impl Step {
    pub fn describe(self) -> &'static str {
        match self {
            Step::CheckTarget => "check target directory",
            Step::CopyTemplate => "copy template",
            Step::WriteParameters => "write parameters",
            Step::WriteBackend => "write backend descriptor",
            Step::MarkReady => "record READY state",
            Step::Init => "terraform init",
            Step::MarkInitialized => "record INITIALIZED state",
            Step::Apply => "terraform apply",
            Step::MarkDeployed => "record DEPLOYED state",
            Step::Destroy => "terraform destroy",
            Step::MarkDestroyed => "record DESTROYED state",
            Step::PurgeRemoteState => "delete remote state",
            Step::RemoveDirectory => "delete directory",
            Step::PlanDestroy => "terraform plan -destroy",
        }
    }

    /// Steps whose errors already name the failing command.
    fn self_describing(self) -> bool {
        matches!(
            self,
            Step::CheckTarget | Step::Init | Step::Apply | Step::Destroy | Step::PlanDestroy
        )
    }
}

/// A step failed and the sequence stopped there.
#[derive(Debug)]
pub struct StepFailure {
    pub step: Step,
    pub error: anyhow::Error,
}

impl fmt::Display for StepFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.step.self_describing() {
            write!(f, "{:#}", self.error)
        } else {
            write!(f, "failed to {}: {:#}", self.step.describe(), self.error)
        }
    }
}

/// A step failed, was logged, and the sequence carried on.
#[derive(Clone, Debug)]
pub struct SoftFailure {
    pub step: Step,
    pub message: String,
}

#[derive(Clone, Debug, Default)]
pub struct SequenceReport {
    /// Deployment directory name the sequence ran against.
    pub name: String,
    pub completed: Vec<Step>,
    pub soft_failures: Vec<SoftFailure>,
}

impl SequenceReport {
    pub fn soft_failure(&self, step: Step) -> Option<&SoftFailure> {
        self.soft_failures.iter().find(|s| s.step == step)
    }
}

pub type SequenceResult = Result<SequenceReport, StepFailure>;
