use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageKind {
    Generation,
    Detection,
    Humanization,
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            StageKind::Generation => "generation",
            StageKind::Detection => "detection",
            StageKind::Humanization => "humanization",
        };
        f.write_str(label)
    }
}

/// Outcome slot for one pipeline stage. `NotStarted` means "never ran",
/// which is distinct from a `Succeeded` carrying an empty payload.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StageResult<T> {
    #[default]
    NotStarted,
    Running,
    Succeeded(T),
    Failed(String),
}

impl<T> StageResult<T> {
    pub fn is_running(&self) -> bool {
        matches!(self, StageResult::Running)
    }

    pub fn is_succeeded(&self) -> bool {
        matches!(self, StageResult::Succeeded(_))
    }

    pub fn succeeded(&self) -> Option<&T> {
        match self {
            StageResult::Succeeded(value) => Some(value),
            _ => None,
        }
    }

    pub(crate) fn succeeded_mut(&mut self) -> Option<&mut T> {
        match self {
            StageResult::Succeeded(value) => Some(value),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&str> {
        match self {
            StageResult::Failed(reason) => Some(reason),
            _ => None,
        }
    }

    pub fn status(&self) -> StageStatus {
        match self {
            StageResult::NotStarted => StageStatus::NotStarted,
            StageResult::Running => StageStatus::Running,
            StageResult::Succeeded(_) => StageStatus::Succeeded,
            StageResult::Failed(_) => StageStatus::Failed,
        }
    }
}

/// Payload-free view of a [`StageResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StageStatus {
    #[default]
    NotStarted,
    Running,
    Succeeded,
    Failed,
}
