use std::fmt;

/// Lifecycle of one exam attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ExamPhase {
    #[default]
    Idle,
    Loading,
    LoadFailed,
    Ready,
    Submitting,
    Submitted,
    Abandoned,
}

impl ExamPhase {
    /// Whether `self -> next` is a legal phase change.
    #[must_use]
    pub fn can_transition_to(self, next: ExamPhase) -> bool {
        use ExamPhase::{Abandoned, Idle, LoadFailed, Loading, Ready, Submitted, Submitting};
        matches!(
            (self, next),
            (Idle, Loading | Abandoned)
                | (Loading, Ready | LoadFailed)
                | (LoadFailed, Abandoned)
                | (Ready, Submitting | Abandoned)
                | (Submitting, Submitted | Ready)
        )
    }

    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, ExamPhase::Submitted | ExamPhase::Abandoned)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ExamPhase::Idle => "idle",
            ExamPhase::Loading => "loading",
            ExamPhase::LoadFailed => "load_failed",
            ExamPhase::Ready => "ready",
            ExamPhase::Submitting => "submitting",
            ExamPhase::Submitted => "submitted",
            ExamPhase::Abandoned => "abandoned",
        }
    }
}

impl fmt::Display for ExamPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::ExamPhase::{self, *};

    const ALL: [ExamPhase; 7] = [
        Idle, Loading, LoadFailed, Ready, Submitting, Submitted, Abandoned,
    ];

    #[test]
    fn submitting_is_only_reachable_from_ready() {
        for from in ALL {
            assert_eq!(from.can_transition_to(Submitting), from == Ready, "{from}");
        }
    }

    #[test]
    fn terminal_phases_have_no_exits() {
        for to in ALL {
            assert!(!Submitted.can_transition_to(to));
            assert!(!Abandoned.can_transition_to(to));
        }
    }

    #[test]
    fn failed_submission_returns_to_ready() {
        assert!(Submitting.can_transition_to(Ready));
        assert!(!Submitting.can_transition_to(Abandoned));
    }

    #[test]
    fn load_paths() {
        assert!(Idle.can_transition_to(Loading));
        assert!(Loading.can_transition_to(Ready));
        assert!(Loading.can_transition_to(LoadFailed));
        assert!(!LoadFailed.can_transition_to(Ready));
        assert!(!Idle.can_transition_to(Ready));
    }
}
