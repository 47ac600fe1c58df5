mod config;
mod controller;
mod state;
mod ticker;
mod timer;

pub use config::{DEFAULT_LOW_TIME_SECS, DEFAULT_SUBMIT_TIMEOUT_SECS, ExamConfig};
pub use controller::{
    ExamNotice, ExamSessionController, ForwardAction, SectionNavigation, SubmitPrompt,
    TickOutcome,
};
pub use state::ExamPhase;
pub use ticker::ExamTicker;
pub use timer::Countdown;
