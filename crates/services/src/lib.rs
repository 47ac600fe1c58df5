#![forbid(unsafe_code)]

pub mod api;
pub mod app_services;
pub mod error;
pub mod exam;
pub mod progress;

pub use nihongo_core::Clock;

pub use api::{ApiConfig, ExamApi, HttpExamApi};
pub use app_services::AppServices;
pub use error::{ApiError, AppServicesError, ExamError};
pub use exam::{
    ExamConfig, ExamNotice, ExamPhase, ExamSessionController, ExamTicker, SubmitPrompt,
    TickOutcome,
};
pub use progress::LessonProgressStore;
