mod store;

pub use store::{LessonProgressStore, progress_key};
