// src/quiz/mod.rs

pub mod registry;
pub mod scoring;
pub mod session;
pub mod shuffle;
pub mod store;
pub mod timer;

pub use registry::SessionRegistry;
pub use session::{QuizSession, SessionError};
pub use store::QuestionStore;
