//! Error types for extraction, storage and session state

use thiserror::Error;

/// Reason a single text block was rejected during extraction.
///
/// These are recovered per block and surfaced as diagnostics; they never
/// abort a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ExtractionErrorKind {
    #[error("missing question")]
    MissingQuestion,
    #[error("insufficient options")]
    InsufficientOptions,
    #[error("missing answer")]
    MissingAnswer,
    #[error("answer is not one of the options")]
    AnswerNotAnOption,
    #[error("duplicate option text")]
    DuplicateOption,
}

/// Errors surfaced by the question bank and the session engine.
#[derive(Debug, Error)]
pub enum QuizError {
    #[error("no questions available to start a quiz")]
    EmptyPool,
    #[error("there is no active question")]
    NoActiveQuestion,
    #[error("an answer was already submitted for the current question")]
    AlreadyAnswered,
    #[error("invalid question: {0}")]
    InvalidQuestion(String),
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<QuizError> for pyo3::PyErr {
    fn from(err: QuizError) -> Self {
        pyo3::exceptions::PyRuntimeError::new_err(err.to_string())
    }
}
