//! Quiz Core - Rust engine for AI-generated multiple-choice quizzes
//!
//! Turns free-form generated quiz text into a validated question bank and
//! runs interactive quiz sessions over it: extraction with per-block error
//! recovery, SQLite persistence, no-repeat sampling, option shuffling and
//! scoring. The text generator and the UI stay on the Python side.

mod bank;
mod error;
mod extract;
mod progress;
mod session;

use pyo3::prelude::*;

// Re-export the Rust API
pub use bank::{
    clear_questions, count_questions, export_bank, fetch_all_questions, import_bank,
    init_database, insert_question, Question, OPTION_COUNT,
};
pub use error::{ExtractionErrorKind, QuizError};
pub use extract::{extract, import_quiz_text, Diagnostic, Extraction};
pub use progress::{get_missed_questions, get_stats, save_attempt, AttemptStats};
pub use session::{AnswerOutcome, DrawnQuestion, QuizSession, DEFAULT_POOL_SIZE};

/// Quiz Core Python Module
#[pymodule]
fn quiz_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Question bank
    m.add_function(wrap_pyfunction!(bank::py_init_database, m)?)?;
    m.add_function(wrap_pyfunction!(bank::py_new_question, m)?)?;
    m.add_function(wrap_pyfunction!(bank::py_insert_question, m)?)?;
    m.add_function(wrap_pyfunction!(bank::py_fetch_all_questions, m)?)?;
    m.add_function(wrap_pyfunction!(bank::py_count_questions, m)?)?;
    m.add_function(wrap_pyfunction!(bank::py_clear_questions, m)?)?;
    m.add_function(wrap_pyfunction!(bank::py_export_bank, m)?)?;
    m.add_function(wrap_pyfunction!(bank::py_import_bank, m)?)?;

    // Text extraction
    m.add_function(wrap_pyfunction!(extract::py_extract_questions, m)?)?;
    m.add_function(wrap_pyfunction!(extract::py_import_quiz_text, m)?)?;

    // Progress tracking
    m.add_function(wrap_pyfunction!(progress::py_save_attempt, m)?)?;
    m.add_function(wrap_pyfunction!(progress::py_get_missed_questions, m)?)?;
    m.add_function(wrap_pyfunction!(progress::py_get_stats, m)?)?;

    // Register classes
    m.add_class::<bank::Question>()?;
    m.add_class::<extract::Diagnostic>()?;
    m.add_class::<session::QuizSession>()?;
    m.add_class::<session::DrawnQuestion>()?;
    m.add_class::<session::AnswerOutcome>()?;
    m.add_class::<progress::AttemptStats>()?;

    Ok(())
}
