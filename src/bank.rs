//! Question bank storage - SQLite persistence for validated quiz questions

use pyo3::prelude::*;
use rusqlite::{params, Connection, Result as SqliteResult};
use serde::{Deserialize, Serialize};

use crate::error::QuizError;

/// Number of answer options every question carries.
pub const OPTION_COUNT: usize = 4;

/// A validated multiple-choice question.
///
/// Invariants: `question_text` is non-empty, `options` holds exactly four
/// pairwise-distinct strings and `correct_answer` equals one of them.
/// `Question::new` is the only public construction path and enforces all
/// three; rows loaded from the bank were validated at insert time.
#[pyclass]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    #[pyo3(get)]
    #[serde(default)]
    pub id: i64,
    #[pyo3(get)]
    pub question_text: String,
    #[pyo3(get)]
    pub options: Vec<String>,
    #[pyo3(get)]
    pub correct_answer: String,
}

#[pymethods]
impl Question {
    fn __repr__(&self) -> String {
        format!(
            "Question(id={}, text='{}...')",
            self.id,
            &self.question_text.chars().take(40).collect::<String>()
        )
    }
}

impl Question {
    pub fn new(
        question_text: String,
        options: Vec<String>,
        correct_answer: String,
    ) -> Result<Question, QuizError> {
        if question_text.trim().is_empty() {
            return Err(QuizError::InvalidQuestion(
                "question text is empty".to_string(),
            ));
        }
        if options.len() != OPTION_COUNT {
            return Err(QuizError::InvalidQuestion(format!(
                "expected {} options, got {}",
                OPTION_COUNT,
                options.len()
            )));
        }
        for (i, option) in options.iter().enumerate() {
            if options[..i].contains(option) {
                return Err(QuizError::InvalidQuestion(format!(
                    "duplicate option '{}'",
                    option
                )));
            }
        }
        if !options.contains(&correct_answer) {
            return Err(QuizError::InvalidQuestion(format!(
                "correct answer '{}' is not one of the options",
                correct_answer
            )));
        }
        Ok(Question {
            id: 0,
            question_text,
            options,
            correct_answer,
        })
    }
}

/// Initialize database with schema
pub fn init_database(db_path: &str) -> SqliteResult<Connection> {
    let conn = Connection::open(db_path)?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS questions (
            id INTEGER PRIMARY KEY,
            question_text TEXT NOT NULL,
            option_1 TEXT NOT NULL,
            option_2 TEXT NOT NULL,
            option_3 TEXT NOT NULL,
            option_4 TEXT NOT NULL,
            correct_answer TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS attempts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            question_id INTEGER REFERENCES questions(id),
            selected_answer TEXT,
            correct_answer TEXT,
            is_correct INTEGER NOT NULL,
            attempted_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    Ok(conn)
}

/// Insert a single question, returning its assigned row id.
pub fn insert_question(conn: &Connection, question: &Question) -> Result<i64, QuizError> {
    conn.execute(
        "INSERT INTO questions (question_text, option_1, option_2, option_3, option_4, correct_answer)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            question.question_text,
            question.options[0],
            question.options[1],
            question.options[2],
            question.options[3],
            question.correct_answer,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Fetch every question in the bank.
pub fn fetch_all_questions(conn: &Connection) -> Result<Vec<Question>, QuizError> {
    let mut stmt = conn.prepare(
        "SELECT id, question_text, option_1, option_2, option_3, option_4, correct_answer
         FROM questions",
    )?;

    let rows = stmt.query_map([], |row| {
        Ok(Question {
            id: row.get(0)?,
            question_text: row.get(1)?,
            options: vec![row.get(2)?, row.get(3)?, row.get(4)?, row.get(5)?],
            correct_answer: row.get(6)?,
        })
    })?;

    let questions = rows.collect::<SqliteResult<Vec<Question>>>()?;
    Ok(questions)
}

/// Count questions currently stored.
pub fn count_questions(conn: &Connection) -> Result<i64, QuizError> {
    let count = conn.query_row("SELECT COUNT(*) FROM questions", [], |row| row.get(0))?;
    Ok(count)
}

/// Delete every question and its attempt history.
pub fn clear_questions(conn: &Connection) -> Result<usize, QuizError> {
    conn.execute("DELETE FROM attempts", [])?;
    let deleted = conn.execute("DELETE FROM questions", [])?;
    Ok(deleted)
}

/// Serialize the whole bank to JSON (backup / transfer).
pub fn export_bank(conn: &Connection) -> Result<String, QuizError> {
    let questions = fetch_all_questions(conn)?;
    Ok(serde_json::to_string_pretty(&questions)?)
}

/// Load questions from a JSON export. Every record is re-validated before
/// insertion; returns the number of questions added.
pub fn import_bank(conn: &Connection, json: &str) -> Result<usize, QuizError> {
    let questions: Vec<Question> = serde_json::from_str(json)?;
    let mut count = 0;
    for question in questions {
        let validated = Question::new(
            question.question_text,
            question.options,
            question.correct_answer,
        )?;
        insert_question(conn, &validated)?;
        count += 1;
    }
    Ok(count)
}

// ============= Python Bindings =============

fn open_bank(db_path: &str) -> PyResult<Connection> {
    init_database(db_path).map_err(|e| pyo3::exceptions::PyRuntimeError::new_err(e.to_string()))
}

#[pyfunction]
#[pyo3(name = "init_database")]
pub fn py_init_database(db_path: &str) -> PyResult<()> {
    open_bank(db_path).map(|_| ())
}

#[pyfunction]
#[pyo3(name = "new_question")]
pub fn py_new_question(
    question_text: String,
    options: Vec<String>,
    correct_answer: String,
) -> PyResult<Question> {
    Ok(Question::new(question_text, options, correct_answer)?)
}

#[pyfunction]
#[pyo3(name = "insert_question")]
pub fn py_insert_question(db_path: &str, question: Question) -> PyResult<i64> {
    let conn = open_bank(db_path)?;
    Ok(insert_question(&conn, &question)?)
}

#[pyfunction]
#[pyo3(name = "fetch_all_questions")]
pub fn py_fetch_all_questions(db_path: &str) -> PyResult<Vec<Question>> {
    let conn = open_bank(db_path)?;
    Ok(fetch_all_questions(&conn)?)
}

#[pyfunction]
#[pyo3(name = "count_questions")]
pub fn py_count_questions(db_path: &str) -> PyResult<i64> {
    let conn = open_bank(db_path)?;
    Ok(count_questions(&conn)?)
}

#[pyfunction]
#[pyo3(name = "clear_questions")]
pub fn py_clear_questions(db_path: &str) -> PyResult<usize> {
    let conn = open_bank(db_path)?;
    Ok(clear_questions(&conn)?)
}

#[pyfunction]
#[pyo3(name = "export_bank")]
pub fn py_export_bank(db_path: &str) -> PyResult<String> {
    let conn = open_bank(db_path)?;
    Ok(export_bank(&conn)?)
}

#[pyfunction]
#[pyo3(name = "import_bank")]
pub fn py_import_bank(db_path: &str, json: &str) -> PyResult<usize> {
    let conn = open_bank(db_path)?;
    Ok(import_bank(&conn, json)?)
}
