//! Progress tracking - attempt history and statistics

use pyo3::prelude::*;
use rusqlite::{params, Connection};

use crate::bank::Question;
use crate::error::QuizError;

/// Attempt statistics across all recorded sessions
#[pyclass]
#[derive(Debug, Clone)]
pub struct AttemptStats {
    #[pyo3(get)]
    pub total_attempts: i64,
    #[pyo3(get)]
    pub correct_count: i64,
    #[pyo3(get)]
    pub incorrect_count: i64,
    #[pyo3(get)]
    pub accuracy_percent: f64,
}

#[pymethods]
impl AttemptStats {
    fn __repr__(&self) -> String {
        format!(
            "AttemptStats(total={}, correct={}, accuracy={:.1}%)",
            self.total_attempts, self.correct_count, self.accuracy_percent
        )
    }
}

/// Record one answered question.
pub fn save_attempt(
    conn: &Connection,
    question_id: i64,
    selected_answer: &str,
    correct_answer: &str,
    is_correct: bool,
) -> Result<(), QuizError> {
    conn.execute(
        "INSERT INTO attempts (question_id, selected_answer, correct_answer, is_correct)
         VALUES (?1, ?2, ?3, ?4)",
        params![question_id, selected_answer, correct_answer, is_correct as i32],
    )?;
    Ok(())
}

/// Questions answered incorrectly at least once, sorted by miss count.
pub fn get_missed_questions(
    conn: &Connection,
    limit: Option<usize>,
) -> Result<Vec<(Question, i64)>, QuizError> {
    let limit_clause = limit.map(|l| format!(" LIMIT {}", l)).unwrap_or_default();

    let query = format!(
        "SELECT q.id, q.question_text, q.option_1, q.option_2, q.option_3, q.option_4,
                q.correct_answer, COUNT(*) as miss_count
         FROM questions q
         JOIN attempts a ON q.id = a.question_id
         WHERE a.is_correct = 0
         GROUP BY q.id
         ORDER BY miss_count DESC{}",
        limit_clause
    );

    let mut stmt = conn.prepare(&query)?;
    let rows = stmt.query_map([], |row| {
        Ok((
            Question {
                id: row.get(0)?,
                question_text: row.get(1)?,
                options: vec![row.get(2)?, row.get(3)?, row.get(4)?, row.get(5)?],
                correct_answer: row.get(6)?,
            },
            row.get::<_, i64>(7)?,
        ))
    })?;

    let missed = rows.collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(missed)
}

/// Overall answer statistics.
pub fn get_stats(conn: &Connection) -> Result<AttemptStats, QuizError> {
    let mut stmt =
        conn.prepare("SELECT COUNT(*) as total, SUM(is_correct) as correct FROM attempts")?;

    let stats = stmt.query_row([], |row| {
        let total: i64 = row.get(0)?;
        let correct: i64 = row.get::<_, Option<i64>>(1)?.unwrap_or(0);
        let incorrect = total - correct;
        let accuracy = if total > 0 {
            (correct as f64 / total as f64) * 100.0
        } else {
            0.0
        };

        Ok(AttemptStats {
            total_attempts: total,
            correct_count: correct,
            incorrect_count: incorrect,
            accuracy_percent: accuracy,
        })
    })?;

    Ok(stats)
}

// ============= Python Bindings =============

fn open_bank(db_path: &str) -> PyResult<Connection> {
    crate::bank::init_database(db_path)
        .map_err(|e| pyo3::exceptions::PyRuntimeError::new_err(e.to_string()))
}

#[pyfunction]
#[pyo3(name = "save_attempt")]
pub fn py_save_attempt(
    db_path: &str,
    question_id: i64,
    selected_answer: &str,
    correct_answer: &str,
    is_correct: bool,
) -> PyResult<()> {
    let conn = open_bank(db_path)?;
    Ok(save_attempt(
        &conn,
        question_id,
        selected_answer,
        correct_answer,
        is_correct,
    )?)
}

#[pyfunction]
#[pyo3(name = "get_missed_questions")]
#[pyo3(signature = (db_path, limit=None))]
pub fn py_get_missed_questions(
    db_path: &str,
    limit: Option<usize>,
) -> PyResult<Vec<(Question, i64)>> {
    let conn = open_bank(db_path)?;
    Ok(get_missed_questions(&conn, limit)?)
}

#[pyfunction]
#[pyo3(name = "get_stats")]
pub fn py_get_stats(db_path: &str) -> PyResult<AttemptStats> {
    let conn = open_bank(db_path)?;
    Ok(get_stats(&conn)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bank::{init_database, insert_question};

    fn stored_question(conn: &Connection, text: &str) -> Question {
        let mut question = Question::new(
            text.to_string(),
            vec!["a".into(), "b".into(), "c".into(), "d".into()],
            "b".to_string(),
        )
        .unwrap();
        question.id = insert_question(conn, &question).unwrap();
        question
    }

    #[test]
    fn stats_reflect_saved_attempts() {
        let conn = init_database(":memory:").unwrap();
        let q = stored_question(&conn, "q1");

        save_attempt(&conn, q.id, "b", "b", true).unwrap();
        save_attempt(&conn, q.id, "a", "b", false).unwrap();
        save_attempt(&conn, q.id, "b", "b", true).unwrap();

        let stats = get_stats(&conn).unwrap();
        assert_eq!(stats.total_attempts, 3);
        assert_eq!(stats.correct_count, 2);
        assert_eq!(stats.incorrect_count, 1);
        assert!((stats.accuracy_percent - 66.6).abs() < 1.0);
    }

    #[test]
    fn empty_history_has_zero_accuracy() {
        let conn = init_database(":memory:").unwrap();
        let stats = get_stats(&conn).unwrap();
        assert_eq!(stats.total_attempts, 0);
        assert_eq!(stats.accuracy_percent, 0.0);
    }

    #[test]
    fn missed_questions_sorted_by_miss_count() {
        let conn = init_database(":memory:").unwrap();
        let q1 = stored_question(&conn, "q1");
        let q2 = stored_question(&conn, "q2");

        save_attempt(&conn, q1.id, "a", "b", false).unwrap();
        save_attempt(&conn, q2.id, "a", "b", false).unwrap();
        save_attempt(&conn, q2.id, "c", "b", false).unwrap();

        let missed = get_missed_questions(&conn, None).unwrap();
        assert_eq!(missed.len(), 2);
        assert_eq!(missed[0].0.question_text, "q2");
        assert_eq!(missed[0].1, 2);
        assert_eq!(missed[1].1, 1);

        let limited = get_missed_questions(&conn, Some(1)).unwrap();
        assert_eq!(limited.len(), 1);
    }
}
