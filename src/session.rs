//! Quiz session engine - no-repeat sampling, option shuffling and scoring
//!
//! One `QuizSession` models one quiz attempt over a fixed pool. The engine
//! never mutates the canonical stored records: each draw hands out a
//! session-local copy with freshly shuffled options. Pacing between answer
//! and next draw belongs to the presentation layer; the engine holds no
//! timers.

use pyo3::prelude::*;
use rand::seq::SliceRandom;
use rand::Rng;
use rusqlite::Connection;

use crate::bank::{fetch_all_questions, Question};
use crate::error::QuizError;

/// Questions per session when the bank holds enough of them.
pub const DEFAULT_POOL_SIZE: usize = 15;

/// One question as presented to the caller: shuffled options, no answer.
#[pyclass]
#[derive(Debug, Clone)]
pub struct DrawnQuestion {
    /// 1-based position within the session ("Q3: ...").
    #[pyo3(get)]
    pub number: usize,
    #[pyo3(get)]
    pub question_text: String,
    #[pyo3(get)]
    pub options: Vec<String>,
}

#[pymethods]
impl DrawnQuestion {
    fn __repr__(&self) -> String {
        format!(
            "DrawnQuestion(number={}, text='{}...')",
            self.number,
            &self.question_text.chars().take(40).collect::<String>()
        )
    }
}

/// Verdict for one submitted answer.
#[pyclass]
#[derive(Debug, Clone)]
pub struct AnswerOutcome {
    #[pyo3(get)]
    pub is_correct: bool,
    #[pyo3(get)]
    pub correct_answer: String,
}

#[pymethods]
impl AnswerOutcome {
    fn __repr__(&self) -> String {
        format!(
            "AnswerOutcome(is_correct={}, correct_answer='{}')",
            self.is_correct, self.correct_answer
        )
    }
}

#[derive(Debug)]
struct ActiveQuestion {
    correct_answer: String,
    answered: bool,
}

/// State of one quiz attempt. Owned by a single caller; concurrent sessions
/// each hold their own instance and their own copies of the drawn questions.
#[pyclass]
#[derive(Debug)]
pub struct QuizSession {
    pool: Vec<Question>,
    asked: Vec<usize>,
    score: u32,
    current: Option<ActiveQuestion>,
    finished: bool,
}

#[pymethods]
impl QuizSession {
    /// Build a session over an in-memory pool. The pool is shuffled and
    /// truncated to `requested` questions (fewer when the pool is smaller).
    #[staticmethod]
    #[pyo3(signature = (pool, requested = DEFAULT_POOL_SIZE))]
    pub fn with_pool(mut pool: Vec<Question>, requested: usize) -> Result<QuizSession, QuizError> {
        if pool.is_empty() {
            return Err(QuizError::EmptyPool);
        }
        let size = requested.clamp(1, pool.len());
        pool.shuffle(&mut rand::thread_rng());
        pool.truncate(size);
        log::debug!("starting quiz session over {} questions", pool.len());
        Ok(QuizSession {
            pool,
            asked: Vec::new(),
            score: 0,
            current: None,
            finished: false,
        })
    }

    /// Start a session from the question bank at `db_path`.
    #[staticmethod]
    #[pyo3(signature = (db_path, requested = DEFAULT_POOL_SIZE))]
    pub fn start(db_path: &str, requested: usize) -> Result<QuizSession, QuizError> {
        let conn = Connection::open(db_path)?;
        let pool = fetch_all_questions(&conn)?;
        Self::with_pool(pool, requested)
    }

    /// Draw the next not-yet-asked question, uniformly at random. Returns
    /// `None` once every pool question has been asked; the session is then
    /// finished and further calls change nothing.
    pub fn draw_next(&mut self) -> Option<DrawnQuestion> {
        if self.finished {
            return None;
        }
        if self.asked.len() == self.pool.len() {
            self.finished = true;
            self.current = None;
            log::debug!("quiz finished: {}", self.summary());
            return None;
        }

        let mut rng = rand::thread_rng();
        let remaining: Vec<usize> = (0..self.pool.len())
            .filter(|i| !self.asked.contains(i))
            .collect();
        let index = remaining[rng.gen_range(0..remaining.len())];
        self.asked.push(index);

        let question = &self.pool[index];
        let mut options = question.options.clone();
        options.shuffle(&mut rng);
        self.current = Some(ActiveQuestion {
            correct_answer: question.correct_answer.clone(),
            answered: false,
        });

        Some(DrawnQuestion {
            number: self.asked.len(),
            question_text: question.question_text.clone(),
            options,
        })
    }

    /// Score the selected option text against the current question. Exact
    /// string equality; a correct answer adds one point. The caller advances
    /// with `draw_next` whenever it is ready.
    pub fn submit_answer(&mut self, selected: &str) -> Result<AnswerOutcome, QuizError> {
        let current = self.current.as_mut().ok_or(QuizError::NoActiveQuestion)?;
        if current.answered {
            return Err(QuizError::AlreadyAnswered);
        }
        current.answered = true;

        let is_correct = selected == current.correct_answer;
        if is_correct {
            self.score += 1;
        }
        Ok(AnswerOutcome {
            is_correct,
            correct_answer: current.correct_answer.clone(),
        })
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn pool_size(&self) -> usize {
        self.pool.len()
    }

    pub fn asked_count(&self) -> usize {
        self.asked.len()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Final (or running) score as "score/pool_size".
    pub fn summary(&self) -> String {
        format!("{}/{}", self.score, self.pool.len())
    }

    fn __repr__(&self) -> String {
        format!(
            "QuizSession(asked={}/{}, score={}, finished={})",
            self.asked.len(),
            self.pool.len(),
            self.score,
            self.finished
        )
    }
}
