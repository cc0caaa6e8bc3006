//! Extraction of question records from free-form generated quiz text
//!
//! The text-generation service returns loosely structured prose. Blocks are
//! delimited by numbered-question prefixes ("1. ", "2. " ...) and parsed with
//! a small line classifier; a malformed block yields a diagnostic and never
//! aborts the batch.

use pyo3::prelude::*;
use rusqlite::Connection;

use crate::bank::{insert_question, Question, OPTION_COUNT};
use crate::error::{ExtractionErrorKind, QuizError};

/// Phrase marking a block as generator preamble rather than a question.
const INTRO_MARKER: &str = "multiple-choice quiz questions";

/// Why one block failed extraction, paired with the offending text.
#[pyclass]
#[derive(Debug, Clone)]
pub struct Diagnostic {
    #[pyo3(get)]
    pub block: String,
    #[pyo3(get)]
    pub reason: String,
}

#[pymethods]
impl Diagnostic {
    fn __repr__(&self) -> String {
        format!(
            "Diagnostic(reason='{}', block='{}...')",
            self.reason,
            &self.block.chars().take(40).collect::<String>()
        )
    }
}

/// Result of one extraction run.
#[derive(Debug, Default)]
pub struct Extraction {
    pub questions: Vec<Question>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Strips a question-index prefix ("12. rest") from a line, if present.
fn index_prefix(line: &str) -> Option<&str> {
    let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits == 0 {
        return None;
    }
    let rest = line[digits..].strip_prefix('.')?;
    rest.strip_prefix(|c: char| c.is_whitespace())
}

/// Returns the option text when the line has the form "X) text", X in A-D.
fn option_text(line: &str) -> Option<&str> {
    let mut chars = line.chars();
    let letter = chars.next()?;
    if !('A'..='D').contains(&letter) {
        return None;
    }
    let rest = chars.as_str().strip_prefix(')')?;
    let text = rest.strip_prefix(|c: char| c.is_whitespace())?.trim();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn push_block(blocks: &mut Vec<String>, text: &str) {
    let trimmed = text.trim();
    if !trimmed.is_empty() {
        blocks.push(trimmed.to_string());
    }
}

/// Split raw text into one trimmed block per numbered question. Text before
/// the first index line forms a leading block of its own.
fn split_blocks(raw_text: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut current = String::new();
    for line in raw_text.lines() {
        if let Some(rest) = index_prefix(line) {
            push_block(&mut blocks, &current);
            current.clear();
            current.push_str(rest);
        } else {
            current.push_str(line);
        }
        current.push('\n');
    }
    push_block(&mut blocks, &current);
    blocks
}

/// Parse one block into a validated question.
fn parse_block(block: &str) -> Result<Question, ExtractionErrorKind> {
    let question_text = block
        .lines()
        .next()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .ok_or(ExtractionErrorKind::MissingQuestion)?
        .to_string();

    let mut option_lines: Vec<String> = Vec::new();
    let mut answer: Option<String> = None;
    for line in block.lines().map(str::trim) {
        if let Some(rest) = line.strip_prefix("Answer:") {
            if let Some(text) = option_text(rest.trim_start()) {
                if answer.is_none() {
                    answer = Some(text.to_string());
                }
                continue;
            }
        }
        if let Some(text) = option_text(line) {
            option_lines.push(text.to_string());
        }
    }

    if option_lines.len() < OPTION_COUNT {
        return Err(ExtractionErrorKind::InsufficientOptions);
    }

    // Without an explicit "Answer:" line, the answer is the first lettered
    // line after the four option lines (the bare restatement form). Option
    // lines themselves are never mistaken for the answer.
    let correct_answer = answer
        .or_else(|| option_lines.get(OPTION_COUNT).cloned())
        .ok_or(ExtractionErrorKind::MissingAnswer)?;

    let mut options: Vec<String> = option_lines[..OPTION_COUNT].to_vec();
    if !options.contains(&correct_answer) {
        // Keep the correct option even when the generator emitted more than
        // four option lines and the right one was not among the first four.
        if option_lines[OPTION_COUNT..].contains(&correct_answer) {
            options[OPTION_COUNT - 1] = correct_answer.clone();
        } else {
            return Err(ExtractionErrorKind::AnswerNotAnOption);
        }
    }

    for (i, option) in options.iter().enumerate() {
        if options[..i].contains(option) {
            return Err(ExtractionErrorKind::DuplicateOption);
        }
    }

    Ok(Question {
        id: 0,
        question_text,
        options,
        correct_answer,
    })
}

/// Extract question records from raw generated text.
///
/// Never fails as a whole: malformed blocks are reported in
/// `Extraction::diagnostics` while well-formed neighbors still parse.
pub fn extract(raw_text: &str) -> Extraction {
    let mut result = Extraction::default();

    if raw_text.trim().is_empty() {
        result.diagnostics.push(Diagnostic {
            block: String::new(),
            reason: "empty input text".to_string(),
        });
        return result;
    }

    for block in split_blocks(raw_text) {
        if block.to_lowercase().contains(INTRO_MARKER) {
            continue;
        }
        match parse_block(&block) {
            Ok(question) => result.questions.push(question),
            Err(kind) => {
                log::warn!("discarding malformed quiz block: {}", kind);
                result.diagnostics.push(Diagnostic {
                    block,
                    reason: kind.to_string(),
                });
            }
        }
    }

    result
}

/// Extract questions from raw text and store them in the bank. Returns the
/// number of stored questions along with the extraction diagnostics.
pub fn import_quiz_text(
    conn: &Connection,
    raw_text: &str,
) -> Result<(usize, Vec<Diagnostic>), QuizError> {
    let extraction = extract(raw_text);
    let mut count = 0;
    for question in &extraction.questions {
        insert_question(conn, question)?;
        count += 1;
    }
    log::debug!(
        "imported {} questions ({} blocks rejected)",
        count,
        extraction.diagnostics.len()
    );
    Ok((count, extraction.diagnostics))
}

// ============= Python Bindings =============

#[pyfunction]
#[pyo3(name = "extract_questions")]
pub fn py_extract_questions(raw_text: &str) -> (Vec<Question>, Vec<Diagnostic>) {
    let extraction = extract(raw_text);
    (extraction.questions, extraction.diagnostics)
}

#[pyfunction]
#[pyo3(name = "import_quiz_text")]
pub fn py_import_quiz_text(db_path: &str, raw_text: &str) -> PyResult<(usize, Vec<Diagnostic>)> {
    let conn = crate::bank::init_database(db_path)
        .map_err(|e| pyo3::exceptions::PyRuntimeError::new_err(e.to_string()))?;
    Ok(import_quiz_text(&conn, raw_text)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bank::{count_questions, init_database};

    const WELL_FORMED: &str = "1. What is 2+2?\nA) 3\nB) 4\nC) 5\nD) 6\nAnswer: B) 4";

    #[test]
    fn well_formed_block_round_trips() {
        let result = extract(WELL_FORMED);
        assert_eq!(result.questions.len(), 1);
        assert!(result.diagnostics.is_empty());

        let q = &result.questions[0];
        assert_eq!(q.question_text, "What is 2+2?");
        assert_eq!(q.options, vec!["3", "4", "5", "6"]);
        assert_eq!(q.correct_answer, "4");
    }

    #[test]
    fn preamble_block_is_skipped_silently() {
        let raw = format!(
            "Here are 15 multiple-choice quiz questions for you:\n{}",
            WELL_FORMED
        );
        let result = extract(&raw);
        assert_eq!(result.questions.len(), 1);
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn malformed_block_does_not_abort_the_batch() {
        let raw = "1. First?\nA) a\nB) b\nC) c\nD) d\nAnswer: A) a\n\
                   2. Broken?\nA) only\nB) two\n\
                   3. Third?\nA) w\nB) x\nC) y\nD) z\nAnswer: D) z";
        let result = extract(raw);
        assert_eq!(result.questions.len(), 2);
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].reason, "insufficient options");
        assert!(result.diagnostics[0].block.starts_with("Broken?"));
        assert_eq!(result.questions[0].question_text, "First?");
        assert_eq!(result.questions[1].correct_answer, "z");
    }

    #[test]
    fn missing_answer_line_is_reported() {
        let raw = "1. No answer here?\nA) a\nB) b\nC) c\nD) d";
        let result = extract(raw);
        assert!(result.questions.is_empty());
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].reason, "missing answer");
    }

    #[test]
    fn bare_answer_line_after_options_is_accepted() {
        let raw = "1. Pick one?\nA) a\nB) b\nC) c\nD) d\nB) b";
        let result = extract(raw);
        assert_eq!(result.questions.len(), 1);
        assert_eq!(result.questions[0].correct_answer, "b");
        assert_eq!(result.questions[0].options, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn extra_option_lines_never_drop_the_correct_one() {
        let raw = "1. Pick one?\nA) a\nB) b\nC) c\nD) d\nA) extra\nAnswer: A) extra";
        let result = extract(raw);
        assert_eq!(result.questions.len(), 1);

        let q = &result.questions[0];
        assert_eq!(q.options, vec!["a", "b", "c", "extra"]);
        assert_eq!(q.correct_answer, "extra");
    }

    #[test]
    fn answer_matching_no_option_is_rejected() {
        let raw = "1. Pick one?\nA) a\nB) b\nC) c\nD) d\nAnswer: A) elsewhere";
        let result = extract(raw);
        assert!(result.questions.is_empty());
        assert_eq!(
            result.diagnostics[0].reason,
            "answer is not one of the options"
        );
    }

    #[test]
    fn duplicate_option_text_is_rejected() {
        let raw = "1. Pick one?\nA) same\nB) same\nC) c\nD) d\nAnswer: C) c";
        let result = extract(raw);
        assert!(result.questions.is_empty());
        assert_eq!(result.diagnostics[0].reason, "duplicate option text");
    }

    #[test]
    fn empty_input_yields_one_global_diagnostic() {
        let result = extract("   \n  ");
        assert!(result.questions.is_empty());
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].reason, "empty input text");
    }

    #[test]
    fn multi_digit_indices_split_blocks() {
        let raw = "9. Q nine?\nA) a\nB) b\nC) c\nD) d\nAnswer: A) a\n\
                   10. Q ten?\nA) e\nB) f\nC) g\nD) h\nAnswer: B) f";
        let result = extract(raw);
        assert_eq!(result.questions.len(), 2);
        assert_eq!(result.questions[1].question_text, "Q ten?");
    }

    #[test]
    fn empty_block_is_missing_question() {
        assert_eq!(
            parse_block("").unwrap_err(),
            ExtractionErrorKind::MissingQuestion
        );
    }

    #[test]
    fn import_stores_valid_questions() {
        let conn = init_database(":memory:").unwrap();
        let raw = format!("{}\n2. Broken?\nA) only\nAnswer: A) only", WELL_FORMED);
        let (count, diagnostics) = import_quiz_text(&conn, &raw).unwrap();
        assert_eq!(count, 1);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(count_questions(&conn).unwrap(), 1);
    }
}
