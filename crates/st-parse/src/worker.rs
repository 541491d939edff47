//! Parallel parsing of many files.
//!
//! Paths are queued on a channel and drained by a fixed set of scoped worker
//! threads. Each worker lexes and parses with its own scanner; nothing but
//! the grammar table is shared.

use std::path::PathBuf;
use std::thread;

use crossbeam_channel::unbounded;
use st_syntax::lexer::{Lexer, Token};
use st_syntax::{parse_tokens, Parse};
use tracing::debug;

/// The result of processing one file.
#[derive(Debug)]
pub struct FileReport {
    pub path: PathBuf,
    pub text: String,
    pub tokens: Vec<Token>,
    pub parse: Parse,
}

impl FileReport {
    /// Lexes `text` once and parses the resulting tokens.
    #[must_use]
    pub fn new(path: PathBuf, text: String) -> Self {
        let mut lexer = Lexer::new(&text);
        let tokens: Vec<Token> = lexer.by_ref().collect();
        let parse = parse_tokens(&text, &tokens, lexer.state());
        Self {
            path,
            text,
            tokens,
            parse,
        }
    }

    #[must_use]
    pub fn ok(&self) -> bool {
        self.parse.ok()
    }
}

/// A file that could not be read.
#[derive(Debug)]
pub struct ReadFailure {
    pub path: PathBuf,
    pub error: std::io::Error,
}

pub type Outcome = Result<FileReport, ReadFailure>;

/// Reads and parses every path on `jobs` worker threads.
///
/// Results come back in the order of `paths`.
#[must_use]
pub fn parse_files(paths: Vec<PathBuf>, jobs: usize) -> Vec<Outcome> {
    let total = paths.len();
    let workers = jobs.clamp(1, total.max(1));
    let (job_tx, job_rx) = unbounded::<(usize, PathBuf)>();
    let (result_tx, result_rx) = unbounded::<(usize, Outcome)>();

    for job in paths.into_iter().enumerate() {
        // The receiver is alive until the scope below ends.
        let _ = job_tx.send(job);
    }
    drop(job_tx);

    thread::scope(|scope| {
        for worker in 0..workers {
            let job_rx = job_rx.clone();
            let result_tx = result_tx.clone();
            scope.spawn(move || {
                let mut parsed = 0usize;
                for (index, path) in job_rx.iter() {
                    let outcome = process(path);
                    parsed += 1;
                    if result_tx.send((index, outcome)).is_err() {
                        break;
                    }
                }
                debug!(worker, parsed, "worker finished");
            });
        }
    });
    drop(result_tx);

    let mut slots: Vec<Option<Outcome>> = std::iter::repeat_with(|| None).take(total).collect();
    for (index, outcome) in result_rx.iter() {
        slots[index] = Some(outcome);
    }
    slots.into_iter().flatten().collect()
}

fn process(path: PathBuf) -> Outcome {
    match std::fs::read_to_string(&path) {
        Ok(text) => {
            let report = FileReport::new(path, text);
            debug!(
                path = %report.path.display(),
                tokens = report.tokens.len(),
                errors = report.parse.errors().len(),
                "parsed file"
            );
            Ok(report)
        }
        Err(error) => Err(ReadFailure { path, error }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_dir(prefix: &str) -> PathBuf {
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time went backwards")
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("st-parse-{prefix}-{stamp}"));
        std::fs::create_dir_all(&dir).expect("create temp directory");
        dir
    }

    #[test]
    fn test_results_keep_input_order() {
        let root = temp_dir("workers");
        let paths: Vec<PathBuf> = (0..12)
            .map(|n| {
                let path = root.join(format!("f{n}.st"));
                let text = if n % 4 == 0 {
                    format!("x := {n}\n")
                } else {
                    format!("x := {n};\n")
                };
                std::fs::write(&path, text).expect("write");
                path
            })
            .collect();

        let outcomes = parse_files(paths.clone(), 3);
        assert_eq!(outcomes.len(), paths.len());
        for (n, (outcome, path)) in outcomes.iter().zip(&paths).enumerate() {
            let report = outcome.as_ref().expect("readable");
            assert_eq!(&report.path, path);
            assert_eq!(report.ok(), n % 4 != 0, "{}", report.path.display());
        }
        let _ = std::fs::remove_dir_all(root);
    }

    #[test]
    fn test_unreadable_file_is_reported() {
        let missing = std::env::temp_dir().join("st-parse-missing-input.st");
        let outcomes = parse_files(vec![missing.clone()], 4);
        match &outcomes[..] {
            [Err(failure)] => assert_eq!(failure.path, missing),
            other => panic!("unexpected outcomes: {other:?}"),
        }
    }

    #[test]
    fn test_report_matches_separate_lex_and_parse() {
        let text = "PROGRAM p\nVAR x : INT; END_VAR\n(* open\nx := 1;".to_string();
        let report = FileReport::new(PathBuf::from("p.st"), text.clone());
        assert_eq!(report.tokens, st_syntax::lex(&text));
        let expected = st_syntax::parse(&text);
        assert_eq!(report.parse.green(), expected.green());
        assert_eq!(report.parse.errors(), expected.errors());
        assert!(!report.ok());
    }

    #[test]
    fn test_no_paths() {
        assert!(parse_files(Vec::new(), 8).is_empty());
    }
}
