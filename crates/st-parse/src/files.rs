//! Expands command-line inputs into the list of files to parse.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum CollectError {
    #[error("invalid pattern `{pattern}`: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
    #[error("cannot read {path}: {source}")]
    Glob {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("no such file or directory: {0}")]
    NotFound(String),
}

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: false,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// Resolves files, directories and glob patterns into a sorted, deduplicated
/// file list.
///
/// Directories are searched recursively for files whose extension is one of
/// `extensions`, compared without case. Files named explicitly are taken as
/// they are.
pub fn collect_files(inputs: &[String], extensions: &[String]) -> Result<Vec<PathBuf>, CollectError> {
    let mut files = BTreeSet::new();
    for input in inputs {
        let path = Path::new(input);
        if path.is_file() {
            files.insert(path.to_path_buf());
        } else if path.is_dir() {
            for extension in extensions {
                let pattern = format!("{}/**/*.{extension}", Pattern::escape(input));
                expand(&pattern, &mut files)?;
            }
        } else if is_pattern(input) {
            expand(input, &mut files)?;
        } else {
            return Err(CollectError::NotFound(input.clone()));
        }
    }
    debug!(count = files.len(), "collected input files");
    Ok(files.into_iter().collect())
}

fn is_pattern(input: &str) -> bool {
    input.contains(['*', '?', '['])
}

fn expand(pattern: &str, files: &mut BTreeSet<PathBuf>) -> Result<(), CollectError> {
    let entries = glob::glob_with(pattern, MATCH_OPTIONS).map_err(|source| CollectError::Pattern {
        pattern: pattern.to_string(),
        source,
    })?;
    for entry in entries {
        let path = entry.map_err(|err| CollectError::Glob {
            path: err.path().to_path_buf(),
            source: err.into_error(),
        })?;
        if path.is_file() {
            files.insert(path);
        }
    }
    Ok(())
}
