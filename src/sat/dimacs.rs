#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]

//! A reader for the DIMACS CNF file format.
//!
//! DIMACS CNF is the standard text format for satisfiability problems:
//! comment lines start with `c`, the problem line with `p`, and every other
//! line lists the signed integer literals of one clause, terminated by `0`.
//! Some competition files end the clause section with a `%` marker.
//!
//! The reader produces the clause lists the solver consumes — sequences of
//! non-zero signed integers — and leaves variable bookkeeping to the solver.

use itertools::Itertools;
use std::io::{self, BufRead};
use std::path::Path;
use thiserror::Error;

/// Errors produced while reading DIMACS input.
#[derive(Debug, Error)]
pub enum DimacsError {
    /// The file could not be opened or read.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A token where a literal was expected did not parse as an integer.
    #[error("malformed literal {token:?} on line {line}")]
    MalformedLiteral {
        /// The offending token.
        token: String,
        /// 1-based line number.
        line: usize,
    },
}

/// Parses DIMACS data from a buffered reader into clause lists.
///
/// Comment (`c`) and problem (`p`) lines are skipped, a `%` line ends the
/// input, and the `0` terminators are filtered out of each clause.
///
/// # Errors
///
/// Returns [`DimacsError::Io`] when reading fails and
/// [`DimacsError::MalformedLiteral`] on a non-integer token.
pub fn parse_dimacs<R: BufRead>(reader: R) -> Result<Vec<Vec<i32>>, DimacsError> {
    let mut clauses = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let mut tokens = line.split_whitespace().peekable();

        match tokens.peek() {
            None | Some(&"c" | &"p") => {}
            Some(&"%") => break,
            Some(_) => {
                let clause = tokens
                    .map(|token| {
                        token.parse::<i32>().map_err(|_| DimacsError::MalformedLiteral {
                            token: token.to_string(),
                            line: idx + 1,
                        })
                    })
                    .filter_ok(|&p| p != 0)
                    .try_collect::<_, Vec<i32>, _>()?;

                if !clause.is_empty() {
                    clauses.push(clause);
                }
            }
        }
    }
    Ok(clauses)
}

/// Parses the DIMACS file at `path`.
///
/// # Errors
///
/// Propagates [`DimacsError`] from opening or parsing the file.
pub fn parse_file(path: &Path) -> Result<Vec<Vec<i32>>, DimacsError> {
    let file = std::fs::File::open(path)?;
    parse_dimacs(io::BufReader::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_parse_simple_dimacs() {
        let content = "c an example\n\
                       p cnf 3 2\n\
                       1 -2 0\n\
                       2 3 0\n";
        let clauses = parse_dimacs(Cursor::new(content)).unwrap();

        assert_eq!(clauses, vec![vec![1, -2], vec![2, 3]]);
    }

    #[test]
    fn test_parse_skips_blank_lines_and_end_marker() {
        let content = "p cnf 2 2\n\
                       \n\
                       1 0\n\
                       -2 0\n\
                       %\n\
                       this is never read";
        let clauses = parse_dimacs(Cursor::new(content)).unwrap();

        assert_eq!(clauses, vec![vec![1], vec![-2]]);
    }

    #[test]
    fn test_parse_malformed_literal() {
        let content = "1 abc 0\n";
        let result = parse_dimacs(Cursor::new(content));

        match result {
            Err(DimacsError::MalformedLiteral { token, line }) => {
                assert_eq!(token, "abc");
                assert_eq!(line, 1);
            }
            other => panic!("expected a malformed-literal error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_clause_spanning_terminator_only() {
        let clauses = parse_dimacs(Cursor::new("0\n")).unwrap();
        assert!(clauses.is_empty(), "a lone terminator yields no clause");
    }

    #[test]
    fn test_parse_missing_file() {
        let result = parse_file(Path::new("does/not/exist.cnf"));
        assert!(matches!(result, Err(DimacsError::Io(_))));
    }
}
