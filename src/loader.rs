//! Loader for LS-8 program files.
//!
//! An `.ls8` file is a plain text format:
//! - A line whose first character is `0` or `1` contributes exactly one
//!   instruction byte, parsed from its first 8 characters as base-2.
//! - Every other line (comments, blanks, indented text) is ignored, as
//!   is anything after the 8 binary digits on a code line.
//!
//! The resulting bytes are placed at address 0 in file order.

use std::path::Path;
use thiserror::Error;

/// Parse LS-8 program source into instruction bytes.
pub fn parse_program(source: &str) -> Result<Vec<u8>, LoaderError> {
    let mut bytes = Vec::new();

    for (line_num, line) in source.lines().enumerate() {
        if !line.starts_with('0') && !line.starts_with('1') {
            continue;
        }

        let literal: String = line.chars().take(8).collect();
        if literal.len() != 8 {
            return Err(LoaderError::ParseError {
                line: line_num + 1,
                message: format!("expected 8 binary digits, found {}", literal.len()),
            });
        }

        let byte = u8::from_str_radix(&literal, 2).map_err(|_| LoaderError::ParseError {
            line: line_num + 1,
            message: format!("invalid binary literal '{}'", literal),
        })?;

        bytes.push(byte);
    }

    Ok(bytes)
}

/// Load an LS-8 program file from disk.
pub fn load_program<P: AsRef<Path>>(path: P) -> Result<Vec<u8>, LoaderError> {
    let source = std::fs::read_to_string(path.as_ref())
        .map_err(|e| LoaderError::Io(e.to_string()))?;

    parse_program(&source)
}

/// Errors that can occur while loading a program file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoaderError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("parse error on line {line}: {message}")]
    ParseError { line: usize, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bytes() {
        let source = "10000010\n00000000\n00001000\n00000001\n";
        assert_eq!(parse_program(source).unwrap(), vec![0x82, 0, 8, 1]);
    }

    #[test]
    fn test_comments_and_blanks_ignored() {
        let source = "\
# print8.ls8: Print the number 8

10000010 # LDI R0,8
00000000
00001000
01000111 # PRN R0
00000000
00000001 # HLT
";
        let bytes = parse_program(source).unwrap();
        assert_eq!(bytes, vec![0x82, 0, 8, 0x47, 0, 0x01]);
    }

    #[test]
    fn test_only_first_character_selects_code_lines() {
        // Indented binary does not count as a code line
        let source = " 10000010\n00000001\n";
        assert_eq!(parse_program(source).unwrap(), vec![0x01]);
    }

    #[test]
    fn test_short_line_is_an_error() {
        let err = parse_program("00000001\n101\n").unwrap_err();
        assert_eq!(
            err,
            LoaderError::ParseError {
                line: 2,
                message: "expected 8 binary digits, found 3".to_string(),
            }
        );
    }

    #[test]
    fn test_bad_digit_is_an_error() {
        let err = parse_program("10200010\n").unwrap_err();
        assert!(matches!(err, LoaderError::ParseError { line: 1, .. }));
    }

    #[test]
    fn test_missing_file() {
        let err = load_program("/definitely/not/here.ls8").unwrap_err();
        assert!(matches!(err, LoaderError::Io(_)));
    }

    #[test]
    fn test_empty_source() {
        assert_eq!(parse_program("").unwrap(), Vec::<u8>::new());
    }
}
