//! Text program format: one byte per line written in binary, `#` starts a
//! comment, blank lines are ignored.

use std::path::{Path, PathBuf};

use log::debug;
use thiserror::Error;

use crate::isa::Word;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("couldn't open {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid number {token:?} on line {line}")]
    InvalidNumber { line: usize, token: String },
    #[error("program was empty")]
    Empty,
    #[error("program is {len} bytes but memory holds {capacity}")]
    TooLarge { len: usize, capacity: usize },
}

pub fn parse_program(text: &str) -> Result<Vec<Word>, LoadError> {
    let mut program = vec![];
    for (i, line) in text.lines().enumerate() {
        let token = match line.split_whitespace().next() {
            Some(t) if !t.starts_with('#') => t,
            _ => continue,
        };
        let byte = Word::from_str_radix(token, 2).map_err(|_| LoadError::InvalidNumber {
            line: i + 1,
            token: token.to_string(),
        })?;
        program.push(byte);
    }
    if program.is_empty() {
        return Err(LoadError::Empty);
    }
    Ok(program)
}

pub fn load_file(path: impl AsRef<Path>) -> Result<Vec<Word>, LoadError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let program = parse_program(&text)?;
    debug!("read {} bytes from {}", program.len(), path.display());
    Ok(program)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_comments_and_blanks() {
        let text = "# Print the number 8\n\n10000010 # LDI R0,8\n00000000\n  00001000\n\t# done\n00000001";
        assert_eq!(parse_program(text).unwrap(), vec![0b1000_0010, 0, 8, 1]);
    }

    #[test]
    fn rejects_non_binary_tokens() {
        match parse_program("00000001\n00000021\n") {
            Err(LoadError::InvalidNumber { line, token }) => {
                assert_eq!(line, 2);
                assert_eq!(token, "00000021");
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(
            parse_program("100000000"),
            Err(LoadError::InvalidNumber { .. })
        ));
    }

    #[test]
    fn empty_program() {
        assert!(matches!(parse_program("# nothing\n\n"), Err(LoadError::Empty)));
    }

    #[test]
    fn missing_file() {
        let err = load_file("/nonexistent/ls8/prog.ls8").unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
        assert!(err.to_string().starts_with("couldn't open /nonexistent/ls8/prog.ls8"));
    }
}
