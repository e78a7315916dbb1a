use std::io;

use thiserror::Error;

/// Errors that make an index or name file unusable.
///
/// Any of these aborts `Database::open`; there is no partial open.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("invalid {file} magic header: {found:02x?}")]
    BadMagic { file: &'static str, found: Vec<u8> },

    #[error("{file} header truncated: need {needed} bytes, have {actual}")]
    TruncatedHeader {
        file: &'static str,
        needed: usize,
        actual: usize,
    },

    #[error("{file} truncated at byte {offset}")]
    Truncated { file: &'static str, offset: usize },

    #[error("name entry at byte {offset}: prefix {prefix} longer than name length {length}")]
    BadPrefix {
        offset: usize,
        prefix: usize,
        length: usize,
    },

    #[error("name entry at byte {offset}: unknown category {category}")]
    BadCategory { offset: usize, category: u64 },
}

/// Errors raised while decoding one game's move stream.
///
/// These stop decoding of that game only; the moves read before the fault are kept.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("no piece at list index {index} for the side to move")]
    NoPiece { index: u8 },

    #[error("move byte 0x{byte:02x} leads off the board")]
    OffBoard { byte: u8 },

    #[error("invalid code {code} for a {piece}")]
    BadCode { piece: &'static str, code: u8 },

    #[error("game data ended in the middle of a move")]
    Truncated,

    #[error("variation end without a matching start")]
    UnbalancedVariation,

    #[error("invalid FEN: {0}")]
    InvalidFen(String),

    #[error("invalid square name: {0:?}")]
    BadSquare(String),
}

/// Crate-level error returned where both file decoding and game-byte reads happen.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Format(#[from] FormatError),

    #[error("failed to read game data: {0}")]
    Io(#[from] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_error_messages() {
        let err = FormatError::TruncatedHeader { file: "index", needed: 182, actual: 10 };
        assert_eq!(err.to_string(), "index header truncated: need 182 bytes, have 10");

        let err = FormatError::BadMagic { file: "name", found: vec![0x41, 0x42] };
        assert_eq!(err.to_string(), "invalid name magic header: [41, 42]");
    }

    #[test]
    fn test_io_error_converts() {
        let io_err = io::Error::new(io::ErrorKind::UnexpectedEof, "short read");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.to_string().starts_with("failed to read game data"));
    }
}
