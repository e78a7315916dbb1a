//! SCID database reader
//!
//! Decodes SCID chess databases into game headers and main-line moves.
//! The [`scid`] module is the decoder proper and never touches the
//! filesystem; [`files`] and [`listing`] supply the file access and text
//! output used by the `scidread` binary.

pub mod files;
pub mod listing;
pub mod logger;
pub mod scid;

pub use files::{DatabaseFiles, GameFile};
pub use listing::Lister;
pub use scid::{Database, DecodedMove, Error, GameHeader, Generation, ParsedGame, SearchPage};
