//! Decoding of SCID databases, both the SCID 4 (.si4/.sn4/.sg4) and SCID 5
//! (.si5/.sn5/.sg5) generations. Everything here works on in-memory buffers.

pub mod board;
pub mod database;
pub mod error;
pub mod fields;
pub mod games;
pub mod index;
pub mod moves;
pub mod names;
pub mod si4;
pub mod si5;
pub mod square;
pub mod utils;

pub use board::Board;
pub use database::{Database, GameHeader, SearchPage};
pub use error::{DecodeError, Error, FormatError};
pub use games::{parse_game, ParsedGame, StartFlags};
pub use index::{Generation, IndexFile, IndexHeader, IndexRecord};
pub use moves::DecodedMove;
pub use names::{NameCategory, NameDictionary};
pub use square::{Color, PieceType, Square};
