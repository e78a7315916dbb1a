use std::fmt;
use std::str::FromStr;

use super::error::FormatError;
use super::{si4, si5};

/// Index flag bit marking a deleted game (IDX_FLAG_DELETE)
pub const FLAG_DELETED: u32 = 1 << 3;

/// On-disk format generation.
///
/// `Scid4` files are big-endian with a 182-byte index header and 47-byte
/// records; `Scid5` files are little-endian with headerless 56-byte records
/// and a varint-coded name file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Generation {
    Scid4,
    Scid5,
}

impl Generation {
    pub const ALL: [Generation; 2] = [Generation::Scid4, Generation::Scid5];

    pub fn index_extension(self) -> &'static str {
        match self {
            Generation::Scid4 => "si4",
            Generation::Scid5 => "si5",
        }
    }

    pub fn name_extension(self) -> &'static str {
        match self {
            Generation::Scid4 => "sn4",
            Generation::Scid5 => "sn5",
        }
    }

    pub fn game_extension(self) -> &'static str {
        match self {
            Generation::Scid4 => "sg4",
            Generation::Scid5 => "sg5",
        }
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Generation::Scid4 => write!(f, "scid4"),
            Generation::Scid5 => write!(f, "scid5"),
        }
    }
}

impl FromStr for Generation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "scid4" | "si4" | "4" => Ok(Generation::Scid4),
            "scid5" | "si5" | "5" => Ok(Generation::Scid5),
            other => Err(format!("unknown SCID generation '{}' (expected scid4 or scid5)", other)),
        }
    }
}

/// Format A (.si4) index header. Format B index files have no header.
///
/// ## Layout (182 bytes, big-endian)
/// ```text
/// magic        8   "Scid.si\x1a"
/// version      2
/// base type    4
/// game count   3
/// auto-load    3   game number to open on load (1-based, 0 = none)
/// description  108 NUL-padded
/// flag names   6 × 9 custom flag descriptions
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexHeader {
    pub version: u16,
    pub base_type: u32,
    pub game_count: u32, // as declared; the record count may be lower
    pub auto_load: u32,
    pub description: String,
    pub flag_names: [String; 6],
}

/// One game's index entry, independent of the file generation it came from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexRecord {
    pub white_id: u32,
    pub black_id: u32,
    pub event_id: u32,
    pub site_id: u32,
    pub round_id: u32,
    pub white_elo: u16, // 0 = unknown
    pub black_elo: u16,
    pub date: u32,       // packed, see `fields`
    pub event_date: u32, // 12-bit relative to `date`, 0 = none
    pub result: u8,      // 0 unknown, 1 white, 2 black, 3 draw
    pub eco: u16,
    pub offset: u64, // byte range in the game file
    pub length: u32,
    pub flags: u32,
    pub ply_count: u32,
    pub variation_count: u8,
    pub comment_count: u8,
    pub nag_count: u8,
}

impl IndexRecord {
    pub fn is_deleted(&self) -> bool {
        self.flags & FLAG_DELETED != 0
    }
}

/// A decoded index file: optional header plus one record per game, in file order
#[derive(Debug, Clone)]
pub struct IndexFile {
    generation: Generation,
    header: Option<IndexHeader>,
    records: Vec<IndexRecord>,
}

impl IndexFile {
    pub fn new(generation: Generation, header: Option<IndexHeader>, records: Vec<IndexRecord>) -> Self {
        IndexFile { generation, header, records }
    }

    /// Decode an in-memory index buffer of the given generation
    pub fn parse(data: &[u8], generation: Generation) -> Result<Self, FormatError> {
        match generation {
            Generation::Scid4 => si4::read_index(data),
            Generation::Scid5 => si5::read_index(data),
        }
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn header(&self) -> Option<&IndexHeader> {
        self.header.as_ref()
    }

    pub fn num_games(&self) -> usize {
        self.records.len()
    }

    pub fn record(&self, game: usize) -> Option<&IndexRecord> {
        self.records.get(game)
    }

    pub fn records(&self) -> &[IndexRecord] {
        &self.records
    }
}
