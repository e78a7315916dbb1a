use std::io;

use log::debug;

use super::error::{Error, FormatError};
use super::fields::{date_string, eco_string, event_date, result_string, UNKNOWN_DATE};
use super::games::{self, ParsedGame};
use super::index::{Generation, IndexFile, IndexHeader, IndexRecord};
use super::moves::DecodedMove;
use super::names::{NameDictionary, UNKNOWN_NAME};

/// Display-ready metadata for one game, with every name resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameHeader {
    pub white: String,
    pub black: String,
    pub event: String,
    pub site: String,
    pub round: String,
    pub date: String,
    pub event_date: Option<String>,
    pub eco: String,
    pub result: String,
    pub white_elo: u16,
    pub black_elo: u16,
    pub ply_count: u32,
    pub deleted: bool,
}

impl GameHeader {
    /// Header for a game that does not exist
    pub fn unknown() -> Self {
        GameHeader {
            white: UNKNOWN_NAME.to_string(),
            black: UNKNOWN_NAME.to_string(),
            event: UNKNOWN_NAME.to_string(),
            site: UNKNOWN_NAME.to_string(),
            round: UNKNOWN_NAME.to_string(),
            date: UNKNOWN_DATE.to_string(),
            event_date: None,
            eco: String::new(),
            result: result_string(0).to_string(),
            white_elo: 0,
            black_elo: 0,
            ply_count: 0,
            deleted: false,
        }
    }
}

/// One page of search results
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPage {
    /// (game number, header), ascending by game number
    pub matches: Vec<(usize, GameHeader)>,
    /// Number of matching games before paging
    pub total: usize,
}

/// An opened SCID database: decoded index and name dictionary.
///
/// Holds no file handles. Game bytes are supplied by the caller, either
/// directly to [`Database::parse_game`] or through the reader passed to
/// [`Database::load_game`]. Read-only after `open`, so it can be shared
/// across threads.
#[derive(Debug, Clone)]
pub struct Database {
    index: IndexFile,
    names: NameDictionary,
}

impl Database {
    /// Decode the index and name file buffers of one database
    pub fn open(index: &[u8], names: &[u8], generation: Generation) -> Result<Self, FormatError> {
        let index = IndexFile::parse(index, generation)?;
        let names = NameDictionary::parse(names, generation)?;
        debug!("opened {} database with {} games", generation, index.num_games());
        Ok(Self::from_parts(index, names))
    }

    pub fn from_parts(index: IndexFile, names: NameDictionary) -> Self {
        Database { index, names }
    }

    pub fn generation(&self) -> Generation {
        self.index.generation()
    }

    /// The format A index header; `None` for format B
    pub fn index_header(&self) -> Option<&IndexHeader> {
        self.index.header()
    }

    pub fn game_count(&self) -> usize {
        self.index.num_games()
    }

    pub fn record(&self, game: usize) -> Option<&IndexRecord> {
        self.index.record(game)
    }

    pub fn names(&self) -> &NameDictionary {
        &self.names
    }

    /// Resolved header for game `game`; all-unknown when out of range
    pub fn header(&self, game: usize) -> GameHeader {
        match self.index.record(game) {
            Some(record) => self.header_for(record),
            None => GameHeader::unknown(),
        }
    }

    fn header_for(&self, record: &IndexRecord) -> GameHeader {
        GameHeader {
            white: self.names.player(record.white_id).to_string(),
            black: self.names.player(record.black_id).to_string(),
            event: self.names.event(record.event_id).to_string(),
            site: self.names.site(record.site_id).to_string(),
            round: self.names.round(record.round_id).to_string(),
            date: date_string(record.date),
            event_date: event_date(record.date, record.event_date).map(date_string),
            eco: eco_string(record.eco),
            result: result_string(record.result).to_string(),
            white_elo: record.white_elo,
            black_elo: record.black_elo,
            ply_count: record.ply_count,
            deleted: record.is_deleted(),
        }
    }

    /// Main-line moves of one game record
    pub fn moves(&self, game_bytes: &[u8]) -> Vec<DecodedMove> {
        games::parse_game(game_bytes).moves
    }

    pub fn parse_game(&self, game_bytes: &[u8]) -> ParsedGame {
        games::parse_game(game_bytes)
    }

    /// Fetch and decode game `game`.
    ///
    /// `read(offset, length)` must return that byte range of the game file.
    /// It is not called for a game number out of range or a zero-length
    /// record; those yield an empty game.
    pub fn load_game<F>(&self, game: usize, read: F) -> Result<ParsedGame, Error>
    where
        F: FnOnce(u64, u32) -> io::Result<Vec<u8>>,
    {
        let Some(record) = self.index.record(game) else {
            return Ok(ParsedGame::empty());
        };
        if record.length == 0 {
            return Ok(ParsedGame::empty());
        }
        let bytes = read(record.offset, record.length)?;
        Ok(games::parse_game(&bytes))
    }

    /// Case-insensitive substring search over players, event, site and ECO
    pub fn search(&self, needle: &str, offset: usize, limit: usize) -> SearchPage {
        let needle = needle.to_lowercase();
        let hits: Vec<usize> = self
            .index
            .records()
            .iter()
            .enumerate()
            .filter(|(_, record)| self.record_matches(record, &needle))
            .map(|(game, _)| game)
            .collect();

        let matches = hits
            .iter()
            .skip(offset)
            .take(limit)
            .map(|&game| (game, self.header(game)))
            .collect();
        SearchPage { matches, total: hits.len() }
    }

    fn record_matches(&self, record: &IndexRecord, needle: &str) -> bool {
        let eco = eco_string(record.eco);
        [
            self.names.player(record.white_id),
            self.names.player(record.black_id),
            self.names.event(record.event_id),
            self.names.site(record.site_id),
            eco.as_str(),
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(needle))
    }
}
