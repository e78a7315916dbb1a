//! Game-file record decoding (.sg4 / .sg5).
//!
//! A game record is laid out as:
//!
//! 1. extra tag pairs, terminated by a zero length byte;
//! 2. a start byte (bit 0: custom start position, bit 1: promotions,
//!    bit 2: under-promotions), followed by a NUL-terminated FEN when bit 0 is set;
//! 3. the move stream, driven through [`moves::decode`](super::moves::decode).
//!
//! Variations are followed on a stack of boards so the piece lists stay in
//! step, but only main-line moves are returned.

use std::mem;

use log::debug;

use super::board::Board;
use super::error::DecodeError;
use super::moves::{self, DecodedMove, Marker, Token};
use super::square::Square;

/// Tag names for the one-byte codes 241-255
pub const COMMON_TAGS: [&str; 15] = [
    "Annotator",
    "PlyCount",
    "EventType",
    "EventRounds",
    "EventCountry",
    "EventCategory",
    "Source",
    "SourceDate",
    "TimeControl",
    "Board",
    "Opening",
    "Variation",
    "SubVariation",
    "Section",
    "Stage",
];

const FIRST_COMMON_TAG: u8 = 241;
const MAX_SHORT_VALUE: u8 = 240;

/// Bits of the start byte
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StartFlags(u8);

impl StartFlags {
    pub fn from_bits(bits: u8) -> Self {
        StartFlags(bits & 0x07)
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn non_standard_start(self) -> bool {
        self.0 & 0x01 != 0
    }

    pub fn has_promotions(self) -> bool {
        self.0 & 0x02 != 0
    }

    pub fn has_underpromotions(self) -> bool {
        self.0 & 0x04 != 0
    }
}

/// Everything recovered from one game record
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedGame {
    pub tags: Vec<(String, String)>,
    pub moves: Vec<DecodedMove>,
    pub start_fen: Option<String>,
    pub flags: StartFlags,
    pub nag_count: usize,
    pub variation_count: usize,
    /// Board after the last main-line move
    pub end_board: Board,
    /// Why decoding stopped early, if it did; `moves` still holds what came before
    pub error: Option<DecodeError>,
}

impl ParsedGame {
    pub fn empty() -> Self {
        ParsedGame {
            tags: Vec::new(),
            moves: Vec::new(),
            start_fen: None,
            flags: StartFlags::default(),
            nag_count: 0,
            variation_count: 0,
            end_board: Board::standard(),
            error: None,
        }
    }

    pub fn tag(&self, name: &str) -> Option<&str> {
        self.tags.iter().find(|(key, _)| key == name).map(|(_, value)| value.as_str())
    }
}

impl Default for ParsedGame {
    fn default() -> Self {
        Self::empty()
    }
}

struct ByteStream<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteStream<'a> {
    fn next(&mut self) -> Option<u8> {
        let byte = *self.data.get(self.pos)?;
        self.pos += 1;
        Some(byte)
    }

    fn take(&mut self, len: usize) -> Option<&'a [u8]> {
        let bytes = self.data.get(self.pos..self.pos.checked_add(len)?)?;
        self.pos += len;
        Some(bytes)
    }
}

/// Saved position at a variation start
struct Frame {
    board: Board,
    pre_move: Board,
}

/// Decode a complete game record.
///
/// Never fails as a whole: running out of bytes ends the game quietly, and a
/// corrupt move is reported in [`ParsedGame::error`].
pub fn parse_game(data: &[u8]) -> ParsedGame {
    let mut game = ParsedGame::empty();
    let mut stream = ByteStream { data, pos: 0 };

    if !read_tags(&mut stream, &mut game.tags) {
        return game;
    }

    let Some(start) = stream.next() else {
        return game;
    };
    game.flags = StartFlags::from_bits(start);

    let mut board = Board::standard();
    if game.flags.non_standard_start() {
        let Some(fen) = read_fen(&mut stream) else {
            return game;
        };
        match Board::from_fen(&fen) {
            Ok(custom) => board = custom,
            Err(err) => {
                game.error = Some(err);
                return game;
            }
        }
        game.start_fen = Some(fen);
        game.end_board = board.clone();
    }

    if let Err(err) = read_moves(&mut stream, board, &mut game) {
        debug!("game decoding stopped at byte {}: {}", stream.pos, err);
        game.error = Some(err);
    }
    game
}

/// Returns false if the data ran out inside the tag section
fn read_tags(stream: &mut ByteStream, tags: &mut Vec<(String, String)>) -> bool {
    loop {
        let Some(len) = stream.next() else {
            return false;
        };
        if len == 0 {
            return true;
        }
        let name = if len >= FIRST_COMMON_TAG {
            COMMON_TAGS[(len - FIRST_COMMON_TAG) as usize].to_string()
        } else {
            match stream.take(len as usize) {
                Some(bytes) => String::from_utf8_lossy(bytes).into_owned(),
                None => return false,
            }
        };

        let Some(short) = stream.next() else {
            return false;
        };
        let value_len = if short > MAX_SHORT_VALUE {
            let Some(low) = stream.next() else {
                return false;
            };
            (short - MAX_SHORT_VALUE) as usize * 256 + low as usize
        } else {
            short as usize
        };
        let Some(value) = stream.take(value_len) else {
            return false;
        };
        tags.push((name, String::from_utf8_lossy(value).into_owned()));
    }
}

fn read_fen(stream: &mut ByteStream) -> Option<String> {
    let rest = &stream.data[stream.pos..];
    let end = rest.iter().position(|&b| b == 0)?;
    let fen = String::from_utf8_lossy(&rest[..end]).into_owned();
    stream.pos += end + 1;
    Some(fen)
}

fn read_moves(stream: &mut ByteStream, mut board: Board, game: &mut ParsedGame) -> Result<(), DecodeError> {
    let mut pre_move = board.clone();
    let mut stack: Vec<Frame> = Vec::new();

    let result = loop {
        let Some(byte) = stream.next() else {
            break Ok(());
        };
        let token = match moves::decode(&board, byte, || stream.next()) {
            Ok(token) => token,
            Err(err) => break Err(err),
        };
        match token {
            Token::Move(mv) => {
                let (from, to) = match (Square::from_algebraic(&mv.from), Square::from_algebraic(&mv.to)) {
                    (Ok(from), Ok(to)) => (from, to),
                    (Err(err), _) | (_, Err(err)) => break Err(err),
                };
                if stack.is_empty() {
                    game.moves.push(DecodedMove::from(&mv));
                }
                pre_move = board.clone();
                board.apply_move(from, to, mv.promotion, mv.castle, mv.null);
            }
            Token::Marker(Marker::Nag) => {
                game.nag_count += 1;
                if stream.next().is_none() {
                    break Ok(());
                }
            }
            Token::Marker(Marker::Comment) => {}
            Token::Marker(Marker::VariationStart) => {
                game.variation_count += 1;
                let branch = pre_move.clone();
                stack.push(Frame {
                    board: mem::replace(&mut board, branch),
                    pre_move: pre_move.clone(),
                });
            }
            Token::Marker(Marker::VariationEnd) => match stack.pop() {
                Some(frame) => {
                    board = frame.board;
                    pre_move = frame.pre_move;
                }
                None => break Err(DecodeError::UnbalancedVariation),
            },
            Token::Marker(Marker::EndGame) => break Ok(()),
        }
    };

    // Inside an unfinished variation the main-line board is the bottom frame
    game.end_board = match stack.into_iter().next() {
        Some(frame) => frame.board,
        None => board,
    };
    result
}
