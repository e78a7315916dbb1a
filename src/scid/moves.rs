//! SCID move encoding
//!
//! Each move is a single byte (queen diagonals take two): the upper nibble is
//! the moving piece's index in the side-to-move's piece list, the lower nibble
//! a piece-specific destination code. Index 0 is always the king, and king
//! codes 11-15 are reused as stream markers.

use std::fmt;

use super::board::Board;
use super::error::DecodeError;
use super::square::{Color, PieceType, Square};

/// King step deltas for codes 1-8: SW, S, SE, W, E, NW, N, NE
const KING_DELTAS: [i32; 8] = [-9, -8, -7, -1, 1, 7, 8, 9];

/// Knight jump deltas for codes 1-8
const KNIGHT_DELTAS: [i32; 8] = [-17, -15, -10, -6, 6, 10, 15, 17];

/// Promotion pieces in code order (codes 3-5, 6-8, 9-11, 12-14)
const PROMOTIONS: [PieceType; 4] = [PieceType::Queen, PieceType::Rook, PieceType::Bishop, PieceType::Knight];

/// Non-move bytes embedded in the move stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    /// Annotation tag (NAG); one value byte follows
    Nag,
    Comment,
    VariationStart,
    VariationEnd,
    EndGame,
}

impl Marker {
    fn from_code(code: u8) -> Option<Marker> {
        match code {
            11 => Some(Marker::Nag),
            12 => Some(Marker::Comment),
            13 => Some(Marker::VariationStart),
            14 => Some(Marker::VariationEnd),
            15 => Some(Marker::EndGame),
            _ => None,
        }
    }
}

/// A fully resolved move, endpoints in algebraic form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Move {
    pub from: String,
    pub to: String,
    pub promotion: Option<PieceType>,
    pub castle: bool,
    pub null: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Move(Move),
    Marker(Marker),
}

/// Main-line move as handed to callers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedMove {
    pub from: String,
    pub to: String,
    /// Uppercase piece letter: Q, R, B or N
    pub promotion: Option<char>,
}

impl From<&Move> for DecodedMove {
    fn from(mv: &Move) -> Self {
        DecodedMove {
            from: mv.from.clone(),
            to: mv.to.clone(),
            promotion: mv.promotion.and_then(PieceType::letter),
        }
    }
}

impl fmt::Display for DecodedMove {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(piece) = self.promotion {
            write!(f, "{}", piece.to_ascii_lowercase())?;
        }
        Ok(())
    }
}

/// Decode one byte of the move stream against `board`.
///
/// `pull` supplies the extra byte of a queen diagonal move; returning `None`
/// there yields `DecodeError::Truncated`. The board is not modified.
pub fn decode(board: &Board, byte: u8, mut pull: impl FnMut() -> Option<u8>) -> Result<Token, DecodeError> {
    let index = byte >> 4;
    let code = byte & 0x0F;

    if index == 0 {
        if let Some(marker) = Marker::from_code(code) {
            return Ok(Token::Marker(marker));
        }
    }

    let mover = board.to_move();
    let piece = board
        .list_piece(mover, index as usize)
        .filter(|p| p.kind != PieceType::Empty)
        .ok_or(DecodeError::NoPiece { index })?;
    let from = piece.square.ok_or(DecodeError::NoPiece { index })?;

    let mut promotion = None;
    let mut castle = false;
    let mut null = false;

    let to = match piece.kind {
        PieceType::King => match code {
            0 => {
                null = true;
                Some(from)
            }
            1..=8 => step(from, KING_DELTAS[code as usize - 1]),
            9 => {
                castle = true;
                from.offset(-2)
            }
            10 => {
                castle = true;
                from.offset(2)
            }
            _ => return Err(DecodeError::BadCode { piece: "king", code }),
        },
        PieceType::Queen if code == from.file() => {
            let extra = pull().ok_or(DecodeError::Truncated)?;
            Square::from_index(extra as i32 - 64)
        }
        PieceType::Queen | PieceType::Rook => {
            if code < 8 {
                Square::new(code, from.rank())
            } else {
                Square::new(from.file(), code - 8)
            }
        }
        PieceType::Bishop => {
            let (file, rank) = if code < 8 {
                (code as i32, from.rank() as i32 + (code as i32 - from.file() as i32))
            } else {
                let file = code as i32 - 8;
                (file, from.rank() as i32 - (file - from.file() as i32))
            };
            if (0..8).contains(&rank) {
                Square::new(file as u8, rank as u8)
            } else {
                None
            }
        }
        PieceType::Knight => match code {
            1..=8 => step(from, KNIGHT_DELTAS[code as usize - 1]),
            _ => return Err(DecodeError::BadCode { piece: "knight", code }),
        },
        PieceType::Pawn => {
            let forward = match mover {
                Color::White => 8,
                Color::Black => -8,
            };
            if code == 15 {
                from.offset(2 * forward)
            } else {
                let direction = if code < 3 {
                    code
                } else {
                    let p = code - 3;
                    promotion = Some(PROMOTIONS[(p / 3) as usize]);
                    p % 3
                };
                // Mover-relative left is toward the a-file for white, h-file for black
                let left = -forward / 8;
                let side = match direction {
                    0 => left,
                    1 => 0,
                    _ => -left,
                };
                let file = from.file() as i32 + side;
                if (0..8).contains(&file) {
                    from.offset(forward + side)
                } else {
                    None
                }
            }
        }
        PieceType::Empty => return Err(DecodeError::NoPiece { index }),
    };

    let to = to.ok_or(DecodeError::OffBoard { byte })?;
    Ok(Token::Move(resolved(from, to, promotion, castle, null)))
}

/// King or knight step; a jump across the board edge shows up as a file change above two
fn step(from: Square, delta: i32) -> Option<Square> {
    let to = from.offset(delta)?;
    if (to.file() as i32 - from.file() as i32).abs() > 2 {
        None
    } else {
        Some(to)
    }
}

fn resolved(from: Square, to: Square, promotion: Option<PieceType>, castle: bool, null: bool) -> Move {
    Move {
        from: from.to_algebraic(),
        to: to.to_algebraic(),
        promotion,
        castle,
        null,
    }
}
