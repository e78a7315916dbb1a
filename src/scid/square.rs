//! Square, colour and piece-type primitives shared by the board and move decoder.

use std::fmt;

use super::error::DecodeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub fn opposite(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// Index into per-colour tables (white 0, black 1)
    pub fn index(self) -> usize {
        match self {
            Color::White => 0,
            Color::Black => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PieceType {
    King,
    Queen,
    Rook,
    Bishop,
    Knight,
    Pawn,
    Empty,
}

impl PieceType {
    /// Uppercase piece letter, `None` for an empty slot
    pub fn letter(self) -> Option<char> {
        match self {
            PieceType::King => Some('K'),
            PieceType::Queen => Some('Q'),
            PieceType::Rook => Some('R'),
            PieceType::Bishop => Some('B'),
            PieceType::Knight => Some('N'),
            PieceType::Pawn => Some('P'),
            PieceType::Empty => None,
        }
    }

    pub fn from_letter(c: char) -> Option<(PieceType, Color)> {
        let color = if c.is_ascii_uppercase() { Color::White } else { Color::Black };
        let kind = match c.to_ascii_uppercase() {
            'K' => PieceType::King,
            'Q' => PieceType::Queen,
            'R' => PieceType::Rook,
            'B' => PieceType::Bishop,
            'N' => PieceType::Knight,
            'P' => PieceType::Pawn,
            _ => return None,
        };
        Some((kind, color))
    }
}

impl fmt::Display for PieceType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            PieceType::King => "king",
            PieceType::Queen => "queen",
            PieceType::Rook => "rook",
            PieceType::Bishop => "bishop",
            PieceType::Knight => "knight",
            PieceType::Pawn => "pawn",
            PieceType::Empty => "empty square",
        };
        write!(f, "{}", name)
    }
}

/// Chess square (0-63 for a1-h8)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square(u8);

impl Square {
    pub fn new(file: u8, rank: u8) -> Option<Square> {
        if file >= 8 || rank >= 8 {
            return None;
        }
        Some(Square(rank * 8 + file))
    }

    /// Square from a raw 0-63 index; anything else is off the board
    pub fn from_index(index: i32) -> Option<Square> {
        if (0..64).contains(&index) {
            Some(Square(index as u8))
        } else {
            None
        }
    }

    pub fn from_algebraic(notation: &str) -> Result<Square, DecodeError> {
        let bytes = notation.as_bytes();
        if bytes.len() != 2 {
            return Err(DecodeError::BadSquare(notation.to_string()));
        }
        match (bytes[0], bytes[1]) {
            (f @ b'a'..=b'h', r @ b'1'..=b'8') => Ok(Square((r - b'1') * 8 + (f - b'a'))),
            _ => Err(DecodeError::BadSquare(notation.to_string())),
        }
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn file(self) -> u8 {
        self.0 % 8
    }

    pub fn rank(self) -> u8 {
        self.0 / 8
    }

    /// Square `delta` steps away in 0-63 numbering, if still on the board
    pub fn offset(self, delta: i32) -> Option<Square> {
        Square::from_index(self.0 as i32 + delta)
    }

    pub fn to_algebraic(self) -> String {
        let file = (b'a' + self.file()) as char;
        let rank = (b'1' + self.rank()) as char;
        format!("{}{}", file, rank)
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_algebraic())
    }
}
