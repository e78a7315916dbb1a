//! Piece-list board used to follow SCID's relative move encoding.
//!
//! SCID move bytes name a piece by its index in the mover's piece list, not by
//! square. The decoder therefore has to reproduce SCID's list order exactly:
//!
//! - list index 0 is always the king;
//! - the standard start lists K, R(a), N(b), B(c), Q, B(f), N(g), R(h), then
//!   pawns a→h;
//! - a FEN start lists pieces in reading order (rank 8 first, a-file first),
//!   except that a king is moved to index 0 and the piece it displaces goes
//!   to the end of the list;
//! - a captured piece is replaced in the list by the last entry, then the list
//!   shrinks by one.
//!
//! Pieces live in 32 fixed slots (0-15 white, 16-31 black) and the board holds
//! slot numbers, so `Clone` is a plain copy with no shared state.

use super::error::DecodeError;
use super::square::{Color, PieceType, Square};

pub const MAX_PIECES: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    pub kind: PieceType,
    pub color: Color,
    /// `None` while the slot is off the board
    pub square: Option<Square>,
}

impl Piece {
    fn empty(color: Color) -> Self {
        Piece { kind: PieceType::Empty, color, square: None }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    squares: [Option<u8>; 64],
    pieces: [Piece; 32],
    lists: [[u8; MAX_PIECES]; 2],
    counts: [usize; 2],
    to_move: Color,
    en_passant: Option<Square>,
}

const BACK_RANK: [(PieceType, u8); 8] = [
    (PieceType::King, 4),
    (PieceType::Rook, 0),
    (PieceType::Knight, 1),
    (PieceType::Bishop, 2),
    (PieceType::Queen, 3),
    (PieceType::Bishop, 5),
    (PieceType::Knight, 6),
    (PieceType::Rook, 7),
];

impl Board {
    /// Empty board, white to move
    pub fn new() -> Self {
        let mut pieces = [Piece::empty(Color::White); 32];
        for piece in pieces.iter_mut().skip(MAX_PIECES) {
            piece.color = Color::Black;
        }
        Board {
            squares: [None; 64],
            pieces,
            lists: [[0; MAX_PIECES]; 2],
            counts: [0; 2],
            to_move: Color::White,
            en_passant: None,
        }
    }

    pub fn standard() -> Self {
        let mut board = Board::new();
        board.setup_standard();
        board
    }

    pub fn from_fen(fen: &str) -> Result<Self, DecodeError> {
        let mut board = Board::new();
        board.setup_from_fen(fen)?;
        Ok(board)
    }

    /// Reset to the standard starting position with SCID's fixed list order
    pub fn setup_standard(&mut self) {
        *self = Board::new();
        for (color, back, pawns) in [(Color::White, 0, 1), (Color::Black, 7, 6)] {
            for (kind, file) in BACK_RANK {
                self.place_initial(kind, color, back, file);
            }
            for file in 0..8 {
                self.place_initial(PieceType::Pawn, color, pawns, file);
            }
        }
    }

    fn place_initial(&mut self, kind: PieceType, color: Color, rank: u8, file: u8) {
        // Sixteen pieces per side on distinct squares always fit
        if let Some(square) = Square::new(file, rank) {
            let _ = self.add_piece(kind, color, square);
        }
    }

    /// Set up from a FEN string.
    ///
    /// Only the placement, side-to-move and en-passant fields are used; castling
    /// rights and move clocks are ignored.
    pub fn setup_from_fen(&mut self, fen: &str) -> Result<(), DecodeError> {
        *self = Board::new();
        let bad = |msg: &str| DecodeError::InvalidFen(format!("{}: {:?}", msg, fen));

        let mut fields = fen.split_whitespace();
        let placement = fields.next().ok_or_else(|| bad("empty FEN"))?;

        let ranks: Vec<&str> = placement.split('/').collect();
        if ranks.len() != 8 {
            return Err(bad("placement must have 8 ranks"));
        }
        for (row, text) in ranks.iter().enumerate() {
            let rank = 7 - row as u8;
            let mut file = 0u8;
            for c in text.chars() {
                if let Some(skip) = c.to_digit(10) {
                    if !(1..=8).contains(&skip) {
                        return Err(bad("bad empty-square count"));
                    }
                    file += skip as u8;
                } else {
                    let (kind, color) = PieceType::from_letter(c).ok_or_else(|| bad("bad piece letter"))?;
                    let square = Square::new(file, rank).ok_or_else(|| bad("rank too long"))?;
                    self.add_piece(kind, color, square)?;
                    file += 1;
                }
                if file > 8 {
                    return Err(bad("rank too long"));
                }
            }
            if file != 8 {
                return Err(bad("rank too short"));
            }
        }

        self.to_move = match fields.next() {
            None | Some("w") => Color::White,
            Some("b") => Color::Black,
            Some(_) => return Err(bad("bad side to move")),
        };

        let _castling = fields.next();

        self.en_passant = match fields.next() {
            None | Some("-") => None,
            Some(sq) => Some(Square::from_algebraic(sq).map_err(|_| bad("bad en passant square"))?),
        };

        Ok(())
    }

    /// Put a new piece on the board, appending it to its colour's list.
    /// A king always takes list index 0; the piece there moves to the end.
    fn add_piece(&mut self, kind: PieceType, color: Color, square: Square) -> Result<(), DecodeError> {
        let c = color.index();
        if self.counts[c] >= MAX_PIECES {
            return Err(DecodeError::InvalidFen(format!("more than {} {:?} pieces", MAX_PIECES, color)));
        }
        if self.squares[square.index()].is_some() {
            return Err(DecodeError::InvalidFen(format!("square {} used twice", square)));
        }
        let base = c * MAX_PIECES;
        let slot = (base..base + MAX_PIECES)
            .find(|&s| self.pieces[s].kind == PieceType::Empty)
            .ok_or_else(|| DecodeError::InvalidFen("no free piece slot".to_string()))? as u8;

        self.pieces[slot as usize] = Piece { kind, color, square: Some(square) };
        self.squares[square.index()] = Some(slot);

        let count = self.counts[c];
        if kind == PieceType::King && count > 0 {
            self.lists[c][count] = self.lists[c][0];
            self.lists[c][0] = slot;
        } else {
            self.lists[c][count] = slot;
        }
        self.counts[c] += 1;
        Ok(())
    }

    /// Take a piece off the board: the last list entry fills its list position
    fn remove_piece(&mut self, slot: u8) {
        let piece = self.pieces[slot as usize];
        let c = piece.color.index();
        let count = self.counts[c];
        if let Some(pos) = self.lists[c][..count].iter().position(|&s| s == slot) {
            self.lists[c][pos] = self.lists[c][count - 1];
            self.counts[c] -= 1;
        }
        if let Some(square) = piece.square {
            self.squares[square.index()] = None;
        }
        self.pieces[slot as usize] = Piece::empty(piece.color);
    }

    fn relocate(&mut self, slot: u8, to: Square) {
        if let Some(from) = self.pieces[slot as usize].square {
            self.squares[from.index()] = None;
        }
        self.squares[to.index()] = Some(slot);
        self.pieces[slot as usize].square = Some(to);
    }

    /// Apply a decoded move without any legality checking.
    ///
    /// A move from an empty square does nothing.
    pub fn apply_move(&mut self, from: Square, to: Square, promotion: Option<PieceType>, castle: bool, null: bool) {
        if null {
            self.to_move = self.to_move.opposite();
            self.en_passant = None;
            return;
        }
        let Some(slot) = self.squares[from.index()] else {
            return;
        };
        let mover = self.pieces[slot as usize];

        if mover.kind == PieceType::Pawn && self.en_passant == Some(to) {
            let behind = match mover.color {
                Color::White => to.offset(-8),
                Color::Black => to.offset(8),
            };
            if let Some(victim) = behind.and_then(|sq| self.squares[sq.index()]) {
                if self.pieces[victim as usize].color != mover.color {
                    self.remove_piece(victim);
                }
            }
        }

        if let Some(victim) = self.squares[to.index()] {
            if victim != slot {
                self.remove_piece(victim);
            }
        }

        self.relocate(slot, to);

        if let Some(kind) = promotion {
            self.pieces[slot as usize].kind = kind;
        }

        if castle {
            let rank = from.rank();
            let (corner, rook_to) = if to.file() > from.file() {
                (Square::new(7, rank), to.offset(-1))
            } else {
                (Square::new(0, rank), to.offset(1))
            };
            if let (Some(corner), Some(rook_to)) = (corner, rook_to) {
                if let Some(rook) = self.squares[corner.index()] {
                    if rook != slot {
                        self.relocate(rook, rook_to);
                    }
                }
            }
        }

        self.en_passant = None;
        if mover.kind == PieceType::Pawn && from.rank().abs_diff(to.rank()) == 2 {
            self.en_passant = Square::new(from.file(), (from.rank() + to.rank()) / 2);
        }

        self.to_move = self.to_move.opposite();
    }

    pub fn piece_at(&self, square: Square) -> Option<&Piece> {
        self.squares[square.index()].map(|slot| &self.pieces[slot as usize])
    }

    /// Piece at position `index` of `color`'s piece list
    pub fn list_piece(&self, color: Color, index: usize) -> Option<&Piece> {
        let c = color.index();
        if index >= self.counts[c] {
            return None;
        }
        Some(&self.pieces[self.lists[c][index] as usize])
    }

    pub fn piece_count(&self, color: Color) -> usize {
        self.counts[color.index()]
    }

    pub fn to_move(&self) -> Color {
        self.to_move
    }

    pub fn en_passant(&self) -> Option<Square> {
        self.en_passant
    }

    pub fn king_square(&self, color: Color) -> Option<Square> {
        self.list_piece(color, 0)
            .filter(|p| p.kind == PieceType::King)
            .and_then(|p| p.square)
    }

    /// FEN piece-placement field for the current position
    pub fn placement(&self) -> String {
        let mut out = String::new();
        for rank in (0..8u8).rev() {
            let mut empty = 0;
            for file in 0..8u8 {
                let piece = Square::new(file, rank).and_then(|sq| self.piece_at(sq));
                match piece.and_then(|p| p.kind.letter().map(|l| (l, p.color))) {
                    Some((letter, color)) => {
                        if empty > 0 {
                            out.push_str(&empty.to_string());
                            empty = 0;
                        }
                        out.push(if color == Color::White { letter } else { letter.to_ascii_lowercase() });
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                out.push_str(&empty.to_string());
            }
            if rank > 0 {
                out.push('/');
            }
        }
        out
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}
