//! The complete game state: twelve piece bitboards, a redundant mailbox,
//! side to move, castling rights, en-passant square, clocks, the incremental
//! Zobrist key and the repetition history.

pub mod castling;
mod fen;

pub use fen::FenError;

use crate::bitboard::{Bitboard, BitboardExt};
use crate::piece::{Color, PIECE_KINDS, Piece, PieceKind};
use crate::square::Square;
use crate::zobrist;
use std::fmt;
use std::str::FromStr;

pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    /// `[color][kind]`; the twelve authoritative piece sets.
    pub bb: [[Bitboard; 6]; 2],
    /// Per-side occupancy, derived from `bb` on every mutation.
    pub occ: [Bitboard; 2],
    /// Union of both sides.
    pub occ_all: Bitboard,
    /// Square -> piece map, kept in lockstep with the bitboards.
    pub mailbox: [Piece; 64],
    pub side_to_move: Color,
    /// Bit set per `castling::*` constant.
    pub castling: u8,
    /// The square a double-pushed pawn skipped, when an en-passant capture
    /// may be available next move.
    pub ep_square: Option<Square>,
    /// Plies since the last capture or pawn move (fifty-move rule).
    pub halfmove_clock: u32,
    /// Starts at 1, increments after Black moves.
    pub fullmove_number: u32,
    /// Incrementally maintained Zobrist key.
    pub key: u64,
    /// Keys of prior positions since the last irreversible move, pushed by
    /// `make_move` for repetition detection.
    pub history: Vec<u64>,
}

impl Position {
    pub fn new_empty() -> Self {
        Position {
            bb: [[0; 6]; 2],
            occ: [0; 2],
            occ_all: 0,
            mailbox: [Piece::Empty; 64],
            side_to_move: Color::White,
            castling: 0,
            ep_square: None,
            halfmove_clock: 0,
            fullmove_number: 1,
            key: 0,
            history: Vec::new(),
        }
    }

    pub fn startpos() -> Self {
        Position::from_fen(START_FEN).expect("startpos FEN is well-formed")
    }

    #[inline(always)]
    pub fn pieces(&self, kind: PieceKind, color: Color) -> Bitboard {
        self.bb[color as usize][kind as usize]
    }

    #[inline(always)]
    pub fn occupancy(&self, color: Color) -> Bitboard {
        self.occ[color as usize]
    }

    #[inline(always)]
    pub fn opponent_occupancy(&self, color: Color) -> Bitboard {
        self.occ[color.opposite() as usize]
    }

    #[inline(always)]
    pub fn occupied(&self) -> Bitboard {
        self.occ_all
    }

    #[inline(always)]
    pub fn piece_at(&self, sq: Square) -> Piece {
        self.mailbox[sq.index() as usize]
    }

    #[inline(always)]
    pub fn has_castle(&self, flag: u8) -> bool {
        self.castling & flag != 0
    }

    /// Any knight, bishop, rook or queen left for `color`. Guards null-move
    /// pruning against pawn-only zugzwang endings.
    #[inline(always)]
    pub fn has_nonpawn_material(&self, color: Color) -> bool {
        let c = color as usize;
        (self.bb[c][PieceKind::Knight as usize]
            | self.bb[c][PieceKind::Bishop as usize]
            | self.bb[c][PieceKind::Rook as usize]
            | self.bb[c][PieceKind::Queen as usize])
            != 0
    }

    #[inline(always)]
    pub fn king_square(&self, color: Color) -> Square {
        let kings = self.pieces(PieceKind::King, color);
        debug_assert!(kings != 0, "no {:?} king on the board", color);
        Square::from_index(kings.lsb())
    }

    /// Add a piece, updating bitboards, aggregates, mailbox and key.
    #[inline(always)]
    pub(crate) fn place(&mut self, color: Color, kind: PieceKind, sq: Square) {
        let idx = sq.index() as usize;
        debug_assert!(
            self.mailbox[idx].is_empty(),
            "placing {:?} {:?} on occupied {}",
            color,
            kind,
            sq
        );
        let bit = sq.bitboard();
        self.bb[color as usize][kind as usize] |= bit;
        self.occ[color as usize] |= bit;
        self.occ_all = self.occ[0] | self.occ[1];
        self.mailbox[idx] = Piece::new(color, kind);
        self.key ^= zobrist::piece_key(color, kind, idx);
    }

    /// Remove a piece, updating bitboards, aggregates, mailbox and key.
    #[inline(always)]
    pub(crate) fn remove(&mut self, color: Color, kind: PieceKind, sq: Square) {
        let idx = sq.index() as usize;
        debug_assert_eq!(
            self.mailbox[idx],
            Piece::new(color, kind),
            "removing {:?} {:?} from {}",
            color,
            kind,
            sq
        );
        let bit = sq.bitboard();
        self.bb[color as usize][kind as usize] &= !bit;
        self.occ[color as usize] &= !bit;
        self.occ_all = self.occ[0] | self.occ[1];
        self.mailbox[idx] = Piece::Empty;
        self.key ^= zobrist::piece_key(color, kind, idx);
    }

    /// Full key recompute from scratch. Must agree with the incremental key
    /// at all times; `debug_assert_key` checks exactly that.
    pub fn compute_key_full(&self) -> u64 {
        let keys = zobrist::keys();
        let mut hash = 0u64;

        for color in [Color::White, Color::Black] {
            for kind in PIECE_KINDS {
                for sq in self.pieces(kind, color).squares() {
                    hash ^= zobrist::piece_key(color, kind, sq.index() as usize);
                }
            }
        }

        if self.side_to_move == Color::Black {
            hash ^= keys.side_to_move;
        }
        zobrist::xor_castling_delta(&mut hash, 0, self.castling);
        if let Some(file) = zobrist::ep_file_to_hash(self) {
            hash ^= keys.ep_file[file as usize];
        }

        hash
    }

    /// Occurrences of the current key, counting the position itself plus any
    /// matches in the history window.
    pub fn repetition_count(&self) -> u32 {
        let mut count = 1;
        for &past in &self.history {
            if past == self.key {
                count += 1;
            }
        }
        count
    }

    /// The current position occurred at least once before (search-level draw
    /// detection: one recurrence is already a cycle).
    pub fn is_repetition(&self) -> bool {
        self.history.iter().rev().any(|&past| past == self.key)
    }

    /// FIDE threefold: the current key has appeared twice before.
    pub fn is_threefold(&self) -> bool {
        self.repetition_count() >= 3
    }

    #[cfg(debug_assertions)]
    pub fn debug_assert_key(&self) {
        debug_assert_eq!(
            self.key,
            self.compute_key_full(),
            "incremental key diverged from full recompute"
        );
    }

    #[cfg(debug_assertions)]
    pub fn debug_assert_consistent(&self) {
        // Mailbox and piece bitboards must describe the same board.
        for idx in 0..64u8 {
            let sq = Square::from_index(idx);
            let piece = self.mailbox[idx as usize];
            match (piece.color(), piece.kind()) {
                (Some(color), Some(kind)) => debug_assert!(
                    self.pieces(kind, color).test(sq),
                    "mailbox has {:?} at {} but bitboard bit is clear",
                    piece,
                    sq
                ),
                _ => {
                    for color in [Color::White, Color::Black] {
                        for kind in PIECE_KINDS {
                            debug_assert!(
                                !self.pieces(kind, color).test(sq),
                                "mailbox empty at {} but {:?} {:?} bit is set",
                                sq,
                                color,
                                kind
                            );
                        }
                    }
                }
            }
        }

        // Aggregates derive from the twelve and never overlap.
        let white: Bitboard = PIECE_KINDS
            .iter()
            .map(|&k| self.pieces(k, Color::White))
            .fold(0, |acc, bb| acc | bb);
        let black: Bitboard = PIECE_KINDS
            .iter()
            .map(|&k| self.pieces(k, Color::Black))
            .fold(0, |acc, bb| acc | bb);
        debug_assert_eq!(white, self.occ[0]);
        debug_assert_eq!(black, self.occ[1]);
        debug_assert_eq!(white | black, self.occ_all);
        debug_assert_eq!(white & black, 0);

        debug_assert_eq!(self.pieces(PieceKind::King, Color::White).count(), 1);
        debug_assert_eq!(self.pieces(PieceKind::King, Color::Black).count(), 1);

        self.debug_assert_key();
    }
}

impl Default for Position {
    fn default() -> Self {
        Position::startpos()
    }
}

impl FromStr for Position {
    type Err = FenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Position::from_fen(s)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_fen())
    }
}
