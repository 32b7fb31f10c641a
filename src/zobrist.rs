//! Zobrist hashing: a 64-bit position key built as an XOR of per-feature
//! random keys, maintained incrementally by make/undo.

use crate::board::castling::{BLACK_OO, BLACK_OOO, WHITE_OO, WHITE_OOO};
use crate::board::Position;
use crate::piece::{Color, PieceKind};
use once_cell::sync::OnceCell;
use rand::{RngCore, SeedableRng, rngs::StdRng};

const FILE_A: u64 = 0x0101_0101_0101_0101;
const FILE_H: u64 = 0x8080_8080_8080_8080;

/// Fixed seed: keys, and therefore hashes and TT behavior, are reproducible
/// run to run.
const KEY_SEED: u64 = 0x9E37_79B9_7F4A_7C15;

pub struct ZobristKeys {
    /// `[color][kind][square]`
    pub piece: [[[u64; 64]; 6]; 2],
    /// XORed in when Black is to move.
    pub side_to_move: u64,
    /// `[WHITE_OO, WHITE_OOO, BLACK_OO, BLACK_OOO]` bit order.
    pub castling: [u64; 4],
    /// En-passant file, a..h.
    pub ep_file: [u64; 8],
}

pub fn keys() -> &'static ZobristKeys {
    static KEYS: OnceCell<ZobristKeys> = OnceCell::new();
    KEYS.get_or_init(|| generate_keys(StdRng::seed_from_u64(KEY_SEED)))
}

fn generate_keys(mut rng: StdRng) -> ZobristKeys {
    // Zero keys would make distinct features hash-invisible.
    let mut next = move || loop {
        let v = rng.next_u64();
        if v != 0 {
            return v;
        }
    };

    let mut keys = ZobristKeys {
        piece: [[[0; 64]; 6]; 2],
        side_to_move: 0,
        castling: [0; 4],
        ep_file: [0; 8],
    };
    for color in 0..2 {
        for kind in 0..6 {
            for sq in 0..64 {
                keys.piece[color][kind][sq] = next();
            }
        }
    }
    keys.side_to_move = next();
    for k in keys.castling.iter_mut() {
        *k = next();
    }
    for k in keys.ep_file.iter_mut() {
        *k = next();
    }
    keys
}

#[inline(always)]
pub fn piece_key(color: Color, kind: PieceKind, sq: usize) -> u64 {
    keys().piece[color as usize][kind as usize][sq]
}

/// XOR in/out the castling keys for every right that differs between `old`
/// and `new` bit sets.
#[inline]
pub fn xor_castling_delta(hash: &mut u64, old: u8, new: u8) {
    let keys = keys();
    let delta = old ^ new;
    if delta & WHITE_OO != 0 {
        *hash ^= keys.castling[0];
    }
    if delta & WHITE_OOO != 0 {
        *hash ^= keys.castling[1];
    }
    if delta & BLACK_OO != 0 {
        *hash ^= keys.castling[2];
    }
    if delta & BLACK_OOO != 0 {
        *hash ^= keys.castling[3];
    }
}

/// The en-passant file that contributes to the hash this ply, if any.
///
/// The file is hashed only when the side to move actually has a pawn that
/// could capture onto the ep square (pseudo-legally; pins are ignored).
/// Positions that differ only in a dead ep right therefore share a key.
pub fn ep_file_to_hash(pos: &Position) -> Option<u8> {
    let ep = pos.ep_square?;
    let rank = ep.rank();
    if rank != 2 && rank != 5 {
        return None;
    }

    let target = ep.bitboard();
    let has_capturer = match pos.side_to_move {
        Color::White => {
            let sources = ((target >> 9) & !FILE_H) | ((target >> 7) & !FILE_A);
            sources & pos.pieces(PieceKind::Pawn, Color::White) != 0
        }
        Color::Black => {
            let sources = ((target << 7) & !FILE_A) | ((target << 9) & !FILE_H);
            sources & pos.pieces(PieceKind::Pawn, Color::Black) != 0
        }
    };

    if has_capturer { Some(ep.file()) } else { None }
}
