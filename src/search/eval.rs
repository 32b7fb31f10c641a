//! Static evaluation: material plus piece-square tables plus a small
//! mobility term, in centipawns from the side to move's perspective.

use crate::bitboard::BitboardExt;
use crate::board::Position;
use crate::moves::control::attack_bitboard;
use crate::moves::magic::MagicTables;
use crate::piece::{Color, PieceKind};
use crate::search::pst;

const MOBILITY_WEIGHT: i32 = 2;

const MATERIAL_KINDS: [PieceKind; 5] = [
    PieceKind::Pawn,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Rook,
    PieceKind::Queen,
];

/// Non-king material for one side, centipawns.
pub fn material(pos: &Position, color: Color) -> i32 {
    MATERIAL_KINDS
        .iter()
        .map(|&kind| kind.value() * pos.pieces(kind, color).count() as i32)
        .sum()
}

/// Piece-square total for one side.
pub fn placement(pos: &Position, color: Color) -> i32 {
    let mut total = 0;
    for kind in crate::piece::PIECE_KINDS {
        for sq in pos.pieces(kind, color).squares() {
            total += pst::bonus(kind, color, sq);
        }
    }
    total
}

/// Squares reached by `color` pieces, own pieces excluded.
fn mobility(pos: &Position, color: Color, tables: &MagicTables) -> i32 {
    let reach = attack_bitboard(pos, color, tables) & !pos.occupancy(color);
    reach.count() as i32 * MOBILITY_WEIGHT
}

/// Positive = good for the side to move.
pub fn evaluate(pos: &Position, tables: &MagicTables) -> i32 {
    let side = pos.side_to_move;
    let enemy = side.opposite();

    let white_minus_black = material(pos, Color::White) - material(pos, Color::Black)
        + placement(pos, Color::White)
        - placement(pos, Color::Black);

    white_minus_black * side.sign() + mobility(pos, side, tables) - mobility(pos, enemy, tables)
}
