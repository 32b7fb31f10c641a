//! Zobrist key laws: the incremental key always equals the full recompute,
//! transposing move orders reach the same key, and dead en-passant rights
//! do not perturb the hash.

use caissa::board::Position;
use caissa::moves::r#gen::{find_legal_move, generate_legal};
use caissa::moves::apply::{make_move, undo_move};
use caissa::moves::magic::{MagicTables, magic_tables};
use caissa::moves::types::MoveList;

fn play(pos: &mut Position, tables: &MagicTables, moves: &[&str]) {
    for token in moves {
        let mv = find_legal_move(pos, tables, token)
            .unwrap_or_else(|| panic!("{} should be legal in {}", token, pos.to_fen()));
        make_move(pos, mv);
    }
}

#[test]
fn incremental_matches_full_along_lines() {
    let tables = magic_tables();
    let mut pos = Position::startpos();
    for token in ["e2e4", "c7c5", "g1f3", "d7d6", "f1b5", "c8d7", "e1g1"] {
        let mv = find_legal_move(&mut pos, tables, token).expect("legal");
        make_move(&mut pos, mv);
        assert_eq!(pos.key, pos.compute_key_full(), "after {}", token);
    }
}

#[test]
fn incremental_matches_full_over_a_tree() {
    let tables = magic_tables();
    let mut pos: Position = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1"
        .parse()
        .unwrap();

    fn check(pos: &mut Position, tables: &MagicTables, depth: u32) {
        assert_eq!(pos.key, pos.compute_key_full());
        if depth == 0 {
            return;
        }
        let mut moves = MoveList::new();
        generate_legal(pos, tables, &mut moves);
        for mv in moves {
            let undo = make_move(pos, mv);
            check(pos, tables, depth - 1);
            undo_move(pos, mv, undo);
        }
    }
    check(&mut pos, tables, 2);
}

#[test]
fn transpositions_share_a_key() {
    let tables = magic_tables();
    let mut a = Position::startpos();
    play(&mut a, tables, &["g1f3", "g8f6", "b1c3"]);
    let mut b = Position::startpos();
    play(&mut b, tables, &["b1c3", "g8f6", "g1f3"]);
    assert_eq!(a.key, b.key, "move order must not matter");
}

#[test]
fn side_to_move_flips_key() {
    let white: Position = "4k3/8/8/8/8/8/8/4K3 w - - 0 1".parse().unwrap();
    let black: Position = "4k3/8/8/8/8/8/8/4K3 b - - 0 1".parse().unwrap();
    assert_ne!(white.key, black.key);
}

#[test]
fn castling_rights_change_key() {
    let all: Position = "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1".parse().unwrap();
    let none: Position = "r3k2r/8/8/8/8/8/8/R3K2R w - - 0 1".parse().unwrap();
    let some: Position = "r3k2r/8/8/8/8/8/8/R3K2R w Kq - 0 1".parse().unwrap();
    assert_ne!(all.key, none.key);
    assert_ne!(all.key, some.key);
    assert_ne!(none.key, some.key);
}

#[test]
fn live_ep_right_changes_key() {
    // A black pawn on c5 can capture en passant: the right is live and must
    // hash differently from the same squares without it.
    let with: Position = "4k3/8/8/8/2pP4/8/8/4K3 b - d3 0 1".parse().unwrap();
    let without: Position = "4k3/8/8/8/2pP4/8/8/4K3 b - - 0 1".parse().unwrap();
    assert_ne!(with.key, without.key);
}

#[test]
fn dead_ep_right_does_not_change_key() {
    // No black pawn can reach d3: the ep field is inert and the keys match.
    let with: Position = "4k3/8/8/8/3P4/8/8/4K3 b - d3 0 1".parse().unwrap();
    let without: Position = "4k3/8/8/8/3P4/8/8/4K3 b - - 0 1".parse().unwrap();
    assert_eq!(with.key, without.key);
}

#[test]
fn threefold_detected_through_shuffles() {
    let tables = magic_tables();
    let mut pos = Position::startpos();
    // Knights out and back, twice: the start position recurs twice more.
    play(
        &mut pos,
        tables,
        &["g1f3", "g8f6", "f3g1", "f6g8", "g1f3", "g8f6", "f3g1", "f6g8"],
    );
    assert!(pos.is_threefold());
    assert_eq!(pos.repetition_count(), 3);
}
