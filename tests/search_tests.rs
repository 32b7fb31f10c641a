//! Search behavior: mate scores, draw handling, TT reuse across
//! invocations, and principal-variation extraction.

use caissa::board::Position;
use caissa::moves::apply::make_move;
use caissa::moves::r#gen::{find_legal_move, generate_legal};
use caissa::moves::magic::magic_tables;
use caissa::moves::types::MoveList;
use caissa::search::search::{MATE_THRESHOLD, alpha_beta, INF};
use caissa::search::{
    SearchContext, TranspositionTable, principal_variation, search, search_with,
};

#[test]
fn finds_mate_in_two() {
    let tables = magic_tables();
    // Classic ladder: rooks on a and b files drive the king to the edge.
    let mut pos: Position = "6k1/8/8/8/8/8/R7/1R4K1 w - - 0 1".parse().unwrap();
    let result = search(&mut pos, tables, 4);
    assert!(
        result.score >= MATE_THRESHOLD,
        "mate-in-two scored {}",
        result.score
    );
    assert!(result.best_move.is_some(), "a mating line exists");
}

#[test]
fn repetition_line_scores_zero() {
    let tables = magic_tables();
    // Black queen shuffles give White a repetition to fall back on; more
    // directly: a position already twice repeated scores 0 on re-entry.
    let mut pos = Position::startpos();
    for token in ["g1f3", "g8f6", "f3g1", "f6g8", "g1f3", "g8f6", "f3g1", "f6g8"] {
        let mv = find_legal_move(&mut pos, tables, token).unwrap();
        make_move(&mut pos, mv);
    }
    assert!(pos.is_threefold());

    // Any single reply re-enters a repeated position; the search must see
    // the draw rather than loop.
    let mut ctx = SearchContext::new();
    let mut tt = TranspositionTable::new(16);
    let mut nodes = 0;
    let (score, _) = alpha_beta(
        &mut pos, tables, &mut ctx, &mut tt, 4, 1, -INF, INF, false, &mut nodes,
    );
    assert_eq!(score, 0, "repeated position is a draw in search");
}

#[test]
fn tt_reuse_speeds_up_and_agrees() {
    let tables = magic_tables();
    let fen = "r1bqkbnr/pppp1ppp/2n5/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 4 3";

    let mut fresh_pos: Position = fen.parse().unwrap();
    let fresh = search(&mut fresh_pos, tables, 4);

    let mut tt = TranspositionTable::new(32);
    let mut warm_pos: Position = fen.parse().unwrap();
    let mut ctx = SearchContext::new();
    let first = search_with(&mut warm_pos, tables, &mut tt, &mut ctx, 4);
    let mut ctx2 = SearchContext::new();
    let second = search_with(&mut warm_pos, tables, &mut tt, &mut ctx2, 4);

    assert_eq!(first.score, fresh.score, "identical cold searches agree");
    assert!(second.best_move.is_some());
    assert!(
        second.nodes <= first.nodes,
        "warm start searched more nodes ({} > {})",
        second.nodes,
        first.nodes
    );
}

#[test]
fn pv_moves_are_all_legal_in_sequence() {
    let tables = magic_tables();
    let mut pos: Position = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1"
        .parse()
        .unwrap();
    let before = pos.clone();

    let mut tt = TranspositionTable::new(32);
    let mut ctx = SearchContext::new();
    let result = search_with(&mut pos, tables, &mut tt, &mut ctx, 4);
    assert_eq!(pos, before, "search restores the position");

    let pv = principal_variation(&mut pos, tables, &tt, 16);
    assert_eq!(pos, before, "pv walk restores the position");
    assert_eq!(pv.first().copied(), result.best_move);

    // Replay the PV move by move, verifying each is legal where it occurs.
    let mut replay = pos.clone();
    for mv in &pv {
        let mut legal = MoveList::new();
        generate_legal(&mut replay, tables, &mut legal);
        assert!(legal.iter().any(|m| m == mv), "{} illegal in PV replay", mv);
        make_move(&mut replay, *mv);
    }
}

#[test]
fn deeper_search_never_worsens_a_forced_win() {
    let tables = magic_tables();
    // KQ vs K: winning for White at any depth.
    let fen = "4k3/8/8/8/8/8/8/QK6 w - - 0 1";
    let mut shallow_pos: Position = fen.parse().unwrap();
    let shallow = search(&mut shallow_pos, tables, 2);
    let mut deep_pos: Position = fen.parse().unwrap();
    let deep = search(&mut deep_pos, tables, 5);
    assert!(shallow.score > 500);
    assert!(deep.score > 500);
}

#[test]
fn node_counts_are_reported() {
    let tables = magic_tables();
    let mut pos = Position::startpos();
    let result = search(&mut pos, tables, 3);
    assert!(result.nodes > 20, "searched {} nodes", result.nodes);
    assert_eq!(result.depth, 3);
}
