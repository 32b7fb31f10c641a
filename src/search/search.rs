//! Negamax alpha-beta search with quiescence, transposition caching,
//! null-move pruning, killer ordering, late-move reductions and check
//! extensions, driven by iterative deepening.

use crate::board::Position;
use crate::moves::apply::{make_move, make_null_move, undo_move, undo_null_move};
use crate::moves::control::in_check;
use crate::moves::r#gen::{generate_legal, generate_quiescence};
use crate::moves::magic::MagicTables;
use crate::moves::types::{Move, MoveList};
use crate::search::context::{MAX_PLY, SearchContext};
use crate::search::eval::evaluate;
use crate::search::ordering::order_moves;
use crate::search::tt::{Bound, TranspositionTable};
use tracing::debug;

pub const INF: i32 = 32_000;
pub const MATE: i32 = 31_000;
/// Scores at or beyond this are mate-in-N, not evaluations.
pub const MATE_THRESHOLD: i32 = 30_000;

/// Quiescence may run at most this many plies past the nominal horizon.
const QUIESCENCE_LIMIT: usize = 8;
/// Null-move depth reduction R.
const NULL_MOVE_REDUCTION: i32 = 2;
/// Late-move reduction applies from this move index...
const LMR_MIN_INDEX: usize = 3;
/// ...at depths strictly greater than this.
const LMR_MIN_DEPTH: i32 = 3;

#[derive(Debug, Clone)]
pub struct SearchResult {
    /// Centipawns from the side to move; mate scores exceed
    /// `MATE_THRESHOLD`.
    pub score: i32,
    pub best_move: Option<Move>,
    pub nodes: u64,
    /// Deepest completed iteration.
    pub depth: i32,
    pub pv: Vec<Move>,
}

/// Mate scores are stored in the TT relative to the node, not the root, so
/// they stay valid when the position recurs at a different ply.
fn score_to_tt(score: i32, ply: usize) -> i32 {
    if score >= MATE_THRESHOLD {
        score + ply as i32
    } else if score <= -MATE_THRESHOLD {
        score - ply as i32
    } else {
        score
    }
}

fn score_from_tt(score: i32, ply: usize) -> i32 {
    if score >= MATE_THRESHOLD {
        score - ply as i32
    } else if score <= -MATE_THRESHOLD {
        score + ply as i32
    } else {
        score
    }
}

#[allow(clippy::too_many_arguments)]
fn quiescence(
    pos: &mut Position,
    tables: &MagicTables,
    ply: usize,
    qdepth: usize,
    mut alpha: i32,
    beta: i32,
    nodes: &mut u64,
) -> i32 {
    *nodes += 1;

    // Hard floor: beyond the quiescence budget the stand-pat verdict holds.
    if qdepth >= QUIESCENCE_LIMIT || ply >= MAX_PLY - 1 {
        return evaluate(pos, tables);
    }

    let checked = in_check(pos, pos.side_to_move, tables);

    let mut moves = MoveList::new();
    generate_quiescence(pos, tables, &mut moves);

    if moves.is_empty() {
        if checked {
            // Every evasion was generated, so none exist: mated.
            return -MATE + ply as i32;
        }
        return evaluate(pos, tables);
    }

    let mut best;
    if checked {
        // No standing pat while in check; something must be played.
        best = -INF;
    } else {
        let stand_pat = evaluate(pos, tables);
        if stand_pat >= beta {
            return stand_pat;
        }
        if stand_pat > alpha {
            alpha = stand_pat;
        }
        best = stand_pat;
    }

    order_moves(&mut moves, pos.side_to_move, None, [None, None]);

    for mv in moves {
        let undo = make_move(pos, mv);
        let score = -quiescence(pos, tables, ply + 1, qdepth + 1, -beta, -alpha, nodes);
        undo_move(pos, mv, undo);

        if score > best {
            best = score;
        }
        if score > alpha {
            alpha = score;
        }
        if alpha >= beta {
            break;
        }
    }

    best
}

#[allow(clippy::too_many_arguments)]
pub fn alpha_beta(
    pos: &mut Position,
    tables: &MagicTables,
    ctx: &mut SearchContext,
    tt: &mut TranspositionTable,
    depth: i32,
    ply: usize,
    mut alpha: i32,
    mut beta: i32,
    allow_null: bool,
    nodes: &mut u64,
) -> (i32, Option<Move>) {
    *nodes += 1;

    if ply >= MAX_PLY - 1 {
        return (evaluate(pos, tables), None);
    }

    // A position we already passed through on this path is a draw by
    // repetition for search purposes.
    if ply > 0 && pos.is_repetition() {
        return (0, None);
    }

    let alpha_orig = alpha;
    let key = pos.key;

    // Transposition probe: an exact deep-enough entry answers outright, a
    // bound tightens the window.
    let mut tt_move = None;
    let mut tt_hit = false;
    if let Some(entry) = tt.probe(key) {
        tt_hit = true;
        tt_move = entry.mv;
        if ply > 0 && entry.depth as i32 >= depth {
            let score = score_from_tt(entry.score as i32, ply);
            match entry.bound {
                Bound::Exact => return (score, entry.mv),
                Bound::Lower => alpha = alpha.max(score),
                Bound::Upper => beta = beta.min(score),
            }
            if alpha >= beta {
                return (score, entry.mv);
            }
        }
    }

    let in_check_now = in_check(pos, pos.side_to_move, tables);

    // Horizon: resolve captures before trusting the evaluation.
    if depth <= 0 && !in_check_now {
        let score = quiescence(pos, tables, ply, 0, alpha, beta, nodes);
        if !tt_hit {
            tt.save(key, None, score_to_tt(score, ply), 0, Bound::Exact);
        }
        return (score, None);
    }

    // Check extension: look one ply deeper when forced.
    let extension = i32::from(in_check_now);

    // Null-move pruning: hand the opponent a free move; if the position
    // still fails high the real move surely would. Unsound in check and in
    // pawn-only endings (zugzwang), and never twice in a row.
    if allow_null
        && !in_check_now
        && depth - 1 - NULL_MOVE_REDUCTION >= 0
        && pos.has_nonpawn_material(pos.side_to_move)
    {
        let undo = make_null_move(pos);
        let (value, _) = alpha_beta(
            pos,
            tables,
            ctx,
            tt,
            depth - 1 - NULL_MOVE_REDUCTION,
            ply + 1,
            -beta,
            -alpha,
            false,
            nodes,
        );
        let null_score = -value;
        undo_null_move(pos, undo);

        if null_score >= beta && null_score < MATE_THRESHOLD {
            return (beta, None);
        }
    }

    let mut moves = MoveList::new();
    generate_legal(pos, tables, &mut moves);

    // Terminal: no legal moves is mate or stalemate.
    if moves.is_empty() {
        return if in_check_now {
            (-MATE + ply as i32, None)
        } else {
            (0, None)
        };
    }

    order_moves(&mut moves, pos.side_to_move, tt_move, ctx.killers_at(ply));

    let mut best = -INF;
    let mut best_move = None;

    for (index, mv) in moves.iter().copied().enumerate() {
        let undo = make_move(pos, mv);
        let gives_check = in_check(pos, pos.side_to_move, tables);

        // Late-move reduction: a quiet move sorted this late rarely beats
        // alpha; probe it a ply shallower. The reduction applies to this
        // child only, never to the node's own depth.
        let full_depth = depth - 1 + extension;
        let reduce = index >= LMR_MIN_INDEX
            && depth > LMR_MIN_DEPTH
            && !in_check_now
            && !gives_check
            && mv.is_quiet();

        let child_depth = if reduce { full_depth - 1 } else { full_depth };
        let (value, _) = alpha_beta(
            pos, tables, ctx, tt, child_depth, ply + 1, -beta, -alpha, true, nodes,
        );
        let mut score = -value;

        // A reduced move that beats alpha earns a full-depth re-search.
        if reduce && score > alpha {
            let (value, _) = alpha_beta(
                pos, tables, ctx, tt, full_depth, ply + 1, -beta, -alpha, true, nodes,
            );
            score = -value;
        }

        undo_move(pos, mv, undo);

        if score > best {
            best = score;
            best_move = Some(mv);
        }
        if score > alpha {
            alpha = score;
        }
        if alpha >= beta {
            // Quiet cutoff moves seed the killer table for sibling nodes.
            if !mv.is_capture() {
                ctx.store_killer(ply, mv);
            }
            break;
        }
    }

    let bound = if best <= alpha_orig {
        Bound::Upper
    } else if best >= beta {
        Bound::Lower
    } else {
        Bound::Exact
    };
    tt.save(key, best_move, score_to_tt(best, ply), depth.max(0) as u8, bound);

    (best, best_move)
}

/// Iterative deepening driver; the move from the deepest completed
/// iteration is the answer.
pub fn search_with(
    pos: &mut Position,
    tables: &MagicTables,
    tt: &mut TranspositionTable,
    ctx: &mut SearchContext,
    max_depth: i32,
) -> SearchResult {
    let mut nodes = 0;
    let mut score = 0;
    let mut best_move = None;
    let mut completed = 0;

    for depth in 1..=max_depth.max(1) {
        tt.new_search();
        let (iter_score, iter_move) =
            alpha_beta(pos, tables, ctx, tt, depth, 0, -INF, INF, false, &mut nodes);

        score = iter_score;
        if iter_move.is_some() {
            best_move = iter_move;
        }
        completed = depth;
        debug!(depth, score, nodes, "search iteration complete");

        // A forced mate cannot improve with depth.
        if score.abs() >= MATE_THRESHOLD {
            break;
        }
    }

    let pv = principal_variation(pos, tables, tt, 16);
    SearchResult {
        score,
        best_move,
        nodes,
        depth: completed,
        pv,
    }
}

pub fn search(pos: &mut Position, tables: &MagicTables, max_depth: i32) -> SearchResult {
    let mut tt = TranspositionTable::new(64);
    let mut ctx = SearchContext::new();
    search_with(pos, tables, &mut tt, &mut ctx, max_depth)
}

/// The expected continuation: follow transposition-table best moves from
/// the root, applying each, until an absent entry, an illegal suggestion, a
/// repeated position or the length cap. The position is restored before
/// returning.
pub fn principal_variation(
    pos: &mut Position,
    tables: &MagicTables,
    tt: &TranspositionTable,
    max_len: usize,
) -> Vec<Move> {
    let mut pv = Vec::new();
    let mut applied = Vec::new();
    let mut seen_keys = Vec::new();

    while pv.len() < max_len {
        if seen_keys.contains(&pos.key) {
            break;
        }
        seen_keys.push(pos.key);

        let Some(entry) = tt.probe(pos.key) else { break };
        let Some(mv) = entry.mv else { break };

        let mut legal = MoveList::new();
        generate_legal(pos, tables, &mut legal);
        if !legal.iter().any(|&m| m == mv) {
            break;
        }

        applied.push((mv, make_move(pos, mv)));
        pv.push(mv);
    }

    for (mv, undo) in applied.into_iter().rev() {
        undo_move(pos, mv, undo);
    }
    pv
}
