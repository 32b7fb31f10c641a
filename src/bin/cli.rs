//! Interactive driver: feeds positions to the engine core and prints its
//! answers. All chess logic lives in the library.

use caissa::board::Position;
use caissa::logger::start_logging;
use caissa::moves::apply::make_move;
use caissa::moves::r#gen::find_legal_move;
use caissa::moves::magic::MagicTables;
use caissa::moves::perft::{perft, perft_breakdown, perft_divide};
use caissa::search::{evaluate, search};
use caissa::status::{GameStatus, game_status};
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::time::Instant;

const MAGIC_CACHE: &str = "magics.bin";

fn main() {
    // Held for the whole process so buffered log lines reach the file.
    let _log_guard = start_logging(Path::new("logs/caissa.log"));

    let tables = match MagicTables::load_or_generate(Path::new(MAGIC_CACHE)) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("fatal: could not build attack tables: {}", e);
            std::process::exit(1);
        }
    };

    let mut pos = Position::startpos();
    println!("caissa ready; 'help' lists commands");

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l.trim().to_string(),
            Err(_) => break,
        };
        if line.is_empty() {
            continue;
        }
        let parts: Vec<&str> = line.split_whitespace().collect();

        match parts[0] {
            "help" => print_help(),
            "position" => handle_position(&parts, &mut pos, &tables),
            "go" => handle_go(&parts, &mut pos, &tables),
            "play" => handle_play(&parts, &mut pos, &tables),
            "perft" => handle_perft(&parts, &mut pos, &tables, false),
            "divide" => handle_perft(&parts, &mut pos, &tables, true),
            "breakdown" => handle_breakdown(&parts, &mut pos, &tables),
            "eval" => println!("eval {} cp (side to move)", evaluate(&pos, &tables)),
            "status" => println!("{:?}", game_status(&mut pos, &tables)),
            "fen" => println!("{}", pos.to_fen()),
            "d" | "display" => print_board(&pos),
            "quit" | "exit" => break,
            other => println!("unknown command {:?}; try 'help'", other),
        }
        io::stdout().flush().ok();
    }
}

fn print_help() {
    println!("position startpos [moves e2e4 ...]");
    println!("position fen <FEN> [moves ...]");
    println!("go depth <n>       search and report the chosen move");
    println!("play <e2e4[q]>     apply a move for the side to move");
    println!("perft <n> | divide <n> | breakdown <n>");
    println!("eval | status | fen | d | quit");
}

fn handle_position(parts: &[&str], pos: &mut Position, tables: &MagicTables) {
    let moves_at = parts.iter().position(|&p| p == "moves");

    let parsed = match parts.get(1) {
        Some(&"startpos") => Some(Position::startpos()),
        Some(&"fen") => {
            let end = moves_at.unwrap_or(parts.len());
            let fen = parts[2..end].join(" ");
            match Position::from_fen(&fen) {
                Ok(p) => Some(p),
                Err(e) => {
                    println!("bad FEN: {}", e);
                    None
                }
            }
        }
        _ => {
            println!("usage: position startpos|fen <FEN> [moves ...]");
            None
        }
    };
    let Some(mut next) = parsed else { return };

    if let Some(idx) = moves_at {
        for token in &parts[idx + 1..] {
            match find_legal_move(&mut next, tables, token) {
                Some(mv) => {
                    make_move(&mut next, mv);
                }
                None => {
                    println!("illegal move {:?}; position unchanged", token);
                    return;
                }
            }
        }
    }
    *pos = next;
}

fn handle_go(parts: &[&str], pos: &mut Position, tables: &MagicTables) {
    let depth = match parts {
        [_, "depth", n] => n.parse().unwrap_or(0),
        _ => 0,
    };
    if depth < 1 {
        println!("usage: go depth <n>");
        return;
    }

    let start = Instant::now();
    let result = search(pos, tables, depth);
    let elapsed = start.elapsed();

    match result.best_move {
        Some(mv) => {
            let pv: Vec<String> = result.pv.iter().map(|m| m.coords()).collect();
            println!(
                "best {} score {} cp depth {} nodes {} time {} ms",
                mv,
                result.score,
                result.depth,
                result.nodes,
                elapsed.as_millis()
            );
            println!("pv {}", pv.join(" "));
        }
        None => println!("no legal moves (score {})", result.score),
    }
}

fn handle_play(parts: &[&str], pos: &mut Position, tables: &MagicTables) {
    let Some(token) = parts.get(1) else {
        println!("usage: play <e2e4[q]>");
        return;
    };
    match find_legal_move(pos, tables, token) {
        Some(mv) => {
            make_move(pos, mv);
            println!("played {}", mv);
            let status = game_status(pos, tables);
            if status != GameStatus::InPlay {
                println!("game over: {:?}", status);
            }
        }
        None => println!("illegal move {:?}", token),
    }
}

fn handle_perft(parts: &[&str], pos: &mut Position, tables: &MagicTables, divide: bool) {
    let depth: u32 = parts.get(1).and_then(|n| n.parse().ok()).unwrap_or(1);
    let start = Instant::now();
    if divide {
        let lines = perft_divide(pos, tables, depth);
        for (mv, nodes) in &lines {
            println!("{}: {}", mv.coords(), nodes);
        }
        let total: u64 = lines.iter().map(|&(_, n)| n).sum();
        println!("total {} ({} ms)", total, start.elapsed().as_millis());
    } else {
        let nodes = perft(pos, tables, depth);
        println!("perft({}) = {} ({} ms)", depth, nodes, start.elapsed().as_millis());
    }
}

fn handle_breakdown(parts: &[&str], pos: &mut Position, tables: &MagicTables) {
    let depth: u32 = parts.get(1).and_then(|n| n.parse().ok()).unwrap_or(1);
    let b = perft_breakdown(pos, tables, depth);
    println!(
        "nodes {} captures {} ep {} castles {} promotions {} checks {} checkmates {}",
        b.nodes, b.captures, b.en_passants, b.castles, b.promotions, b.checks, b.checkmates
    );
}

fn print_board(pos: &Position) {
    for rank in (0..8u8).rev() {
        print!("{} ", rank + 1);
        for file in 0..8u8 {
            let sq = caissa::square::Square::from_index(rank * 8 + file);
            print!(" {}", pos.piece_at(sq).glyph());
        }
        println!();
    }
    println!("   a b c d e f g h");
    println!("{}", pos.to_fen());
}
