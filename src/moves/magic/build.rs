//! Magic-number search and attack-table construction.
//!
//! Magics are found once at startup by trying random sparse multipliers
//! until one hashes every blocker subset of a square without a destructive
//! collision. The search is seeded, so the resulting tables are identical
//! on every run.

use super::rays::{
    BISHOP_DIRECTIONS, ROOK_DIRECTIONS, bishop_attacks_scan, blocker_mask, blocker_subsets,
    rook_attacks_scan,
};
use super::{MagicEntry, MagicTables, SliderTables};
use crate::bitboard::{Bitboard, BitboardExt};
use crate::square::Square;
use rand::{Rng, RngCore, SeedableRng, rngs::StdRng};

const MAX_ATTEMPTS: u32 = 1_000_000;

/// AND of three randoms: a sparse bit pattern collides far less often when
/// used as a multiplicative hash.
#[inline]
fn random_sparse<R: RngCore>(rng: &mut R) -> u64 {
    rng.random::<u64>() & rng.random::<u64>() & rng.random::<u64>()
}

/// A candidate is valid when every blocker subset maps to a slot holding
/// either nothing or the same attack set (constructive collisions are fine).
fn is_valid_magic(blockers: &[Bitboard], attacks: &[Bitboard], magic: u64, shift: u32) -> bool {
    let mut table: Vec<Option<Bitboard>> = vec![None; 1 << (64 - shift)];
    for (&blocker, &attack) in blockers.iter().zip(attacks) {
        let index = (blocker.wrapping_mul(magic) >> shift) as usize;
        match table[index] {
            None => table[index] = Some(attack),
            Some(existing) if existing == attack => {}
            Some(_) => return false,
        }
    }
    true
}

fn find_magic<R: RngCore>(
    blockers: &[Bitboard],
    attacks: &[Bitboard],
    shift: u32,
    rng: &mut R,
) -> Result<u64, String> {
    for _ in 0..MAX_ATTEMPTS {
        let magic = random_sparse(rng);
        if is_valid_magic(blockers, attacks, magic, shift) {
            return Ok(magic);
        }
    }
    Err(format!(
        "no valid magic found in {} attempts (shift {})",
        MAX_ATTEMPTS, shift
    ))
}

fn build_entry<R: RngCore>(
    square: Square,
    directions: &[(i8, i8)],
    scan: fn(Square, Bitboard) -> Bitboard,
    rng: &mut R,
) -> Result<MagicEntry, String> {
    let mask = blocker_mask(square, directions);
    let shift = 64 - mask.count();
    let blockers = blocker_subsets(mask);
    let attacks: Vec<Bitboard> = blockers.iter().map(|&b| scan(square, b)).collect();

    let magic = find_magic(&blockers, &attacks, shift, rng)
        .map_err(|e| format!("square {}: {}", square, e))?;

    let mut table = vec![0u64; 1 << (64 - shift)];
    for (&blocker, &attack) in blockers.iter().zip(&attacks) {
        table[(blocker.wrapping_mul(magic) >> shift) as usize] = attack;
    }

    Ok(MagicEntry {
        magic,
        shift,
        mask,
        table: table.into_boxed_slice(),
    })
}

fn build_slider<R: RngCore>(
    directions: &[(i8, i8)],
    scan: fn(Square, Bitboard) -> Bitboard,
    rng: &mut R,
) -> Result<SliderTables, String> {
    let mut entries = Vec::with_capacity(64);
    for idx in 0..64u8 {
        entries.push(build_entry(Square::from_index(idx), directions, scan, rng)?);
    }
    Ok(SliderTables { entries })
}

pub fn generate_magic_tables(seed: u64) -> Result<MagicTables, String> {
    let mut rng = StdRng::seed_from_u64(seed);
    Ok(MagicTables {
        rook: build_slider(&ROOK_DIRECTIONS, rook_attacks_scan, &mut rng)?,
        bishop: build_slider(&BISHOP_DIRECTIONS, bishop_attacks_scan, &mut rng)?,
    })
}
