//! Magic-bitboard sliding attacks: per-square perfect-hash tables mapping
//! (square, blockers) to rook/bishop attack sets in one
//! multiply-shift-lookup.

pub mod build;
pub mod rays;

use crate::bitboard::Bitboard;
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Fixed search seed; tables are byte-identical on every run.
const MAGIC_SEED: u64 = 0x45C5_0A11_600D_5EED;

/// One square's perfect-hash data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MagicEntry {
    /// Multiplier hashing masked blockers into table indices.
    pub magic: u64,
    /// `64 - popcount(mask)`.
    pub shift: u32,
    /// Blocker mask: rays minus origin and rim.
    pub mask: Bitboard,
    /// Attack set per hashed blocker subset.
    pub table: Box<[Bitboard]>,
}

impl MagicEntry {
    #[inline(always)]
    fn lookup(&self, blockers: Bitboard) -> Bitboard {
        let masked = blockers & self.mask;
        self.table[(masked.wrapping_mul(self.magic) >> self.shift) as usize]
    }
}

/// 64 per-square entries for one slider type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SliderTables {
    pub entries: Vec<MagicEntry>,
}

impl SliderTables {
    #[inline(always)]
    pub fn attacks(&self, square: usize, blockers: Bitboard) -> Bitboard {
        self.entries[square].lookup(blockers)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MagicTables {
    pub rook: SliderTables,
    pub bishop: SliderTables,
}

impl MagicTables {
    /// Queen attacks are the union of the rook and bishop tables.
    #[inline(always)]
    pub fn queen_attacks(&self, square: usize, blockers: Bitboard) -> Bitboard {
        self.rook.attacks(square, blockers) | self.bishop.attacks(square, blockers)
    }

    /// Read cached tables from `path`, falling back to generation (and a
    /// best-effort cache write) when the file is missing or stale.
    pub fn load_or_generate(path: &Path) -> Result<MagicTables, String> {
        if let Ok(file) = std::fs::File::open(path)
            && let Ok(tables) =
                bincode::deserialize_from::<_, MagicTables>(std::io::BufReader::new(file))
            && tables.rook.entries.len() == 64
            && tables.bishop.entries.len() == 64
        {
            debug!(?path, "loaded magic tables from cache");
            return Ok(tables);
        }

        let tables = build::generate_magic_tables(MAGIC_SEED)?;
        if let Ok(file) = std::fs::File::create(path) {
            let _ = bincode::serialize_into(std::io::BufWriter::new(file), &tables);
            debug!(?path, "wrote magic table cache");
        }
        Ok(tables)
    }
}

/// Process-wide tables, generated on first use.
pub fn magic_tables() -> &'static MagicTables {
    static TABLES: OnceCell<MagicTables> = OnceCell::new();
    TABLES.get_or_init(|| {
        build::generate_magic_tables(MAGIC_SEED).expect("seeded magic generation succeeds")
    })
}
