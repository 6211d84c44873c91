use cozy_chess::Move;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::board::Position;
use crate::search::eval::MATE_BOUND;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bound {
    Exact,
    Lower,
    Upper,
}

impl Bound {
    /// Classifies a node result against the window the node was entered with.
    pub fn classify(score: i32, alpha: i32, beta: i32) -> Self {
        if score <= alpha { Bound::Upper } else if score >= beta { Bound::Lower } else { Bound::Exact }
    }
}

/// How stored results may be reused.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheMode {
    /// Honour the bound tag and the check-extension budget of each entry.
    #[default]
    Bounded,
    /// Treat every hit as the final value for its depth.
    Unconditional,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Entry {
    pub score: i32,
    pub best: Option<Move>,
    pub bound: Bound,
    pub checks_left: u32,
}

/// The window and extension budget a probing node was entered with.
#[derive(Clone, Copy, Debug)]
pub struct Probe {
    pub depth: u32,
    pub ply: u32,
    pub alpha: i32,
    pub beta: i32,
    pub checks_left: u32,
}

/// In-memory cache of search results keyed by (position identity, depth).
///
/// Unbounded and last-write-wins; entries live until `clear` or drop.
#[derive(Debug, Default)]
pub struct TranspositionCache {
    table: HashMap<(u64, u32), Entry>,
    mode: CacheMode,
}

// Mate scores are stored relative to the node so they can be reused at a
// different distance from the root.
fn to_stored(score: i32, ply: u32) -> i32 {
    if score > MATE_BOUND { score + ply as i32 } else if score < -MATE_BOUND { score - ply as i32 } else { score }
}

fn from_stored(score: i32, ply: u32) -> i32 {
    if score > MATE_BOUND { score - ply as i32 } else if score < -MATE_BOUND { score + ply as i32 } else { score }
}

impl TranspositionCache {
    pub fn new(mode: CacheMode) -> Self { Self { table: HashMap::new(), mode } }

    pub fn len(&self) -> usize { self.table.len() }

    pub fn is_empty(&self) -> bool { self.table.is_empty() }

    pub fn clear(&mut self) { self.table.clear(); }

    pub fn get(&self, key: u64, depth: u32) -> Option<Entry> { self.table.get(&(key, depth)).copied() }

    pub fn put(&mut self, key: u64, depth: u32, entry: Entry) { self.table.insert((key, depth), entry); }

    /// Raw entry for `pos` searched to `depth`.
    pub fn lookup(&self, pos: &Position, depth: u32) -> Option<Entry> { self.get(pos.key(), depth) }

    /// Records a node result, overwriting whatever was stored for the key.
    pub fn store(&mut self, pos: &Position, probe: Probe, score: i32, best: Option<Move>) {
        let (score, bound) = match self.mode {
            CacheMode::Bounded => (to_stored(score, probe.ply), Bound::classify(score, probe.alpha, probe.beta)),
            CacheMode::Unconditional => (score, Bound::Exact),
        };
        self.put(pos.key(), probe.depth, Entry { score, best, bound, checks_left: probe.checks_left });
    }

    /// Returns a stored (score, move) if it may stand in for searching the node.
    pub fn probe(&self, pos: &Position, probe: Probe) -> Option<(i32, Option<Move>)> {
        let e = self.lookup(pos, probe.depth)?;
        match self.mode {
            CacheMode::Unconditional => Some((e.score, e.best)),
            CacheMode::Bounded => {
                if e.checks_left != probe.checks_left { return None; }
                let score = from_stored(e.score, probe.ply);
                let usable = match e.bound {
                    Bound::Exact => true,
                    Bound::Lower => score >= probe.beta,
                    Bound::Upper => score <= probe.alpha,
                };
                if usable { Some((score, e.best)) } else { None }
            }
        }
    }
}
