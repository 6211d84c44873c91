use cozy_chess::Move;
use log::{debug, info};

use crate::board::Position;
use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::search::eval::{evaluate, INFINITY};
use crate::search::ordering::order_moves;
use crate::search::tt::{Probe, TranspositionCache};

/// Counters for one iteration of the driver.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchStats {
    /// Deepest ply entered by the full-width search.
    pub max_ply: u32,
    pub nodes: u64,
    pub qnodes: u64,
    pub cache_hits: u64,
}

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchResult {
    pub best_move: Option<Move>,
    /// White-positive score of the kept iteration.
    pub score: i32,
    /// Depth of the iteration whose move was kept.
    pub depth: u32,
    /// Deepest ply reached by that iteration.
    pub max_ply: u32,
    /// Nodes over all iterations, quiescence included.
    pub nodes: u64,
}

/// Per-call state of the recursive search.
#[derive(Debug, Clone, Copy)]
pub struct Node {
    pub depth: u32,
    pub ply: u32,
    pub alpha: i32,
    pub beta: i32,
    pub maximizing: bool,
    pub checks_left: u32,
}

impl Node {
    pub fn root(depth: u32, maximizing: bool, checks_left: u32) -> Self {
        Self { depth, ply: 0, alpha: -INFINITY, beta: INFINITY, maximizing, checks_left }
    }

    fn probe(&self) -> Probe {
        Probe { depth: self.depth, ply: self.ply, alpha: self.alpha, beta: self.beta, checks_left: self.checks_left }
    }
}

pub struct Searcher<'c> {
    cache: &'c mut TranspositionCache,
    config: SearchConfig,
    pub(crate) stats: SearchStats,
}

impl<'c> Searcher<'c> {
    pub fn new(cache: &'c mut TranspositionCache, config: SearchConfig) -> Self {
        Self { cache, config, stats: SearchStats::default() }
    }

    pub fn stats(&self) -> SearchStats { self.stats }

    pub fn cache(&self) -> &TranspositionCache { &*self.cache }

    /// Minimax with alpha-beta pruning. White-to-move nodes maximize.
    ///
    /// Returns the node score and, for interior nodes, the move achieving it.
    /// `pos` is restored before returning on every path.
    pub fn search(&mut self, pos: &mut Position, node: Node) -> Result<(i32, Option<Move>), SearchError> {
        self.stats.nodes += 1;
        self.stats.max_ply = self.stats.max_ply.max(node.ply);

        if self.config.use_cache {
            if let Some(hit) = self.cache.probe(pos, node.probe()) {
                self.stats.cache_hits += 1;
                return Ok(hit);
            }
        }

        // The root is never scored as a repetition: the game line may already
        // contain it, and the caller still needs a move.
        if node.ply > 0 && pos.is_repetition(2) {
            let penalty = self.config.repetition_penalty;
            return Ok((if node.maximizing { -penalty } else { penalty }, None));
        }

        if pos.is_game_over() { return Ok((evaluate(pos, node.ply), None)); }

        if node.depth == 0 {
            if pos.is_check() {
                let score = self.quiescence(pos, node.alpha, node.beta, node.ply, node.maximizing)?;
                return Ok((score, None));
            }
            return Ok((evaluate(pos, node.ply), None));
        }

        let mut moves = pos.legal_moves();
        if moves.is_empty() { return Err(SearchError::NoLegalMoves { fen: pos.to_string() }); }
        if self.config.order_moves { moves = order_moves(pos, moves); }

        let mut alpha = node.alpha;
        let mut beta = node.beta;
        let mut best = if node.maximizing { -INFINITY } else { INFINITY };
        let mut best_move: Option<Move> = None;
        for m in moves {
            let score = {
                let mut child = pos.make(m)?;
                let mut depth = node.depth - 1;
                let mut checks_left = node.checks_left;
                if checks_left > 0 && child.is_check() {
                    depth = node.depth;
                    checks_left -= 1;
                }
                let next = Node { depth, ply: node.ply + 1, alpha, beta, maximizing: !node.maximizing, checks_left };
                self.search(&mut child, next)?.0
            };
            if node.maximizing {
                if score > best { best = score; best_move = Some(m); }
                alpha = alpha.max(score);
            } else {
                if score < best { best = score; best_move = Some(m); }
                beta = beta.min(score);
            }
            if beta <= alpha { break; }
        }

        if self.config.use_cache {
            self.cache.store(pos, node.probe(), best, best_move);
        }
        Ok((best, best_move))
    }

    /// Iterative deepening from depth 1 to `max_depth`. The move of the last
    /// iteration that produced one is kept; `None` means no move exists.
    pub fn choose_move(&mut self, pos: &mut Position, max_depth: u32, minimizing: bool) -> Result<SearchResult, SearchError> {
        let maximizing = !minimizing;
        let mut result = SearchResult::default();
        let mut total_nodes = 0u64;
        for depth in 1..=max_depth {
            self.stats = SearchStats::default();
            let (score, best) = self.search(pos, Node::root(depth, maximizing, self.config.check_extensions))?;
            total_nodes += self.stats.nodes + self.stats.qnodes;
            debug!(
                "depth {} score {} best {} nodes {} qnodes {} hits {} max_ply {}",
                depth,
                score,
                best.map(|m| pos.uci(m)).unwrap_or_else(|| "none".to_string()),
                self.stats.nodes,
                self.stats.qnodes,
                self.stats.cache_hits,
                self.stats.max_ply
            );
            if let Some(m) = best {
                result = SearchResult { best_move: Some(m), score, depth, max_ply: self.stats.max_ply, nodes: 0 };
            }
        }
        result.nodes = total_nodes;
        info!("searched up to ply depth {}", result.max_ply);
        Ok(result)
    }

    /// `choose_move` for whichever side is to move in `pos`.
    pub fn best_move(&mut self, pos: &mut Position, max_depth: u32) -> Result<SearchResult, SearchError> {
        let minimizing = pos.side_to_move() == cozy_chess::Color::Black;
        self.choose_move(pos, max_depth, minimizing)
    }
}
