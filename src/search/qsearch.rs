use crate::board::Position;
use crate::error::SearchError;
use crate::search::alphabeta::Searcher;
use crate::search::eval::{evaluate, mated_score, DRAW_SCORE, INFINITY};

impl Searcher<'_> {
    pub fn qsearch_eval_cp(&mut self, pos: &mut Position, maximizing: bool) -> Result<i32, SearchError> {
        self.quiescence(pos, -INFINITY, INFINITY, 0, maximizing)
    }

    /// Capture-only search with a stand-pat bound, used past the horizon.
    pub fn quiescence(&mut self, pos: &mut Position, mut alpha: i32, mut beta: i32, ply: u32, maximizing: bool) -> Result<i32, SearchError> {
        self.stats.qnodes += 1;
        if pos.is_checkmate() { return Ok(mated_score(pos.side_to_move(), ply)); }
        if pos.is_stalemate() { return Ok(DRAW_SCORE); }

        // Stand pat
        let stand = evaluate(pos, ply);
        if maximizing {
            if stand >= beta { return Ok(beta); }
            alpha = alpha.max(stand);
        } else {
            if stand <= alpha { return Ok(alpha); }
            beta = beta.min(stand);
        }

        // Captures only
        let captures: Vec<_> = pos.legal_moves().into_iter().filter(|&m| pos.is_capture(m)).collect();
        for m in captures {
            let score = {
                let mut child = pos.make(m)?;
                self.quiescence(&mut child, alpha, beta, ply + 1, !maximizing)?
            };
            if maximizing {
                if score >= beta { return Ok(beta); }
                alpha = alpha.max(score);
            } else {
                if score <= alpha { return Ok(alpha); }
                beta = beta.min(score);
            }
        }
        Ok(if maximizing { alpha } else { beta })
    }
}
