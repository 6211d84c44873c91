use cozy_chess::{Move, Piece};

use crate::board::Position;

pub const CAPTURE_WEIGHT: i32 = 10;
pub const PROMOTION_BONUS: i32 = 900;
pub const CHECK_BONUS: i32 = 50;

/// Victim rank used by the capture term (pawn 1 .. king 6).
pub fn value_rank(piece: Piece) -> i32 {
    match piece {
        Piece::Pawn => 1,
        Piece::Knight => 2,
        Piece::Bishop => 3,
        Piece::Rook => 4,
        Piece::Queen => 5,
        Piece::King => 6,
    }
}

/// Priority of a single candidate: victim rank for captures, a flat bonus
/// for any promotion, and a flat bonus for moves that give check.
pub fn move_priority(pos: &mut Position, mv: Move) -> i32 {
    let mut score = 0;
    if let Some(victim) = pos.captured_piece(mv) {
        score += CAPTURE_WEIGHT * value_rank(victim);
    }
    if mv.promotion.is_some() {
        score += PROMOTION_BONUS;
    }
    if let Ok(child) = pos.make(mv) {
        if child.is_check() { score += CHECK_BONUS; }
    }
    score
}

/// Reorders `moves` by descending priority. The sort is stable, so equal
/// priorities keep generation order, and no move is added or dropped.
pub fn order_moves(pos: &mut Position, moves: Vec<Move>) -> Vec<Move> {
    let mut scored: Vec<(i32, Move)> = moves.into_iter().map(|m| (move_priority(pos, m), m)).collect();
    scored.sort_by_key(|&(s, _)| -s);
    scored.into_iter().map(|(_, m)| m).collect()
}
