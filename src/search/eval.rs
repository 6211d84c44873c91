use cozy_chess::{Board, Color, Piece, Square};

use crate::board::Position;

const PAWN: i32 = 100;
const KNIGHT: i32 = 320;
const BISHOP: i32 = 330;
const ROOK: i32 = 500;
const QUEEN: i32 = 900;
const KING: i32 = 20_000;

/// Charged to a side for each of its knights still on a home square.
pub const UNDEVELOPED_KNIGHT_PENALTY: i32 = 40;

// Mate scoring helpers
pub const MATE_SCORE: i32 = 100_000;
pub const DRAW_SCORE: i32 = 0;
/// Scores beyond this magnitude encode a forced mate.
pub const MATE_BOUND: i32 = MATE_SCORE - 1_000;
/// Window edge, strictly outside every reachable score.
pub const INFINITY: i32 = 1_000_000;

pub fn piece_value(piece: Piece) -> i32 {
    match piece {
        Piece::Pawn => PAWN,
        Piece::Knight => KNIGHT,
        Piece::Bishop => BISHOP,
        Piece::Rook => ROOK,
        Piece::Queen => QUEEN,
        Piece::King => KING,
    }
}

fn count_piece(board: &Board, color: Color, piece: Piece) -> i32 {
    board.colored_pieces(color, piece).len() as i32
}

// Side-agnostic material in centipawns: positive means White has more material.
pub fn material_eval_cp_side_agnostic(board: &Board) -> i32 {
    let w = Color::White;
    let b = Color::Black;
    [Piece::Pawn, Piece::Knight, Piece::Bishop, Piece::Rook, Piece::Queen, Piece::King]
        .into_iter()
        .map(|p| (count_piece(board, w, p) - count_piece(board, b, p)) * piece_value(p))
        .sum()
}

fn undeveloped_knights(board: &Board, color: Color) -> i32 {
    let homes = if color == Color::White { [Square::B1, Square::G1] } else { [Square::B8, Square::G8] };
    let knights = board.colored_pieces(color, Piece::Knight);
    homes.into_iter().filter(|&sq| knights.has(sq)).count() as i32
}

/// Knight development term, White-positive.
pub fn development_cp(board: &Board) -> i32 {
    (undeveloped_knights(board, Color::Black) - undeveloped_knights(board, Color::White)) * UNDEVELOPED_KNIGHT_PENALTY
}

/// Score for a side to move that has been mated at `ply`, White-positive.
/// Mates found nearer the root are worth more to the mating side.
pub fn mated_score(loser: Color, ply: u32) -> i32 {
    let magnitude = MATE_SCORE - ply as i32;
    if loser == Color::White { -magnitude } else { magnitude }
}

pub fn is_mate_score(score: i32) -> bool { score.abs() > MATE_BOUND }

/// Static evaluation from White's point of view. Checkmate and every drawn
/// terminal state are scored before material is looked at.
pub fn evaluate(pos: &Position, ply: u32) -> i32 {
    if pos.is_checkmate() { return mated_score(pos.side_to_move(), ply); }
    if pos.is_draw() { return DRAW_SCORE; }
    let board = pos.board();
    material_eval_cp_side_agnostic(board) + development_cp(board)
}
