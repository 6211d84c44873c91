use cozy_chess::{BitBoard, Board as CozyBoard, Color, File, Move, Piece, Square};
use std::fmt;
use std::ops::{Deref, DerefMut};

use crate::board::notation::{self, PROMOTION_FALLBACK};
use crate::error::PositionError;
use crate::search::zobrist;

#[derive(Clone)]
struct Undo {
    board: CozyBoard,
    mv: Move,
    halfmove: u32,
}

/// A game line over a cozy-chess board with in-place make/unmake.
///
/// cozy-chess is copy-make, so every push keeps the previous board on a stack.
/// The identity key of every position on the line is kept for repetition
/// detection, together with an uncapped irreversible-move counter.
#[derive(Clone)]
pub struct Position {
    board: CozyBoard,
    stack: Vec<Undo>,
    keys: Vec<u64>,
    halfmove: u32,
}

impl Position {
    pub fn startpos() -> Self { Self::from_board(CozyBoard::default()) }

    pub fn from_fen(fen: &str) -> Result<Self, PositionError> {
        CozyBoard::from_fen(fen.trim(), false)
            .map(Self::from_board)
            .map_err(|e| PositionError::InvalidFen { fen: fen.to_string(), reason: format!("{e:?}") })
    }

    fn from_board(board: CozyBoard) -> Self {
        let key = zobrist::compute(&board);
        let halfmove = board.halfmove_clock() as u32;
        Self { board, stack: Vec::with_capacity(128), keys: vec![key], halfmove }
    }

    pub fn from_start_and_moves(moves: &[String]) -> Result<Self, PositionError> {
        let mut pos = Self::startpos();
        pos.apply_uci_moves(moves)?;
        Ok(pos)
    }

    pub fn apply_uci_moves(&mut self, moves: &[String]) -> Result<(), PositionError> {
        for text in moves {
            let mv = self.parse_uci(text)?;
            self.push(mv)?;
        }
        Ok(())
    }

    pub fn board(&self) -> &CozyBoard { &self.board }

    pub fn side_to_move(&self) -> Color { self.board.side_to_move() }

    /// Identity key of the current position.
    pub fn key(&self) -> u64 { self.keys[self.keys.len() - 1] }

    /// Plies since the last capture or pawn move.
    pub fn halfmove_clock(&self) -> u32 { self.halfmove }

    /// Number of moves pushed on top of the initial position.
    pub fn ply(&self) -> usize { self.stack.len() }

    pub fn fullmove_number(&self) -> u16 { self.board.fullmove_number() }

    pub fn legal_moves(&self) -> Vec<Move> { notation::legal_moves(&self.board) }

    pub fn has_legal_moves(&self) -> bool {
        let mut any = false;
        self.board.generate_moves(|ml| {
            any = !ml.is_empty();
            any
        });
        any
    }

    pub fn push(&mut self, mv: Move) -> Result<(), PositionError> {
        if !self.board.is_legal(mv) {
            return Err(PositionError::IllegalMove(self.uci(mv)));
        }
        let irreversible = self.is_capture(mv) || self.board.piece_on(mv.from) == Some(Piece::Pawn);
        self.stack.push(Undo { board: self.board.clone(), mv, halfmove: self.halfmove });
        self.board.play_unchecked(mv);
        self.halfmove = if irreversible { 0 } else { self.halfmove + 1 };
        self.keys.push(zobrist::compute(&self.board));
        Ok(())
    }

    pub fn pop(&mut self) -> Result<Move, PositionError> {
        let undo = self.stack.pop().ok_or(PositionError::EmptyStack)?;
        self.board = undo.board;
        self.halfmove = undo.halfmove;
        self.keys.pop();
        Ok(undo.mv)
    }

    /// Plays `mv` and returns a guard that takes it back when dropped.
    pub fn make(&mut self, mv: Move) -> Result<MoveGuard<'_>, PositionError> {
        self.push(mv)?;
        Ok(MoveGuard { pos: self })
    }

    pub fn is_check(&self) -> bool { !self.board.checkers().is_empty() }

    pub fn is_checkmate(&self) -> bool { self.is_check() && !self.has_legal_moves() }

    pub fn is_stalemate(&self) -> bool { !self.is_check() && !self.has_legal_moves() }

    pub fn is_insufficient_material(&self) -> bool {
        Self::has_insufficient_material(&self.board, Color::White)
            && Self::has_insufficient_material(&self.board, Color::Black)
    }

    fn has_insufficient_material(board: &CozyBoard, color: Color) -> bool {
        let ours = board.colors(color);
        let heavy = board.pieces(Piece::Pawn) | board.pieces(Piece::Rook) | board.pieces(Piece::Queen);
        if !(ours & heavy).is_empty() { return false; }
        if !(ours & board.pieces(Piece::Knight)).is_empty() {
            let theirs = board.colors(!color);
            let their_minor_or_rook = theirs & !board.pieces(Piece::King) & !board.pieces(Piece::Queen);
            return ours.len() <= 2 && their_minor_or_rook.is_empty();
        }
        let bishops = board.pieces(Piece::Bishop);
        if !(ours & bishops).is_empty() {
            let no_helpers = board.pieces(Piece::Pawn).is_empty() && board.pieces(Piece::Knight).is_empty();
            return no_helpers && on_one_square_colour(bishops);
        }
        true
    }

    /// True when the current position has occurred at least `count` times
    /// on this line since the last irreversible move.
    pub fn is_repetition(&self, count: usize) -> bool {
        let current = self.key();
        let window = (self.halfmove as usize).min(self.keys.len() - 1) + 1;
        self.keys.iter().rev().take(window).filter(|&&k| k == current).count() >= count
    }

    pub fn is_fivefold_repetition(&self) -> bool { self.is_repetition(5) }

    pub fn is_seventyfive_moves(&self) -> bool { self.halfmove >= 150 && self.has_legal_moves() }

    pub fn is_draw(&self) -> bool {
        self.is_stalemate() || self.is_insufficient_material() || self.is_seventyfive_moves() || self.is_fivefold_repetition()
    }

    pub fn is_game_over(&self) -> bool { self.is_checkmate() || self.is_draw() }

    pub fn is_capture(&self, mv: Move) -> bool { self.captured_piece(mv).is_some() }

    pub fn captured_piece(&self, mv: Move) -> Option<Piece> {
        let them = !self.board.side_to_move();
        if self.board.color_on(mv.to) == Some(them) {
            return self.board.piece_on(mv.to);
        }
        let en_passant = self.board.piece_on(mv.from) == Some(Piece::Pawn)
            && mv.from.file() != mv.to.file()
            && self.board.piece_on(mv.to).is_none();
        if en_passant { Some(Piece::Pawn) } else { None }
    }

    /// Standard UCI text. Castling is rendered as the king's two-square move.
    pub fn uci(&self, mv: Move) -> String { notation::uci_text(&self.board, mv) }

    /// Standard algebraic notation, e.g. `Nf3`, `exd5`, `O-O`, `e8=Q#`.
    pub fn san(&self, mv: Move) -> String { notation::san_text(&self.board, mv) }

    /// UCI text of the move that produced the current position.
    pub fn last_move_uci(&self) -> Option<String> {
        self.stack.last().map(|u| notation::uci_text(&u.board, u.mv))
    }

    /// SAN of the move that produced the current position.
    pub fn last_move_san(&self) -> Option<String> {
        self.stack.last().map(|u| notation::san_text(&u.board, u.mv))
    }

    /// Parses UCI text into a legal move. Accepts castling either as the
    /// king's two-square move or as king-takes-rook; a pawn reaching the last
    /// rank without a promotion letter promotes per [`PROMOTION_FALLBACK`].
    pub fn parse_uci(&self, text: &str) -> Result<Move, PositionError> {
        let mut mv: Move = text.trim().parse().map_err(|_| PositionError::BadMoveText(text.to_string()))?;
        if self.board.piece_on(mv.from) == Some(Piece::King) && !self.board.is_legal(mv) {
            let rights = self.board.castle_rights(self.board.side_to_move());
            let rook_file = match mv.to.file() {
                File::G => rights.short,
                File::C => rights.long,
                _ => None,
            };
            if let Some(file) = rook_file {
                if mv.from.file() == File::E && mv.from.rank() == mv.to.rank() {
                    mv.to = Square::new(file, mv.from.rank());
                }
            }
        }
        if self.board.piece_on(mv.from) == Some(Piece::Pawn) && mv.promotion.is_none() && !self.board.is_legal(mv) {
            if let Some(promoted) = PROMOTION_FALLBACK
                .iter()
                .map(|&p| Move { promotion: Some(p), ..mv })
                .find(|&m| self.board.is_legal(m))
            {
                mv = promoted;
            }
        }
        if self.board.is_legal(mv) { Ok(mv) } else { Err(PositionError::IllegalMove(text.trim().to_string())) }
    }

    /// Parses standard algebraic notation into a legal move.
    pub fn parse_san(&self, text: &str) -> Result<Move, PositionError> { notation::parse_san(&self.board, text) }

    /// Game result in PGN form: `1-0`, `0-1`, `1/2-1/2`, or `*` while the
    /// game is still running.
    pub fn result(&self) -> &'static str {
        if self.is_checkmate() {
            if self.side_to_move() == Color::White { "0-1" } else { "1-0" }
        } else if self.is_draw() {
            "1/2-1/2"
        } else {
            "*"
        }
    }
}

fn on_one_square_colour(bb: BitBoard) -> bool {
    let mut dark = false;
    let mut light = false;
    for sq in bb {
        if (sq.file() as usize + sq.rank() as usize) % 2 == 0 { dark = true; } else { light = true; }
    }
    !(dark && light)
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.board) }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Position").field("fen", &self.board.to_string()).field("ply", &self.stack.len()).finish()
    }
}

/// A move applied to a [`Position`]; dropping the guard undoes it.
pub struct MoveGuard<'a> {
    pos: &'a mut Position,
}

impl Deref for MoveGuard<'_> {
    type Target = Position;
    fn deref(&self) -> &Position { self.pos }
}

impl DerefMut for MoveGuard<'_> {
    fn deref_mut(&mut self) -> &mut Position { self.pos }
}

impl Drop for MoveGuard<'_> {
    fn drop(&mut self) {
        // The guard owns exactly one push, so the stack cannot be empty here.
        let _ = self.pos.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn moves(text: &str) -> Vec<String> { text.split_whitespace().map(str::to_string).collect() }

    #[test]
    fn guard_restores_position_on_drop() {
        let mut pos = Position::startpos();
        let before = pos.to_string();
        let mv = pos.parse_uci("e2e4").unwrap();
        {
            let child = pos.make(mv).unwrap();
            assert_eq!(child.side_to_move(), Color::Black);
        }
        assert_eq!(pos.to_string(), before);
        assert_eq!(pos.ply(), 0);
    }

    #[test]
    fn illegal_move_is_rejected_without_mutation() {
        let mut pos = Position::startpos();
        let err = pos.parse_uci("e2e5").unwrap_err();
        assert_eq!(err, PositionError::IllegalMove("e2e5".to_string()));
        assert!(matches!(pos.pop(), Err(PositionError::EmptyStack)));
    }

    #[test]
    fn castling_round_trips_through_standard_uci() {
        let pos = Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        let short = pos.parse_uci("e1g1").unwrap();
        assert_eq!(short.to, Square::H1);
        assert_eq!(pos.uci(short), "e1g1");
        let long = pos.parse_uci("e1c1").unwrap();
        assert_eq!(pos.uci(long), "e1c1");
    }

    #[test]
    fn en_passant_counts_as_pawn_capture() {
        let pos = Position::from_fen("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 2").unwrap();
        let mv = pos.parse_uci("e5d6").unwrap();
        assert!(pos.is_capture(mv));
        assert_eq!(pos.captured_piece(mv), Some(Piece::Pawn));
    }

    #[test]
    fn knight_shuffle_repeats_start_position() {
        let moves: Vec<String> = ["g1f3", "g8f6", "f3g1", "f6g8"].iter().map(|s| s.to_string()).collect();
        let pos = Position::from_start_and_moves(&moves).unwrap();
        assert!(pos.is_repetition(2));
        assert!(!pos.is_repetition(3));
        assert!(!pos.is_fivefold_repetition());
    }

    #[test]
    fn insufficient_material_cases() {
        let kk = Position::from_fen("8/8/8/4k3/8/8/8/4K3 w - - 0 1").unwrap();
        let kn = Position::from_fen("8/8/8/4k3/8/8/8/1N2K3 w - - 0 1").unwrap();
        let split_bishops = Position::from_fen("8/8/8/4k3/8/8/8/2B1KB2 w - - 0 1").unwrap();
        let kr = Position::from_fen("8/8/8/4k3/8/8/8/R3K3 w - - 0 1").unwrap();
        assert!(kk.is_insufficient_material());
        assert!(kn.is_insufficient_material());
        assert!(!split_bishops.is_insufficient_material());
        assert!(!kr.is_insufficient_material());
    }

    #[test]
    fn seventyfive_move_counter_is_uncapped() {
        let mut pos = Position::from_fen("8/8/8/4k3/8/8/8/R3K3 w - - 99 80").unwrap();
        let shuffle = ["a1a2", "e5e6", "a2a1", "e6e5"];
        for _ in 0..13 {
            for text in shuffle {
                let mv = pos.parse_uci(text).unwrap();
                pos.push(mv).unwrap();
            }
        }
        assert!(pos.halfmove_clock() >= 150);
        assert!(pos.is_seventyfive_moves());
        assert!(pos.is_game_over());
    }

    #[test]
    fn double_push_without_capture_transposes() {
        let a = Position::from_start_and_moves(&moves("g1f3 g8f6 e2e4")).unwrap();
        let b = Position::from_start_and_moves(&moves("e2e4 g8f6 g1f3")).unwrap();
        assert_eq!(a.key(), b.key());
    }

    #[test]
    fn repetition_is_seen_through_a_double_push() {
        let pos = Position::from_start_and_moves(&moves("e2e4 g8f6 g1f3 f6g8 f3g1")).unwrap();
        assert!(pos.is_repetition(2));
    }

    #[test]
    fn bare_uci_promotion_becomes_a_queen() {
        let pos = Position::from_fen("3r3k/4P3/8/8/8/8/8/K7 w - - 0 1").unwrap();
        assert_eq!(pos.parse_uci("e7e8").unwrap().promotion, Some(Piece::Queen));
        assert_eq!(pos.parse_uci("e7d8r").unwrap().promotion, Some(Piece::Rook));
    }

    #[test]
    fn last_move_is_reported_in_both_notations() {
        let pos = Position::from_start_and_moves(&moves("e2e4 e7e5 g1f3 b8c6 f1c4 g8f6 e1g1")).unwrap();
        assert_eq!(pos.last_move_san().as_deref(), Some("O-O"));
        assert_eq!(pos.last_move_uci().as_deref(), Some("e1g1"));
        assert_eq!(pos.fullmove_number(), 4);
    }

    #[test]
    fn result_strings() {
        assert_eq!(Position::startpos().result(), "*");
        assert_eq!(Position::from_fen("R5k1/5ppp/8/8/8/8/8/6K1 b - - 1 1").unwrap().result(), "1-0");
        assert_eq!(Position::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap().result(), "1/2-1/2");
    }
}
