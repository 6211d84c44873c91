use cozy_chess::{Board, Color, File, Move, Piece, Rank, Square};
use std::sync::OnceLock;

const PIECES: [Piece; 6] = [Piece::Pawn, Piece::Knight, Piece::Bishop, Piece::Rook, Piece::Queen, Piece::King];

// 12 * 64 piece-square keys, then side, 4 castling rights, 8 en-passant files.
const SIDE_OFFSET: usize = 12 * 64;
const CASTLE_OFFSET: usize = SIDE_OFFSET + 1;
const EP_OFFSET: usize = CASTLE_OFFSET + 4;
const TABLE_LEN: usize = EP_OFFSET + 8;

fn piece_index(color: Color, piece: Piece) -> usize {
    let c = if color == Color::White { 0 } else { 1 };
    c * 6 + piece as usize
}

fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

static TABLE: OnceLock<[u64; TABLE_LEN]> = OnceLock::new();

fn table() -> &'static [u64; TABLE_LEN] {
    TABLE.get_or_init(|| {
        let mut t = [0u64; TABLE_LEN];
        let mut seed = 0xF00D_F00D_DEAD_BEEF;
        for v in &mut t {
            seed = splitmix64(seed);
            *v = seed;
        }
        t
    })
}

// cozy-chess records the file after every double push; only a capture the
// side to move could actually play makes it part of the position.
fn en_passant_file(board: &Board) -> Option<File> {
    let file = board.en_passant()?;
    let us = board.side_to_move();
    let to = Square::new(file, Rank::Sixth.relative_to(us));
    let capturers = board.colored_pieces(us, Piece::Pawn) & file.adjacent() & Rank::Fifth.relative_to(us).bitboard();
    capturers.into_iter().any(|from| board.is_legal(Move { from, to, promotion: None })).then_some(file)
}

/// Canonical identity of a position: placement, side to move, castling
/// rights and en-passant file. Move history does not enter the key.
pub fn compute(board: &Board) -> u64 {
    let table = table();
    let mut key = 0u64;
    for color in [Color::White, Color::Black] {
        for piece in PIECES {
            for sq in board.colored_pieces(color, piece) {
                key ^= table[piece_index(color, piece) * 64 + sq as usize];
            }
        }
        let rights = board.castle_rights(color);
        let base = CASTLE_OFFSET + if color == Color::White { 0 } else { 2 };
        if rights.short.is_some() { key ^= table[base]; }
        if rights.long.is_some() { key ^= table[base + 1]; }
    }
    if board.side_to_move() == Color::Black { key ^= table[SIDE_OFFSET]; }
    if let Some(file) = en_passant_file(board) { key ^= table[EP_OFFSET + file as usize]; }
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    fn play_all(moves: &[&str]) -> Board {
        let mut b = Board::default();
        for m in moves { b.play(m.parse().unwrap()); }
        b
    }

    #[test]
    fn transposed_move_orders_share_a_key() {
        let a = play_all(&["g1f3", "g8f6", "b1c3"]);
        let b = play_all(&["b1c3", "g8f6", "g1f3"]);
        assert_eq!(compute(&a), compute(&b));
    }

    #[test]
    fn uncapturable_double_push_does_not_change_key() {
        let a = play_all(&["g1f3", "g8f6", "e2e4"]);
        let b = play_all(&["e2e4", "g8f6", "g1f3"]);
        assert_eq!(a.en_passant(), Some(File::E));
        assert_eq!(compute(&a), compute(&b));
    }

    #[test]
    fn pinned_capturer_does_not_count() {
        // The d4 pawn is pinned to the king on the fourth rank.
        let pinned = Board::from_fen("8/8/8/8/k2pP2R/8/8/4K3 b - e3 0 1", false).unwrap();
        let plain = Board::from_fen("8/8/8/8/k2pP2R/8/8/4K3 b - - 0 1", false).unwrap();
        assert_eq!(compute(&pinned), compute(&plain));
    }

    #[test]
    fn side_to_move_changes_key() {
        let w = Board::from_fen("4k3/8/8/8/8/8/8/4K3 w - - 0 1", false).unwrap();
        let b = Board::from_fen("4k3/8/8/8/8/8/8/4K3 b - - 0 1", false).unwrap();
        assert_ne!(compute(&w), compute(&b));
    }

    #[test]
    fn castling_rights_change_key() {
        let all = Board::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1", false).unwrap();
        let some = Board::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w Kkq - 0 1", false).unwrap();
        assert_ne!(compute(&all), compute(&some));
    }

    #[test]
    fn en_passant_file_changes_key() {
        let ep = Board::from_fen("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 2", false).unwrap();
        let none = Board::from_fen("4k3/8/8/3pP3/8/8/8/4K3 w - - 0 2", false).unwrap();
        assert_ne!(compute(&ep), compute(&none));
    }
}
