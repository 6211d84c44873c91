use cozy_chess::{Board, Move, Piece, Square};

use crate::error::PositionError;

/// Promotion pieces tried, in order, when a pawn reaches the last rank and
/// the text names no piece.
pub const PROMOTION_FALLBACK: [Piece; 4] = [Piece::Queen, Piece::Rook, Piece::Bishop, Piece::Knight];

pub(crate) fn legal_moves(board: &Board) -> Vec<Move> {
    let mut moves = Vec::with_capacity(64);
    board.generate_moves(|ml| {
        moves.extend(ml);
        false
    });
    moves
}

// cozy-chess encodes castling as king-takes-own-rook.
pub(crate) fn is_castle(board: &Board, mv: Move) -> bool {
    board.piece_on(mv.from) == Some(Piece::King) && board.color_on(mv.to) == Some(board.side_to_move())
}

fn is_short_castle(mv: Move) -> bool { (mv.to.file() as u8) > (mv.from.file() as u8) }

fn piece_letter(piece: Piece) -> char { char::from(piece).to_ascii_uppercase() }

pub(crate) fn uci_text(board: &Board, mv: Move) -> String {
    if is_castle(board, mv) {
        let file = if is_short_castle(mv) { cozy_chess::File::G } else { cozy_chess::File::C };
        return format!("{}{}", mv.from, Square::new(file, mv.from.rank()));
    }
    format!("{}", mv)
}

// Shortest origin hint that singles `mv` out among same-piece moves to its square.
fn disambiguation(board: &Board, mv: Move, piece: Piece) -> String {
    let rivals: Vec<Square> = legal_moves(board)
        .into_iter()
        .filter(|m| m.to == mv.to && m.from != mv.from && board.piece_on(m.from) == Some(piece))
        .map(|m| m.from)
        .collect();
    if rivals.is_empty() {
        String::new()
    } else if rivals.iter().all(|sq| sq.file() != mv.from.file()) {
        mv.from.file().to_string()
    } else if rivals.iter().all(|sq| sq.rank() != mv.from.rank()) {
        mv.from.rank().to_string()
    } else {
        mv.from.to_string()
    }
}

/// Standard algebraic notation for a legal `mv` on `board`, with `+`/`#`.
pub(crate) fn san_text(board: &Board, mv: Move) -> String {
    let mut san = if is_castle(board, mv) {
        if is_short_castle(mv) { "O-O".to_string() } else { "O-O-O".to_string() }
    } else {
        let piece = board.piece_on(mv.from).unwrap_or(Piece::Pawn);
        let capture = board.color_on(mv.to) == Some(!board.side_to_move())
            || (piece == Piece::Pawn && mv.from.file() != mv.to.file());
        let mut s = String::new();
        if piece == Piece::Pawn {
            if capture { s.push(mv.from.file().into()); }
        } else {
            s.push(piece_letter(piece));
            s.push_str(&disambiguation(board, mv, piece));
        }
        if capture { s.push('x'); }
        s.push_str(&mv.to.to_string());
        if let Some(promo) = mv.promotion {
            s.push('=');
            s.push(piece_letter(promo));
        }
        s
    };
    let mut after = board.clone();
    after.play_unchecked(mv);
    if !after.checkers().is_empty() {
        san.push(if legal_moves(&after).is_empty() { '#' } else { '+' });
    }
    san
}

/// Parses standard algebraic notation. Check marks, annotation glyphs, `x`
/// and `=` are optional, castling may use zeros, and a pawn reaching the
/// last rank without a named piece promotes per [`PROMOTION_FALLBACK`].
pub(crate) fn parse_san(board: &Board, text: &str) -> Result<Move, PositionError> {
    let text = text.trim();
    let bad = || PositionError::BadMoveText(text.to_string());
    let illegal = || PositionError::IllegalMove(text.to_string());
    let body = text.trim_end_matches(|c| matches!(c, '+' | '#' | '!' | '?'));
    let moves = legal_moves(board);

    if let Some(short) = match body {
        "O-O" | "0-0" => Some(true),
        "O-O-O" | "0-0-0" => Some(false),
        _ => None,
    } {
        return moves.into_iter().find(|&m| is_castle(board, m) && is_short_castle(m) == short).ok_or_else(illegal);
    }

    let mut chars: Vec<char> = body.chars().filter(|&c| !matches!(c, 'x' | '-' | '=')).collect();
    let piece = match chars.first() {
        Some(&c) if matches!(c, 'N' | 'B' | 'R' | 'Q' | 'K') => {
            chars.remove(0);
            Piece::try_from(c.to_ascii_lowercase()).map_err(|_| bad())?
        }
        _ => Piece::Pawn,
    };
    let mut promotion = None;
    if piece == Piece::Pawn && chars.len() >= 3 {
        let (last, before) = (chars[chars.len() - 1], chars[chars.len() - 2]);
        if last.is_ascii_alphabetic() && before.is_ascii_digit() {
            promotion = Some(Piece::try_from(last.to_ascii_lowercase()).map_err(|_| bad())?);
            chars.pop();
        }
    }
    if chars.len() < 2 || chars.len() > 4 { return Err(bad()); }
    let split = chars.len() - 2;
    let to: Square = chars[split..].iter().collect::<String>().parse().map_err(|_| bad())?;
    let mut from_file = None;
    let mut from_rank = None;
    for &c in &chars[..split] {
        match c {
            'a'..='h' => from_file = Some(cozy_chess::File::try_from(c).map_err(|_| bad())?),
            '1'..='8' => from_rank = Some(cozy_chess::Rank::try_from(c).map_err(|_| bad())?),
            _ => return Err(bad()),
        }
    }
    // A pawn move without an origin file stays on its file.
    if piece == Piece::Pawn && from_file.is_none() { from_file = Some(to.file()); }

    let matching: Vec<Move> = moves
        .into_iter()
        .filter(|&m| {
            m.to == to
                && board.piece_on(m.from) == Some(piece)
                && !is_castle(board, m)
                && from_file.map_or(true, |f| m.from.file() == f)
                && from_rank.map_or(true, |r| m.from.rank() == r)
        })
        .collect();
    let exact: Vec<Move> = matching.iter().copied().filter(|m| m.promotion == promotion).collect();
    match exact.as_slice() {
        [mv] => Ok(*mv),
        [] if promotion.is_none() => PROMOTION_FALLBACK
            .iter()
            .find_map(|&p| matching.iter().copied().find(|m| m.promotion == Some(p)))
            .ok_or_else(illegal),
        [] => Err(illegal()),
        _ => Err(PositionError::AmbiguousMove(text.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn board(fen: &str) -> Board { Board::from_fen(fen, false).unwrap() }

    fn san_of(fen: &str, uci: &str) -> String {
        let b = board(fen);
        let mv = legal_moves(&b).into_iter().find(|&m| uci_text(&b, m) == uci).unwrap();
        san_text(&b, mv)
    }

    #[test]
    fn renders_pieces_pawns_and_captures() {
        let italian = "r1bqkbnr/pppp1ppp/2n5/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 2 3";
        assert_eq!(san_of(italian, "c4f7"), "Bxf7+");
        assert_eq!(san_of(italian, "f3e5"), "Nxe5");
        assert_eq!(san_of(italian, "d2d4"), "d4");
        assert_eq!(san_of(italian, "e1g1"), "O-O");
        assert_eq!(san_of("4k3/8/8/3p4/4P3/8/8/4K3 w - - 0 1", "e4d5"), "exd5");
    }

    #[test]
    fn renders_disambiguation_promotion_and_mate() {
        assert_eq!(san_of("4k3/8/8/8/8/8/7K/R6R w - - 0 1", "a1d1"), "Rad1");
        assert_eq!(san_of("4k3/8/R7/8/8/8/8/R3K3 w - - 0 1", "a1a3"), "R1a3");
        assert_eq!(san_of("3r3k/4P3/8/8/8/8/8/K7 w - - 0 1", "e7d8q"), "exd8=Q+");
        assert_eq!(san_of("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1", "a1a8"), "Ra8#");
    }

    #[test]
    fn parses_loose_spellings() {
        let b = board("r1bqkbnr/pppp1ppp/2n5/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 2 3");
        assert_eq!(uci_text(&b, parse_san(&b, "Bxf7+").unwrap()), "c4f7");
        assert_eq!(uci_text(&b, parse_san(&b, "Bf7").unwrap()), "c4f7");
        assert_eq!(uci_text(&b, parse_san(&b, "0-0").unwrap()), "e1g1");
        assert_eq!(uci_text(&b, parse_san(&b, "d4").unwrap()), "d2d4");
    }

    #[test]
    fn ambiguous_and_illegal_text_is_rejected() {
        let b = board("4k3/8/8/8/8/8/7K/R6R w - - 0 1");
        assert_eq!(parse_san(&b, "Rd1"), Err(PositionError::AmbiguousMove("Rd1".to_string())));
        assert_eq!(uci_text(&b, parse_san(&b, "Rhd1").unwrap()), "h1d1");
        assert_eq!(parse_san(&b, "Nf3"), Err(PositionError::IllegalMove("Nf3".to_string())));
        assert_eq!(parse_san(&b, "Zz9"), Err(PositionError::BadMoveText("Zz9".to_string())));
    }

    #[test]
    fn bare_promotion_falls_back_to_queen() {
        let b = board("3r3k/4P3/8/8/8/8/8/K7 w - - 0 1");
        assert_eq!(parse_san(&b, "e8").unwrap().promotion, Some(Piece::Queen));
        assert_eq!(parse_san(&b, "e8=N").unwrap().promotion, Some(Piece::Knight));
        assert_eq!(parse_san(&b, "exd8").unwrap().promotion, Some(Piece::Queen));
    }
}
