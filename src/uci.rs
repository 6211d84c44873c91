use cozy_chess::Color;
use log::warn;
use std::io::{self, BufRead, Write};

use crate::board::Position;
use crate::config::SearchConfig;
use crate::search::alphabeta::Searcher;
use crate::search::eval::{is_mate_score, MATE_SCORE};
use crate::search::tt::TranspositionCache;

/// UCI `score` field: centipawns or moves to mate, from the side to move's view.
fn uci_score(white_score: i32, side_to_move: Color) -> String {
    let score = if side_to_move == Color::White { white_score } else { -white_score };
    if is_mate_score(score) {
        let moves = (MATE_SCORE - score.abs() + 1) / 2;
        format!("mate {}", if score > 0 { moves } else { -moves })
    } else {
        format!("cp {score}")
    }
}

pub struct UciEngine {
    pos: Position,
    cache: TranspositionCache,
    config: SearchConfig,
}

impl Default for UciEngine {
    fn default() -> Self { Self::new(SearchConfig::default()) }
}

impl UciEngine {
    pub fn new(config: SearchConfig) -> Self {
        Self { pos: Position::startpos(), cache: TranspositionCache::new(config.cache_mode), config }
    }

    pub fn position(&self) -> &Position { &self.pos }

    fn cmd_uci(&self, out: &mut impl Write) -> io::Result<()> {
        writeln!(out, "id name Tactician {}", env!("CARGO_PKG_VERSION"))?;
        writeln!(out, "id author Tactician Team")?;
        writeln!(out, "uciok")
    }

    fn cmd_ucinewgame(&mut self) {
        self.pos = Position::startpos();
        self.cache.clear();
    }

    fn cmd_position(&mut self, args: &str) {
        // Supports: 'position startpos [moves ...]' and 'position fen <fen> [moves ...]'
        let mut tokens = args.split_whitespace();
        let base = match tokens.next() {
            Some("startpos") => Position::startpos(),
            Some("fen") => {
                let fen_fields: Vec<&str> = tokens.by_ref().take_while(|&t| t != "moves").collect();
                match Position::from_fen(&fen_fields.join(" ")) {
                    Ok(p) => p,
                    Err(e) => { warn!("ignoring position: {e}"); return; }
                }
            }
            other => { warn!("ignoring position with unknown base {other:?}"); return; }
        };
        let moves: Vec<String> = tokens.filter(|&t| t != "moves").map(str::to_string).collect();
        let mut pos = base;
        match pos.apply_uci_moves(&moves) {
            Ok(()) => self.pos = pos,
            Err(e) => warn!("ignoring position: {e}"),
        }
    }

    fn cmd_go(&mut self, args: &str, out: &mut impl Write) -> io::Result<()> {
        let mut depth = self.config.max_depth;
        let mut tokens = args.split_whitespace();
        while let Some(tok) = tokens.next() {
            if tok == "depth" {
                if let Some(d) = tokens.next().and_then(|s| s.parse::<u32>().ok()) { depth = d; }
            }
        }
        let mut searcher = Searcher::new(&mut self.cache, self.config.clone());
        match searcher.best_move(&mut self.pos, depth) {
            Ok(res) => match res.best_move {
                Some(m) => {
                    let score = uci_score(res.score, self.pos.side_to_move());
                    writeln!(out, "info depth {} seldepth {} score {} nodes {}", res.depth, res.max_ply, score, res.nodes)?;
                    writeln!(out, "bestmove {}", self.pos.uci(m))
                }
                None => writeln!(out, "bestmove 0000"),
            },
            Err(e) => {
                warn!("search aborted: {e}");
                writeln!(out, "bestmove 0000")
            }
        }
    }

    pub fn run_loop(&mut self, input: impl BufRead, mut out: impl Write) -> io::Result<()> {
        for line in input.lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() { continue; }
            match line.split_once(' ').map_or((line, ""), |(c, rest)| (c, rest)) {
                ("uci", _) => self.cmd_uci(&mut out)?,
                ("isready", _) => writeln!(out, "readyok")?,
                ("ucinewgame", _) => self.cmd_ucinewgame(),
                ("position", rest) => self.cmd_position(rest),
                ("go", rest) => self.cmd_go(rest, &mut out)?,
                ("stop", _) => {}
                ("quit", _) => break,
                _ => warn!("unknown command: {line}"),
            }
            out.flush()?;
        }
        Ok(())
    }
}
