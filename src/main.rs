use anyhow::{bail, Context, Result};
use clap::Parser;
use cozy_chess::{Color, Piece, Rank, File, Square};
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Instant;
use tactician::{uci::UciEngine, Position, SearchConfig, Searcher, TranspositionCache};

#[derive(Parser, Debug)]
#[command(author, version, about = "Play chess against a depth-limited alpha-beta engine", long_about = None)]
struct Args {
    /// JSON file with search settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Maximum iterative-deepening depth (overrides the config file)
    #[arg(long)]
    depth: Option<u32>,

    /// Engine color: 'w' for white, 'b' for black
    #[arg(long, default_value = "b")]
    engine_color: String,

    /// Starting FEN position
    #[arg(long)]
    fen: Option<String>,

    /// Speak UCI on stdin/stdout instead of playing in the terminal
    #[arg(long)]
    uci: bool,
}

fn parse_color(color_str: &str) -> Result<Color> {
    match color_str.to_lowercase().as_str() {
        "w" | "white" => Ok(Color::White),
        "b" | "black" => Ok(Color::Black),
        _ => bail!("Invalid color: use 'w' or 'b'"),
    }
}

fn color_name(color: Color) -> &'static str {
    if color == Color::White { "White" } else { "Black" }
}

fn piece_char(piece: Piece, color: Color) -> char {
    let c = match piece {
        Piece::Pawn => 'p',
        Piece::Knight => 'n',
        Piece::Bishop => 'b',
        Piece::Rook => 'r',
        Piece::Queen => 'q',
        Piece::King => 'k',
    };
    if color == Color::White { c.to_ascii_uppercase() } else { c }
}

fn print_board(pos: &Position) {
    let board = pos.board();
    println!("{}", "=".repeat(40));
    for rank in Rank::ALL.iter().rev() {
        let row: Vec<String> = File::ALL
            .iter()
            .map(|&file| {
                let sq = Square::new(file, *rank);
                match (board.piece_on(sq), board.color_on(sq)) {
                    (Some(p), Some(c)) => piece_char(p, c).to_string(),
                    _ => ".".to_string(),
                }
            })
            .collect();
        println!("{} {}", *rank as u8 + 1, row.join(" "));
    }
    println!("  a b c d e f g h");
    println!("FEN: {}", pos);
    if let Some(last) = pos.last_move_san() {
        let mover = !pos.side_to_move();
        let move_no = if mover == Color::White { pos.fullmove_number() } else { pos.fullmove_number() - 1 };
        println!("Last move: {last} - {} (move {move_no})", color_name(mover));
    }
    println!("To move: {}", color_name(pos.side_to_move()));
    if pos.is_checkmate() {
        println!("Result: Checkmate - {}", pos.result());
    } else if pos.is_stalemate() {
        println!("Result: Stalemate - {}", pos.result());
    } else if pos.is_insufficient_material() {
        println!("Result: Insufficient material - {}", pos.result());
    } else if pos.is_seventyfive_moves() || pos.is_fivefold_repetition() {
        println!("Result: Draw by rule - {}", pos.result());
    } else if pos.is_check() {
        println!("Check to {}", color_name(pos.side_to_move()));
    }
}

fn read_human_move(pos: &Position) -> Result<Option<cozy_chess::Move>> {
    loop {
        print!("Your move (SAN like Nf3, or UCI like g1f3; 'quit' to stop): ");
        io::stdout().flush()?;
        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 { return Ok(None); }
        let input = input.trim();
        if input == "quit" { return Ok(None); }
        match pos.parse_san(input).or_else(|san_err| pos.parse_uci(input).map_err(|_| san_err)) {
            Ok(mv) => return Ok(Some(mv)),
            Err(e) => println!("{e}"),
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => SearchConfig::from_json_file(path).with_context(|| format!("loading {}", path.display()))?,
        None => SearchConfig::default(),
    };
    if let Some(d) = args.depth { config.max_depth = d; }

    if args.uci {
        let mut engine = UciEngine::new(config);
        engine.run_loop(io::stdin().lock(), io::stdout())?;
        return Ok(());
    }

    let engine_color = parse_color(&args.engine_color)?;
    let mut pos = match &args.fen {
        Some(fen) => Position::from_fen(fen)?,
        None => Position::startpos(),
    };
    let mut cache = TranspositionCache::new(config.cache_mode);

    while !pos.is_game_over() {
        print_board(&pos);
        if pos.side_to_move() != engine_color {
            match read_human_move(&pos)? {
                Some(mv) => pos.push(mv)?,
                None => return Ok(()),
            }
            continue;
        }

        let start = Instant::now();
        let mut searcher = Searcher::new(&mut cache, config.clone());
        let res = searcher.choose_move(&mut pos, config.max_depth, engine_color == Color::Black)?;
        let Some(mv) = res.best_move else {
            println!("Engine has no move available");
            break;
        };
        println!(
            "Engine plays: {} ({}) (score {}, depth {}, searched up to ply {}, {} nodes, {:.2}s)",
            pos.san(mv),
            pos.uci(mv),
            res.score,
            res.depth,
            res.max_ply,
            res.nodes,
            start.elapsed().as_secs_f32()
        );
        pos.push(mv)?;
    }

    print_board(&pos);
    println!("Game over: {}", pos.result());
    Ok(())
}
