use anyhow::{Context, Result};
use clap::Parser;
use std::time::Instant;
use tactician::perft::perft;
use tactician::Position;

#[derive(Parser, Debug)]
#[command(name = "perft", about = "Perft driver for the tactician position adapter")]
struct Args {
    /// Search depth
    #[arg(value_name = "DEPTH")]
    depth: u32,
    /// FEN string or "startpos"
    #[arg(value_name = "FEN", default_value = "startpos")]
    fen: String,
    /// Print the node count below each root move
    #[arg(long, default_value_t = false)]
    divide: bool,
    /// Report elapsed time and NPS
    #[arg(long, default_value_t = false)]
    nps: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let mut pos = if args.fen == "startpos" {
        Position::startpos()
    } else {
        Position::from_fen(&args.fen).with_context(|| format!("parsing FEN {:?}", args.fen))?
    };

    let t0 = Instant::now();
    let nodes = if args.divide && args.depth > 0 {
        let mut total = 0u64;
        for mv in pos.legal_moves() {
            let text = pos.uci(mv);
            let mut child = pos.make(mv)?;
            let n = perft(&mut child, args.depth - 1)?;
            println!("{text}: {n}");
            total += n;
        }
        total
    } else {
        perft(&mut pos, args.depth)?
    };
    let dt = t0.elapsed().as_secs_f64();

    if args.nps { println!("nodes: {nodes} elapsed: {:.3}s nps: {:.1}", dt, nodes as f64 / dt.max(f64::EPSILON)); }
    else { println!("nodes: {nodes}"); }
    Ok(())
}
