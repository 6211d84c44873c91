use crate::board::Position;
use crate::error::PositionError;

// Make/unmake perft over the adapter; a wrong node count means a push/pop
// pair did not restore the position.
pub fn perft(pos: &mut Position, depth: u32) -> Result<u64, PositionError> {
    if depth == 0 { return Ok(1); }
    let mut nodes = 0u64;
    for mv in pos.legal_moves() {
        let mut child = pos.make(mv)?;
        nodes += perft(&mut child, depth - 1)?;
    }
    Ok(nodes)
}
