pub mod cozy;
pub mod notation;

pub use cozy::{MoveGuard, Position};
