pub mod alphabeta;
pub mod eval;
pub mod ordering;
pub mod qsearch;
pub mod tt;
pub mod zobrist;
