pub mod apply;
pub mod control;
pub mod r#gen;
pub mod magic;
pub mod perft;
pub mod tables;
pub mod types;
