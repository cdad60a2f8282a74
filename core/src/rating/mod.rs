//! rating kernel + chronological replay engine (spec §4.1, §4.2)

pub mod kernel;
pub mod replay;
