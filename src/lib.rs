pub mod acceptance;
pub mod doj;
pub mod lit;
pub mod map;
pub mod parse;
pub mod position;
pub mod rule;
