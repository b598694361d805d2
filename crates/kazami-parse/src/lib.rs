//! Best-effort parser for anime release titles as they appear in torrent feeds.
//!
//! Parsing never fails: anything that cannot be identified is left as `None`.

pub mod elements;
pub mod keyword;
pub mod parser;
pub mod tokenizer;

pub use elements::Elements;
pub use parser::parse;
