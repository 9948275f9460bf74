pub mod models;
pub mod parser;

pub use models::*;
pub use parser::{parse_offers, parse_sales, FromTokens, TableLayout, Traversal};
