pub mod client;
pub mod traits;
pub mod urls;

pub use client::{extract_regions, HttpPageExtractor};
pub use traits::{PageExtractor, RawPage};
pub use urls::CardUrls;
