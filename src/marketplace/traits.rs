use async_trait::async_trait;

use crate::error::Result;
use crate::records::RecordKind;

/// Visible text of the two page regions the parser reads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawPage {
    /// Card name shown above the table. Empty when the region is absent.
    pub title: String,
    /// Line-delimited text of the history or offers table.
    pub table_text: String,
}

impl RawPage {
    pub fn new(title: impl Into<String>, table_text: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            table_text: table_text.into(),
        }
    }
}

/// Loads a marketplace page and hands back its raw text regions.
///
/// `kind` selects which table region is read: the sales history on the card
/// page, or the listing table on the offers page.
#[async_trait]
pub trait PageExtractor: Send + Sync {
    async fn fetch(&self, url: &str, kind: RecordKind) -> Result<RawPage>;
}
