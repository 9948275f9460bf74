use std::fmt;
use std::hash::Hash;

use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Which table a dataset holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Sales,
    Offers,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Sales => "sales",
            RecordKind::Offers => "offers",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scope of one dataset: a single card of one type in one season.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DatasetKey {
    pub card_type: String,
    pub season: u32,
    pub entity_name: String,
}

impl DatasetKey {
    pub fn new(card_type: impl Into<String>, season: u32, entity_name: impl Into<String>) -> Self {
        Self {
            card_type: card_type.into(),
            season,
            entity_name: entity_name.into(),
        }
    }

    /// Marketplace slug, e.g. `zinee-season-1-common`.
    pub fn slug(&self) -> String {
        format!("{}-season-{}-{}", self.entity_name, self.season, self.card_type)
    }
}

impl fmt::Display for DatasetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.card_type, self.season, self.entity_name)
    }
}

/// A completed sale from the card's history table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SaleRecord {
    pub buyer: String,
    pub seller: String,
    pub date: String,
    pub serial_number: u64,
    pub price: Decimal,
}

/// A live offer listed on the card's offers page.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OfferRecord {
    pub seller: String,
    pub serial_number: u64,
    pub price: Decimal,
}

/// Row type that can live in a persisted dataset.
pub trait Record:
    Serialize + DeserializeOwned + Clone + Eq + Hash + Send + Sync + 'static
{
    const KIND: RecordKind;
    /// Header row of the persisted CSV, in field order.
    const FIELDS: &'static [&'static str];

    fn serial_number(&self) -> u64;
    fn price(&self) -> Decimal;
}

impl Record for SaleRecord {
    const KIND: RecordKind = RecordKind::Sales;
    const FIELDS: &'static [&'static str] = &["buyer", "seller", "date", "serial_number", "price"];

    fn serial_number(&self) -> u64 {
        self.serial_number
    }

    fn price(&self) -> Decimal {
        self.price
    }
}

impl Record for OfferRecord {
    const KIND: RecordKind = RecordKind::Offers;
    const FIELDS: &'static [&'static str] = &["seller", "serial_number", "price"];

    fn serial_number(&self) -> u64 {
        self.serial_number
    }

    fn price(&self) -> Decimal {
        self.price
    }
}
