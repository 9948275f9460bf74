//! Positional table parsing for the marketplace's text regions.
//!
//! The page text is a flat list of lines. A [`TableLayout`] says how many lines
//! to drop at each end and how many lines make one row. When the page layout
//! changes, bump the layout constant instead of touching the slicing code.

use std::str::FromStr;

use rust_decimal::Decimal;

use super::models::{OfferRecord, SaleRecord};
use crate::error::{Error, Result};

/// Direction in which groups are cut from the token list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Traversal {
    /// Groups start at the first body token; a short tail is dropped.
    Forward,
    /// Groups end at the last body token; a short head is dropped. Rows come
    /// out last-on-page first.
    Backward,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableLayout {
    pub name: &'static str,
    pub version: u32,
    pub header_tokens: usize,
    pub footer_tokens: usize,
    pub group_size: usize,
    pub traversal: Traversal,
}

pub const SALES_LAYOUT_V1: TableLayout = TableLayout {
    name: "sales",
    version: 1,
    header_tokens: 7,
    footer_tokens: 0,
    group_size: 5,
    traversal: Traversal::Forward,
};

/// seller, serial, price, action label
pub const OFFERS_LAYOUT_V1: TableLayout = TableLayout {
    name: "offers",
    version: 1,
    header_tokens: 4,
    footer_tokens: 0,
    group_size: 4,
    traversal: Traversal::Backward,
};

impl TableLayout {
    /// Body tokens grouped into rows, in traversal order.
    pub fn groups<'a>(&self, tokens: &'a [&'a str]) -> Vec<&'a [&'a str]> {
        if self.group_size == 0 || tokens.len() <= self.header_tokens + self.footer_tokens {
            return Vec::new();
        }
        let body = &tokens[self.header_tokens..tokens.len() - self.footer_tokens];
        match self.traversal {
            Traversal::Forward => body.chunks_exact(self.group_size).collect(),
            Traversal::Backward => body.rchunks_exact(self.group_size).collect(),
        }
    }
}

/// A record that can be built from one row of positional tokens.
pub trait FromTokens: Sized {
    const LAYOUT: TableLayout;

    fn from_tokens(tokens: &[&str]) -> Result<Self>;
}

impl FromTokens for SaleRecord {
    const LAYOUT: TableLayout = SALES_LAYOUT_V1;

    fn from_tokens(tokens: &[&str]) -> Result<Self> {
        match tokens {
            [buyer, seller, date, serial, price] => Ok(Self {
                buyer: buyer.to_string(),
                seller: seller.to_string(),
                date: date.to_string(),
                serial_number: parse_serial(serial)?,
                price: parse_price(price)?,
            }),
            _ => Err(row_arity_error(Self::LAYOUT, tokens.len())),
        }
    }
}

impl FromTokens for OfferRecord {
    const LAYOUT: TableLayout = OFFERS_LAYOUT_V1;

    fn from_tokens(tokens: &[&str]) -> Result<Self> {
        match tokens {
            [seller, serial, price, _action] => Ok(Self {
                seller: seller.to_string(),
                serial_number: parse_serial(serial)?,
                price: parse_price(price)?,
            }),
            _ => Err(row_arity_error(Self::LAYOUT, tokens.len())),
        }
    }
}

fn row_arity_error(layout: TableLayout, got: usize) -> Error {
    Error::Parse(format!(
        "{} layout v{} expects {} tokens per row, got {}",
        layout.name, layout.version, layout.group_size, got
    ))
}

/// Split a text region into trimmed line tokens.
pub fn tokenize(raw: &str) -> Vec<&str> {
    raw.lines().map(str::trim).collect()
}

/// Parse every complete row of `raw` according to `R`'s layout.
pub fn parse_table<R: FromTokens>(raw: &str) -> Result<Vec<R>> {
    let tokens = tokenize(raw);
    R::LAYOUT
        .groups(&tokens)
        .into_iter()
        .enumerate()
        .map(|(row, group)| {
            R::from_tokens(group).map_err(|e| match e {
                Error::Parse(msg) => Error::Parse(format!("{} row {}: {}", R::LAYOUT.name, row, msg)),
                other => other,
            })
        })
        .collect()
}

/// Sales in page order.
pub fn parse_sales(raw: &str) -> Result<Vec<SaleRecord>> {
    parse_table(raw)
}

/// Offers sorted by serial number; ties keep traversal order.
pub fn parse_offers(raw: &str) -> Result<Vec<OfferRecord>> {
    let mut offers: Vec<OfferRecord> = parse_table(raw)?;
    offers.sort_by_key(|o| o.serial_number);
    Ok(offers)
}

/// `"10.50€"` -> `10.50`. Any trailing currency glyph is dropped.
pub fn parse_price(token: &str) -> Result<Decimal> {
    let amount = token
        .trim()
        .trim_end_matches(|c: char| !c.is_ascii_digit())
        .trim();
    let price = Decimal::from_str(amount)
        .map_err(|e| Error::Parse(format!("invalid price {:?}: {}", token, e)))?;
    if price.is_sign_negative() && !price.is_zero() {
        return Err(Error::Parse(format!("negative price {:?}", token)));
    }
    Ok(price)
}

/// `"#12"` -> `12`.
pub fn parse_serial(token: &str) -> Result<u64> {
    let trimmed = token.trim();
    let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);
    digits
        .parse::<u64>()
        .map_err(|e| Error::Parse(format!("invalid serial number {:?}: {}", token, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn header(n: usize) -> String {
        (1..=n).map(|i| format!("h{}\n", i)).collect()
    }

    #[test]
    fn single_sale_after_seven_header_tokens() {
        let raw = format!("{}buyerA\nsellerA\n2024-01-01\n#12\n10.50€", header(7));
        let sales = parse_sales(&raw).unwrap();

        assert_eq!(
            sales,
            vec![SaleRecord {
                buyer: "buyerA".into(),
                seller: "sellerA".into(),
                date: "2024-01-01".into(),
                serial_number: 12,
                price: Decimal::new(1050, 2),
            }]
        );
    }

    #[test]
    fn empty_block_has_no_rows() {
        assert!(parse_sales("").unwrap().is_empty());
        assert!(parse_offers("").unwrap().is_empty());
    }

    #[test]
    fn fewer_tokens_than_one_group_has_no_rows() {
        let raw = format!("{}buyerA\nsellerA\n2024-01-01", header(7));
        assert!(parse_sales(&raw).unwrap().is_empty());
    }

    #[test]
    fn sales_keep_page_order_and_drop_the_short_tail() {
        let raw = format!(
            "{}a\nb\n2024-02-02\n#2\n3€\nc\nd\n2024-01-01\n#1\n2€\ne\nf",
            header(7)
        );
        let sales = parse_sales(&raw).unwrap();

        assert_eq!(sales.len(), 2);
        assert_eq!(sales[0].buyer, "a");
        assert_eq!(sales[1].buyer, "c");
    }

    #[test]
    fn backward_traversal_drops_the_short_head() {
        let tokens = ["x", "s1", "#1", "1€", "Buy", "s2", "#2", "2€", "Buy"];
        let layout = TableLayout {
            header_tokens: 0,
            ..OFFERS_LAYOUT_V1
        };
        let groups = layout.groups(&tokens);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0][0], "s2");
        assert_eq!(groups[1][0], "s1");
    }

    #[test]
    fn offers_are_sorted_by_serial() {
        let raw = format!(
            "{}alice\n#30\n12€\nBuy\nbob\n#4\n9.99€\nBuy\ncarol\n#17\n11€\nBuy",
            header(4)
        );
        let offers = parse_offers(&raw).unwrap();
        let serials: Vec<u64> = offers.iter().map(|o| o.serial_number).collect();

        assert_eq!(serials, vec![4, 17, 30]);
        assert_eq!(offers[0].seller, "bob");
        assert_eq!(offers[0].price, Decimal::new(999, 2));
    }

    #[test]
    fn crlf_and_padding_are_ignored() {
        let raw = format!("{}  buyerA \r\nsellerA\r\n2024-01-01\r\n #7\r\n 3.00 € \r\n", header(7));
        let sales = parse_sales(&raw).unwrap();

        assert_eq!(sales[0].buyer, "buyerA");
        assert_eq!(sales[0].serial_number, 7);
        assert_eq!(sales[0].price.to_string(), "3.00");
    }

    #[test]
    fn unparseable_price_names_the_row() {
        let raw = format!("{}buyerA\nsellerA\n2024-01-01\n#12\nfree", header(7));
        let err = parse_sales(&raw).unwrap_err();

        match err {
            Error::Parse(msg) => assert!(msg.starts_with("sales row 0"), "{}", msg),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn negative_price_is_rejected() {
        assert!(matches!(parse_price("-1.00€"), Err(Error::Parse(_))));
        assert_eq!(parse_price("0€").unwrap(), Decimal::ZERO);
    }

    #[test]
    fn serial_marker_is_optional() {
        assert_eq!(parse_serial("#42").unwrap(), 42);
        assert_eq!(parse_serial("42").unwrap(), 42);
        assert!(parse_serial("#-1").is_err());
        assert!(parse_serial("#").is_err());
    }
}
