use url::Url;

use crate::config::MarketplaceConfig;
use crate::error::Result;
use crate::records::DatasetKey;

/// Builds card and offers page URLs for dataset keys.
#[derive(Debug, Clone)]
pub struct CardUrls {
    base: String,
    offers_suffix: String,
}

impl CardUrls {
    pub fn new(base: &str, offers_suffix: &str) -> Result<Self> {
        // Reject a malformed base once, up front.
        Url::parse(base)?;
        Ok(Self {
            base: base.trim_end_matches('/').to_string(),
            offers_suffix: offers_suffix.to_string(),
        })
    }

    pub fn from_config(config: &MarketplaceConfig) -> Result<Self> {
        Self::new(&config.base_url, &config.offers_path_suffix)
    }

    /// `<base>/<name>-season-<season>-<card_type>`
    pub fn card_url(&self, key: &DatasetKey) -> Result<Url> {
        let url = Url::parse(&format!("{}/{}", self.base, key.slug()))?;
        Ok(url)
    }

    pub fn offers_url(&self, key: &DatasetKey) -> Result<Url> {
        let url = Url::parse(&format!("{}/{}{}", self.base, key.slug(), self.offers_suffix))?;
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn card_and_offers_urls() {
        let urls = CardUrls::new("https://rules.art/card/", "/offers").unwrap();
        let key = DatasetKey::new("common", 1, "spider-zed");

        assert_eq!(
            urls.card_url(&key).unwrap().as_str(),
            "https://rules.art/card/spider-zed-season-1-common"
        );
        assert_eq!(
            urls.offers_url(&key).unwrap().as_str(),
            "https://rules.art/card/spider-zed-season-1-common/offers"
        );
    }

    #[test]
    fn malformed_base_is_rejected() {
        assert!(CardUrls::new("not a url", "/offers").is_err());
    }
}
