pub const MARKETPLACE_CARD_URL: &str = "https://rules.art/card";
pub const OFFERS_PATH_SUFFIX: &str = "/offers";

pub const TITLE_SELECTOR: &str =
    "#__next > main > div:nth-of-type(2) > div:nth-of-type(2) > div:nth-of-type(1) > div:nth-of-type(1)";
pub const SALES_TABLE_SELECTOR: &str = "#__next > main > div:nth-of-type(3)";
pub const OFFERS_TABLE_SELECTOR: &str = "#__next > main > div:nth-of-type(3)";

pub const USER_AGENT: &str = "card-ledger/0.1";

pub const DEFAULT_CONFIG_PATH: &str = "card-ledger.json";
pub const CONFIG_PATH_ENV: &str = "CARD_LEDGER_CONFIG";
pub const STORAGE_ROOT_ENV: &str = "CARD_LEDGER_STORAGE_ROOT";
pub const IMAGE_ROOT_ENV: &str = "CARD_LEDGER_IMAGE_ROOT";

pub const SETTLE_DELAY_MS: u64 = 4_000;
pub const REQUEST_TIMEOUT_SECS: u64 = 30;
pub const ENTITY_TIMEOUT_MARGIN_SECS: u64 = 10;
pub const MAX_RETRIES: u32 = 3;
pub const RETRY_INITIAL_DELAY_MS: u64 = 1_000;
pub const RETRY_MAX_DELAY_MS: u64 = 30_000;

pub const DATASET_EXTENSION: &str = "csv";
pub const OFFERS_SUBDIR: &str = "offers";

pub const CURRENCY_GLYPH: &str = "€";
pub const TREND_COLOR: &str = "#28DED8";
