pub(crate) const USER_AGENT: &str = concat!(
    "Mozilla/5.0 (X11; Linux x86_64) ",
    "AppleWebKit/537.36 (KHTML, like Gecko) ",
    "Chrome/122.0.0.0 Safari/537.36"
);

pub(crate) const DEFAULT_BASE_SCREENER: &str = "http://openinsider.com/screener";
pub(crate) const DEFAULT_BASE_QUOTE: &str = "https://query1.finance.yahoo.com/v7/finance/quote";
