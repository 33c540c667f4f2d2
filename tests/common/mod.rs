#![allow(dead_code)]

use chrono::NaiveDate;
use httpmock::{Method::GET, Mock, MockServer};
use url::Url;

use insider_rank::{InsiderTitle, IrClient, RetryConfig, TradeAction, Transaction};

pub fn setup_server() -> MockServer {
    MockServer::start()
}

/// One listing row, with defaults shaped like a typical screener entry.
/// Override fields with struct-update syntax:
/// `Row { ticker: "MSFT".into(), ..Row::default() }`.
pub struct Row {
    pub filing_date: String,
    pub trade_date: String,
    pub ticker: String,
    pub company: String,
    pub insider: String,
    pub title: String,
    pub trade_type: String,
    pub price: String,
    pub qty: String,
    pub owned: String,
    pub delta_own: String,
    pub value: String,
}

impl Default for Row {
    fn default() -> Self {
        Self {
            filing_date: "2026-08-21 16:05:11".into(),
            trade_date: "2026-08-20".into(),
            ticker: "AAPL".into(),
            company: "Apple Inc.".into(),
            insider: "Cook Timothy".into(),
            title: "CEO".into(),
            trade_type: "P - Purchase".into(),
            price: "$185.20".into(),
            qty: "+1,000".into(),
            owned: "3,280,000".into(),
            delta_own: "+4%".into(),
            value: "+$185,200".into(),
        }
    }
}

impl Row {
    pub fn html(&self) -> String {
        format!(
            "<tr><td><input type=\"checkbox\"></td><td><a href=\"#\">{}</a></td><td>{}</td>\
             <td><b><a href=\"#\">{}</a></b></td><td><a href=\"#\">{}</a></td><td>{}</td>\
             <td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            self.filing_date,
            self.trade_date,
            self.ticker,
            self.company,
            self.insider,
            self.title,
            self.trade_type,
            self.price,
            self.qty,
            self.owned,
            self.delta_own,
            self.value,
        )
    }
}

/// A full listing page wrapping `rows` in the screener's `tinytable` markup.
pub fn listing_page(rows: &[Row]) -> String {
    let body: String = rows.iter().map(Row::html).collect();
    format!(
        "<html><body><div class=\"page\"><table class=\"tinytable\"><thead><tr>\
         <th>X</th><th>Filing&nbsp;Date</th><th>Trade&nbsp;Date</th><th>Ticker</th>\
         <th>Company&nbsp;Name</th><th>Insider&nbsp;Name</th><th>Title</th>\
         <th>Trade&nbsp;Type</th><th>Price</th><th>Qty</th><th>Owned</th>\
         <th>&Delta;Own</th><th>Value</th></tr></thead><tbody>{body}</tbody></table></div></body></html>"
    )
}

/// A page with no recognizable listing table.
pub fn empty_page() -> String {
    "<html><body><h3>Nothing found</h3></body></html>".to_string()
}

pub fn mock_listing<'a>(server: &'a MockServer, page: usize, body: String) -> Mock<'a> {
    server.mock(|when, then| {
        when.method(GET)
            .path("/screener")
            .query_param("page", page.to_string());
        then.status(200)
            .header("content-type", "text/html")
            .body(body);
    })
}

pub fn quote_body(symbol: &str, price: Option<f64>, cap: Option<f64>) -> String {
    serde_json::json!({
        "quoteResponse": {
            "result": [{
                "symbol": symbol,
                "regularMarketPrice": price,
                "marketCap": cap,
            }],
            "error": null,
        }
    })
    .to_string()
}

pub fn mock_quote<'a>(server: &'a MockServer, symbol: &str, price: f64, cap: f64) -> Mock<'a> {
    let body = quote_body(symbol, Some(price), Some(cap));
    server.mock(|when, then| {
        when.method(GET)
            .path("/v7/finance/quote")
            .query_param("symbols", symbol);
        then.status(200)
            .header("content-type", "application/json")
            .body(body);
    })
}

/// The quote API's way of saying "no such symbol": 200 with an empty result.
pub fn mock_quote_missing<'a>(server: &'a MockServer, symbol: &str) -> Mock<'a> {
    server.mock(|when, then| {
        when.method(GET)
            .path("/v7/finance/quote")
            .query_param("symbols", symbol);
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"quoteResponse":{"result":[],"error":null}}"#);
    })
}

/// A client pointed at the mock server for both endpoints.
pub fn client_for(server: &MockServer) -> IrClient {
    IrClient::builder()
        .base_screener(Url::parse(&format!("{}/screener", server.base_url())).unwrap())
        .base_quote(Url::parse(&format!("{}/v7/finance/quote", server.base_url())).unwrap())
        .build()
        .unwrap()
}

pub fn no_retry() -> RetryConfig {
    RetryConfig {
        enabled: false,
        ..RetryConfig::default()
    }
}

/// A qualifying buy at $100/share, for stages past normalization.
pub fn transaction(ticker: &str) -> Transaction {
    Transaction {
        ticker: ticker.into(),
        company: None,
        industry: None,
        insider_name: "Doe Jane".into(),
        title: InsiderTitle::Director,
        trade_date: NaiveDate::from_ymd_opt(2026, 8, 20).unwrap(),
        filing_date: None,
        action: TradeAction::Buy,
        shares: Some(1_000),
        price_per_share: Some(100.0),
        trade_value: Some(100_000.0),
        ownership_change_pct: None,
    }
}
