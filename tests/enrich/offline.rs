use std::sync::Arc;

use crate::common::{
    client_for, mock_quote, mock_quote_missing, no_retry, setup_server, transaction,
};
use httpmock::Method::GET;
use insider_rank::{EnrichBuilder, EnrichmentStatus, ScreenRecord, Transaction};

#[tokio::test]
async fn market_data_attaches_with_price_diff() {
    let server = setup_server();
    let mock = mock_quote(&server, "AAPL", 110.0, 2.9e12);

    let client = client_for(&server);
    let out = EnrichBuilder::new(&client)
        .records(vec![ScreenRecord::Transaction(transaction("AAPL"))])
        .run()
        .await;

    mock.assert();
    assert!(out.failures.is_empty());
    assert!(out.not_found.is_empty());
    assert!(!out.cancelled);

    let r = &out.records[0];
    assert_eq!(r.enrichment_status, EnrichmentStatus::Ok);
    assert_eq!(r.current_price, Some(110.0));
    assert_eq!(r.market_cap, Some(2.9e12));
    // bought at $100, now $110
    let diff = r.price_diff_pct.unwrap();
    assert!((diff - 0.10).abs() < 1e-12, "got {diff}");
}

#[tokio::test]
async fn each_ticker_is_looked_up_once() {
    let server = setup_server();
    let aapl = mock_quote(&server, "AAPL", 110.0, 2.9e12);
    let msft = mock_quote(&server, "MSFT", 400.0, 3.1e12);

    let client = client_for(&server);
    let out = EnrichBuilder::new(&client)
        .records(vec![
            ScreenRecord::Transaction(transaction("AAPL")),
            ScreenRecord::Transaction(transaction("MSFT")),
            ScreenRecord::Transaction(transaction("AAPL")),
        ])
        .run()
        .await;

    aapl.assert_hits(1);
    msft.assert_hits(1);
    let tickers: Vec<&str> = out.records.iter().map(|r| r.ticker()).collect();
    assert_eq!(tickers, ["AAPL", "MSFT", "AAPL"]);
    assert!(
        out.records
            .iter()
            .all(|r| r.enrichment_status == EnrichmentStatus::Ok)
    );
}

#[tokio::test]
async fn unknown_tickers_are_reported_not_fatal() {
    let server = setup_server();
    let mock = mock_quote_missing(&server, "ZZZZ");

    let client = client_for(&server);
    let out = EnrichBuilder::new(&client)
        .records(vec![ScreenRecord::Transaction(transaction("ZZZZ"))])
        .run()
        .await;

    mock.assert();
    assert_eq!(out.not_found, ["ZZZZ"]);
    assert!(out.failures.is_empty());

    let r = &out.records[0];
    assert_eq!(r.enrichment_status, EnrichmentStatus::NotFound);
    assert_eq!(r.market_cap, None);
    assert_eq!(r.current_price, None);
    assert_eq!(r.price_diff_pct, None);
}

#[tokio::test]
async fn one_failing_ticker_degrades_only_its_records() {
    let server = setup_server();
    let good = mock_quote(&server, "AAPL", 110.0, 2.9e12);
    let bad = server.mock(|when, then| {
        when.method(GET)
            .path("/v7/finance/quote")
            .query_param("symbols", "BBAD");
        then.status(500).body("boom");
    });

    let client = client_for(&server);
    let out = EnrichBuilder::new(&client)
        .records(vec![
            ScreenRecord::Transaction(transaction("AAPL")),
            ScreenRecord::Transaction(transaction("BBAD")),
        ])
        .retry_policy(Some(no_retry()))
        .run()
        .await;

    good.assert();
    bad.assert();
    assert_eq!(out.failures, ["BBAD"]);
    assert!(!out.cancelled);

    assert_eq!(out.records[0].enrichment_status, EnrichmentStatus::Ok);
    assert_eq!(out.records[0].current_price, Some(110.0));
    assert_eq!(
        out.records[1].enrichment_status,
        EnrichmentStatus::PartialFailure
    );
    assert_eq!(out.records[1].market_cap, None);
}

#[tokio::test]
async fn the_client_itself_serves_as_a_lookup_backend() {
    let server = setup_server();
    let mock = mock_quote(&server, "AAPL", 110.0, 2.9e12);

    let client = client_for(&server);
    let out = EnrichBuilder::new(&client)
        .records(vec![ScreenRecord::Transaction(transaction("AAPL"))])
        .quote_lookup(Arc::new(client.clone()))
        .run()
        .await;

    mock.assert();
    assert_eq!(out.records[0].enrichment_status, EnrichmentStatus::Ok);
    assert_eq!(out.records[0].market_cap, Some(2.9e12));
}

#[tokio::test]
async fn price_diff_needs_a_reference_price() {
    let server = setup_server();
    let _mock = mock_quote(&server, "AAPL", 110.0, 2.9e12);

    let unpriced = Transaction {
        price_per_share: None,
        ..transaction("AAPL")
    };
    let client = client_for(&server);
    let out = EnrichBuilder::new(&client)
        .records(vec![ScreenRecord::Transaction(unpriced)])
        .run()
        .await;

    let r = &out.records[0];
    assert_eq!(r.enrichment_status, EnrichmentStatus::Ok);
    assert_eq!(r.current_price, Some(110.0));
    assert_eq!(r.price_diff_pct, None);
}
