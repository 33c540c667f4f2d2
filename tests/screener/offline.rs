use std::sync::Arc;

use crate::common::{
    Row, client_for, empty_page, listing_page, mock_listing, no_retry, setup_server,
};
use httpmock::Method::GET;
use insider_rank::{Column, IrError, ScreenerBuilder, StopReason};

#[tokio::test]
async fn fetch_parses_canonical_columns() {
    let server = setup_server();
    let page = listing_page(&[
        Row::default(),
        Row {
            ticker: "MSFT".into(),
            company: "Microsoft Corp".into(),
            insider: "Nadella Satya".into(),
            trade_type: "S - Sale".into(),
            price: "$415.00".into(),
            qty: "-2,500".into(),
            value: "-$1,037,500".into(),
            ..Row::default()
        },
    ]);
    let mock = mock_listing(&server, 1, page);

    let client = client_for(&server);
    let out = ScreenerBuilder::new(&client).fetch().await.unwrap();

    mock.assert();
    assert_eq!(out.pages_fetched, 1);
    assert_eq!(out.stopped_early, None);
    assert_eq!(out.rows.len(), 2);
    assert_eq!(out.rows[0].get(Column::Ticker), Some("AAPL"));
    assert_eq!(out.rows[0].get(Column::TradePrice), Some("$185.20"));
    assert_eq!(out.rows[0].get(Column::Insider), Some("Cook Timothy"));
    assert_eq!(out.rows[1].get(Column::Ticker), Some("MSFT"));
    assert_eq!(out.rows[1].get(Column::TradeType), Some("S - Sale"));
    assert_eq!(out.rows[1].get(Column::OwnershipChangePct), Some("+4%"));
}

#[tokio::test]
async fn empty_mid_page_keeps_prior_rows_without_error() {
    let server = setup_server();
    let m1 = mock_listing(
        &server,
        1,
        listing_page(&[
            Row::default(),
            Row {
                ticker: "NVDA".into(),
                ..Row::default()
            },
        ]),
    );
    let m2 = mock_listing(
        &server,
        2,
        listing_page(&[
            Row {
                ticker: "TSM".into(),
                ..Row::default()
            },
            Row {
                ticker: "AMD".into(),
                ..Row::default()
            },
        ]),
    );
    let m3 = mock_listing(&server, 3, empty_page());

    let client = client_for(&server);
    let out = ScreenerBuilder::new(&client)
        .pages(5)
        .page_delay(std::time::Duration::ZERO)
        .fetch()
        .await
        .unwrap();

    m1.assert();
    m2.assert();
    m3.assert();
    assert_eq!(out.rows.len(), 4);
    assert_eq!(out.pages_fetched, 2);
    assert_eq!(out.stopped_early, Some(StopReason::Exhausted));
}

#[tokio::test]
async fn the_client_itself_serves_as_a_page_source() {
    let server = setup_server();
    let mock = mock_listing(&server, 1, listing_page(&[Row::default()]));

    let client = client_for(&server);
    let out = ScreenerBuilder::new(&client)
        .page_source(Arc::new(client.clone()))
        .fetch()
        .await
        .unwrap();

    mock.assert();
    assert_eq!(out.rows.len(), 1);
    assert_eq!(out.pages_fetched, 1);
}

#[tokio::test]
async fn first_page_failure_aborts_with_source_unavailable() {
    let server = setup_server();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/screener");
        then.status(500).body("boom");
    });

    let client = client_for(&server);
    let err = ScreenerBuilder::new(&client)
        .retry_policy(Some(no_retry()))
        .fetch()
        .await
        .unwrap_err();

    mock.assert();
    match err {
        IrError::SourceUnavailable(msg) => assert!(msg.contains("500")),
        other => panic!("expected SourceUnavailable, got {other:?}"),
    }
}

#[tokio::test]
async fn later_page_failure_keeps_earlier_pages() {
    let server = setup_server();
    let ok = mock_listing(&server, 1, listing_page(&[Row::default()]));
    let fail = server.mock(|when, then| {
        when.method(GET).path("/screener").query_param("page", "2");
        then.status(503).body("unavailable");
    });

    let client = client_for(&server);
    let out = ScreenerBuilder::new(&client)
        .pages(3)
        .page_delay(std::time::Duration::ZERO)
        .retry_policy(Some(no_retry()))
        .fetch()
        .await
        .unwrap();

    ok.assert();
    fail.assert();
    assert_eq!(out.rows.len(), 1);
    assert_eq!(out.pages_fetched, 1);
    assert_eq!(out.stopped_early, Some(StopReason::PageFailure { page: 2 }));
}
