use crate::common::{
    Row, client_for, empty_page, listing_page, mock_listing, mock_quote, mock_quote_missing,
    setup_server,
};
use chrono::NaiveDate;
use insider_rank::{EnrichmentStatus, Factor, IrError, PipelineBuilder, WeightProfile};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Two AAPL CEO buys plus one MSFT director buy.
fn three_filings() -> String {
    listing_page(&[
        Row::default(),
        Row {
            insider: "Smith Pat".into(),
            qty: "+2,000".into(),
            value: "+$370,400".into(),
            ..Row::default()
        },
        Row {
            ticker: "MSFT".into(),
            company: "Microsoft Corp.".into(),
            insider: "Nadella Satya".into(),
            title: "Director".into(),
            price: "$400.00".into(),
            qty: "+500".into(),
            value: "+$200,000".into(),
            ..Row::default()
        },
    ])
}

#[tokio::test]
async fn full_run_rolls_up_enriches_and_ranks() {
    let server = setup_server();
    let listing = mock_listing(&server, 1, three_filings());
    let aapl = mock_quote(&server, "AAPL", 190.0, 2.9e12);
    let msft = mock_quote(&server, "MSFT", 410.0, 3.1e12);

    let client = client_for(&server);
    let report = PipelineBuilder::new(&client)
        .profile(
            WeightProfile::new("conviction")
                .weight(Factor::TradeCount, 1.0)
                .weight(Factor::TitleWeightedCount, 1.0),
        )
        .reference_date(date(2026, 8, 23))
        .run()
        .await
        .unwrap();

    listing.assert();
    aapl.assert();
    msft.assert();

    assert_eq!(report.rows_fetched, 3);
    assert_eq!(report.pages_fetched, 1);
    assert_eq!(report.dropped.total(), 0);
    assert_eq!(report.transactions, 3);
    assert_eq!(report.rollups, Some(2));
    assert!(report.enrich_failures.is_empty());
    assert!(!report.cancelled);

    // AAPL: two CEO buys beat MSFT's single director buy on both factors
    assert_eq!(report.results.len(), 2);
    let top = &report.results[0];
    assert_eq!(top.rank, 1);
    assert_eq!(top.record.ticker(), "AAPL");
    assert_eq!(top.record.market_cap, Some(2.9e12));
    assert!((top.final_score - 100.0).abs() < 1e-9);
    assert_eq!(report.results[1].record.ticker(), "MSFT");
}

#[tokio::test]
async fn transaction_mode_ranks_each_filing() {
    let server = setup_server();
    let _listing = mock_listing(&server, 1, three_filings());
    let _aapl = mock_quote(&server, "AAPL", 190.0, 2.9e12);
    let _msft = mock_quote(&server, "MSFT", 410.0, 3.1e12);

    let client = client_for(&server);
    let report = PipelineBuilder::new(&client)
        .rollup(false)
        .profile(WeightProfile::new("size").weight(Factor::TradeValue, 1.0))
        .reference_date(date(2026, 8, 23))
        .run()
        .await
        .unwrap();

    assert_eq!(report.rollups, None);
    assert_eq!(report.transactions, 3);
    assert_eq!(report.results.len(), 3);
    let tickers: Vec<&str> = report.results.iter().map(|r| r.record.ticker()).collect();
    // $370,400 AAPL buy, then the MSFT buy (director multiplier), then the
    // smaller AAPL buy
    assert_eq!(tickers, ["AAPL", "MSFT", "AAPL"]);
}

#[tokio::test]
async fn empty_listing_is_an_error() {
    let server = setup_server();
    let _listing = mock_listing(&server, 1, empty_page());

    let client = client_for(&server);
    let result = PipelineBuilder::new(&client)
        .reference_date(date(2026, 8, 23))
        .run()
        .await;

    assert!(matches!(result, Err(IrError::EmptyRun)));
}

#[tokio::test]
async fn bad_profile_fails_before_any_request() {
    let server = setup_server();
    let listing = mock_listing(&server, 1, three_filings());

    let client = client_for(&server);
    let result = PipelineBuilder::new(&client)
        .profile(WeightProfile::new("bad").weight(Factor::TradeValue, -2.0))
        .run()
        .await;

    listing.assert_hits(0);
    assert!(matches!(result, Err(IrError::Config(_))));
}

#[tokio::test]
async fn unknown_tickers_flow_into_the_report() {
    let server = setup_server();
    let _listing = mock_listing(&server, 1, listing_page(&[Row::default()]));
    let _quote = mock_quote_missing(&server, "AAPL");

    let client = client_for(&server);
    let report = PipelineBuilder::new(&client)
        .profile(WeightProfile::new("size").weight(Factor::TradeValue, 1.0))
        .reference_date(date(2026, 8, 23))
        .run()
        .await
        .unwrap();

    assert_eq!(report.enrich_not_found, ["AAPL"]);
    assert_eq!(report.results.len(), 1);
    assert_eq!(
        report.results[0].record.enrichment_status,
        EnrichmentStatus::NotFound
    );
    assert_eq!(report.results[0].record.market_cap, None);
}

#[tokio::test]
async fn malformed_rows_are_counted_not_fatal() {
    let server = setup_server();
    let _listing = mock_listing(
        &server,
        1,
        listing_page(&[
            Row::default(),
            Row {
                ticker: String::new(),
                ..Row::default()
            },
        ]),
    );
    let _quote = mock_quote(&server, "AAPL", 190.0, 2.9e12);

    let client = client_for(&server);
    let report = PipelineBuilder::new(&client)
        .profile(WeightProfile::new("size").weight(Factor::TradeValue, 1.0))
        .reference_date(date(2026, 8, 23))
        .run()
        .await
        .unwrap();

    assert_eq!(report.rows_fetched, 2);
    assert_eq!(report.dropped.missing_ticker, 1);
    assert_eq!(report.transactions, 1);
    assert_eq!(report.results.len(), 1);
}
