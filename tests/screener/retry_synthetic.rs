use crate::common::{client_for, setup_server};
use httpmock::Method::GET;
use insider_rank::{Backoff, IrClient, IrError, RetryConfig, ScreenerBuilder};
use std::time::Duration;
use url::Url;

#[tokio::test]
async fn listing_retries_on_persistent_5xx() {
    let server = setup_server();
    let fail_mock = server.mock(|when, then| {
        when.method(GET).path("/screener");
        then.status(503).body("Service Unavailable");
    });

    let max_retries = 2;
    let retry = RetryConfig {
        max_retries,
        backoff: Backoff::Fixed(Duration::from_millis(1)),
        ..RetryConfig::default()
    };

    let client = client_for(&server);
    let result = ScreenerBuilder::new(&client)
        .retry_policy(Some(retry))
        .fetch()
        .await;

    fail_mock.assert_hits((1 + max_retries) as usize);
    match result {
        Err(IrError::SourceUnavailable(msg)) => assert!(msg.contains("503"), "got: {msg}"),
        other => panic!("expected SourceUnavailable, got {other:?}"),
    }
}

#[tokio::test]
async fn client_level_retry_policy_applies_when_no_override() {
    let server = setup_server();
    let fail_mock = server.mock(|when, then| {
        when.method(GET).path("/screener");
        then.status(502).body("Bad Gateway");
    });

    let retry = RetryConfig {
        max_retries: 1,
        backoff: Backoff::Fixed(Duration::from_millis(1)),
        ..RetryConfig::default()
    };

    let client = IrClient::builder()
        .base_screener(Url::parse(&format!("{}/screener", server.base_url())).unwrap())
        .retry_policy(retry)
        .build()
        .unwrap();

    let result = ScreenerBuilder::new(&client).fetch().await;

    fail_mock.assert_hits(2);
    assert!(result.is_err());
}
