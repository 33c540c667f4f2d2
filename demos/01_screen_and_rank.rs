use insider_rank::{IrClient, PipelineBuilder};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(feature = "tracing-subscriber")]
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let client = IrClient::default();

    // Fetch two screener pages, roll the filings up per ticker, and rank
    // everything with the stock weight profile.
    let report = PipelineBuilder::new(&client).pages(2).run().await?;

    println!("--- Screener Run ---");
    println!(
        "  {} rows over {} pages, {} dropped, {} transactions",
        report.rows_fetched,
        report.pages_fetched,
        report.dropped.total(),
        report.transactions
    );
    if let Some(tickers) = report.rollups {
        println!("  rolled up into {tickers} tickers");
    }
    println!();

    println!("--- Top 10 ---");
    for r in report.results.iter().take(10) {
        println!(
            "  #{:<3} {:<6} {:>7.2}  {}",
            r.rank,
            r.record.ticker(),
            r.final_score,
            r.record.record.company().unwrap_or("-"),
        );
    }

    if !report.enrich_failures.is_empty() {
        println!(
            "\n  market data unavailable for: {}",
            report.enrich_failures.join(", ")
        );
    }

    Ok(())
}
