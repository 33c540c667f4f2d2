use std::time::Duration;

use insider_rank::{
    Backoff, CacheMode, Factor, IrClient, PipelineBuilder, RetryConfig, ScreenerQuery,
    WeightProfile,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A client with response caching and a tighter retry budget.
    let client = IrClient::builder()
        .cache_ttl(Duration::from_secs(300))
        .retry_policy(RetryConfig {
            max_retries: 2,
            backoff: Backoff::Fixed(Duration::from_millis(500)),
            ..RetryConfig::default()
        })
        .build()?;

    // Favor clustered conviction buying over raw trade size.
    let profile = WeightProfile::new("cluster-hunter")
        .weight(Factor::ClusterCount, 1.0)
        .weight(Factor::TitleWeightedCount, 0.8)
        .weight(Factor::MarketCap, 0.6)
        .weight(Factor::Recency, 0.5)
        .timing_bonus(true);

    // Filings and trades from the last two weeks.
    let query = ScreenerQuery {
        filing_lookback_days: Some(14),
        trade_lookback_days: Some(14),
        params: Vec::new(),
    };

    let report = PipelineBuilder::new(&client)
        .query(query)
        .pages(3)
        .profile(profile)
        .cache_mode(CacheMode::Use)
        .run()
        .await?;

    println!("--- cluster-hunter: top 5 ---");
    for r in report.results.iter().take(5) {
        let cap = r
            .record
            .market_cap
            .map_or_else(|| "n/a".to_string(), |c| format!("${:.1}B", c / 1e9));
        println!(
            "  #{} {:<6} score {:>6.2}  cap {cap}",
            r.rank,
            r.record.ticker(),
            r.final_score,
        );
    }

    println!("\n--- Factor percentiles for the leader ---");
    if let Some(top) = report.results.first() {
        for (factor, pct) in &top.factor_percentiles {
            println!("  {:<22} {pct:>6.1}", factor.as_str());
        }
    }

    Ok(())
}
