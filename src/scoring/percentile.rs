//! Average-rank percentile transform shared by every scoring factor.

/// Ranking direction for a factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Direction {
    /// Larger raw values earn higher percentiles.
    HigherIsBetter,
    /// Smaller raw values earn higher percentiles (market cap, recency).
    LowerIsBetter,
}

/// Computes average-rank percentiles in `(0, 100]` for `values`.
///
/// Ties share the mean of the ranks they span. Nulls (and non-finite
/// values) receive the minimum percentile observed among the ranked
/// values, so a missing value is always worst rather than excluded.
///
/// Returns `None` when nothing is rankable, in which case the factor
/// should be left out of the blend entirely.
pub(crate) fn percentile_ranks(values: &[Option<f64>], direction: Direction) -> Option<Vec<f64>> {
    let keyed: Vec<(usize, f64)> = values
        .iter()
        .enumerate()
        .filter_map(|(i, v)| {
            v.and_then(|v| {
                v.is_finite().then_some((
                    i,
                    match direction {
                        Direction::HigherIsBetter => v,
                        Direction::LowerIsBetter => -v,
                    },
                ))
            })
        })
        .collect();
    if keyed.is_empty() {
        return None;
    }

    let mut order: Vec<usize> = (0..keyed.len()).collect();
    order.sort_by(|&a, &b| keyed[a].1.total_cmp(&keyed[b].1));

    let n = keyed.len() as f64;
    let mut pct = vec![0.0f64; values.len()];
    let mut min_pct = f64::INFINITY;
    let mut i = 0;
    while i < order.len() {
        let mut j = i + 1;
        while j < order.len() && keyed[order[j]].1 == keyed[order[i]].1 {
            j += 1;
        }
        // ranks are 1-based; a tie group shares the mean of ranks i+1..=j
        let p = ((i + 1 + j) as f64) / 2.0 / n * 100.0;
        min_pct = min_pct.min(p);
        for &k in &order[i..j] {
            pct[keyed[k].0] = p;
        }
        i = j;
    }

    for (i, v) in values.iter().enumerate() {
        if !v.is_some_and(f64::is_finite) {
            pct[i] = min_pct;
        }
    }
    Some(pct)
}
