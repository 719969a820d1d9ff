//! Group-and-sum distribution with "Others" bucketing.

use serde::Serialize;

use super::thresholds::{DISTRIBUTION_TOP_N, OTHERS_LABEL};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionItem {
    pub category: String,
    pub value: f64,
    pub percentage_of_total: f64,
}

/// Rank entities by value and collapse everything beyond `top_n` into one
/// synthesized "Others" bucket. The sort is stable, so entities with equal
/// values keep their original relative order. Percentages (including the
/// Others bucket) sum to 100 up to rounding.
pub fn rank_with_others(items: &[(String, f64)], top_n: usize) -> Vec<DistributionItem> {
    let total: f64 = items.iter().map(|(_, value)| value).sum();
    let percentage = |value: f64| {
        if total > 0.0 {
            value / total * 100.0
        } else {
            0.0
        }
    };

    let mut ranked = items.to_vec();
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    let mut out: Vec<DistributionItem> = Vec::with_capacity(top_n.saturating_add(1));

    if ranked.len() > top_n {
        let rest = ranked.split_off(top_n);
        let others: f64 = rest.into_iter().map(|(_, value)| value).sum();
        out.extend(ranked.into_iter().map(|(category, value)| DistributionItem {
            category,
            value,
            percentage_of_total: percentage(value),
        }));
        out.push(DistributionItem {
            category: OTHERS_LABEL.to_string(),
            value: others,
            percentage_of_total: percentage(others),
        });
    } else {
        out.extend(ranked.into_iter().map(|(category, value)| DistributionItem {
            category,
            value,
            percentage_of_total: percentage(value),
        }));
    }

    out
}

/// Same ranking with the dashboard-wide default top-N.
pub fn rank_top(items: &[(String, f64)]) -> Vec<DistributionItem> {
    rank_with_others(items, DISTRIBUTION_TOP_N)
}
