//! Fit-quality summaries logged with each trained artifact.

use crate::decision::DECISION_THRESHOLD;

pub fn accuracy(probabilities: &[f64], labels: &[f64]) -> f64 {
    if labels.is_empty() {
        return 0.0;
    }
    let hits = probabilities
        .iter()
        .zip(labels)
        .filter(|(p, y)| (**p >= DECISION_THRESHOLD) == (**y == 1.0))
        .count();
    hits as f64 / labels.len() as f64
}

/// Rank-based ROC-AUC (Mann-Whitney U), tied scores get their average rank.
/// Returns 0.5 when either class is absent.
pub fn roc_auc(scores: &[f64], labels: &[f64]) -> f64 {
    let positives = labels.iter().filter(|y| **y == 1.0).count();
    let negatives = labels.len() - positives;
    if positives == 0 || negatives == 0 {
        return 0.5;
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|a, b| scores[*a].total_cmp(&scores[*b]));

    let mut positive_rank_sum = 0.0;
    let mut start = 0;
    while start < order.len() {
        let mut end = start;
        while end + 1 < order.len() && scores[order[end + 1]] == scores[order[start]] {
            end += 1;
        }
        // ranks are 1-based
        let avg_rank = (start + end) as f64 / 2.0 + 1.0;
        for &i in &order[start..=end] {
            if labels[i] == 1.0 {
                positive_rank_sum += avg_rank;
            }
        }
        start = end + 1;
    }

    let p = positives as f64;
    (positive_rank_sum - p * (p + 1.0) / 2.0) / (p * negatives as f64)
}
