//! Outlier removal via the generalized extreme Studentized deviate test.
//!
//! Timing data collected in-process is contaminated by warm-up effects,
//! GC pauses, and scheduler jitter. Per node, the k most extreme samples
//! are tested sequentially against a t-distribution-derived critical value
//! (Rosner's method); the final filter keeps every sample inside the valid
//! range established by the confirmed outliers.
//!
//! See: http://www.itl.nist.gov/div898/handbook/eda/section3/eda35h3.htm

use crate::tree::{Measurement, MeasurementTree, MergeableCollection};
use crate::utils::config::ESD_ALPHA;
use log::{debug, warn};
use statrs::distribution::{ContinuousCDF, StudentsT};

/// Produce an isomorphic tree with up to `num_max_outliers` statistical
/// outliers removed from every node's sample collection.
///
/// **Public** - main entry point for outlier cleaning
///
/// Pure transformation: the input tree is never mutated, so it can be
/// reused or re-cleaned with a different configuration. Nodes without data
/// pass through with no data.
///
/// # Arguments
/// * `tree` - finished measurement tree from one or more recording sessions
/// * `num_max_outliers` - upper bound on outliers to test per node
pub fn clean(tree: &MeasurementTree, num_max_outliers: usize) -> MeasurementTree {
    tree.map(&|collection| remove_outliers(collection, num_max_outliers))
}

/// Run the generalized ESD procedure on one node's samples.
///
/// A candidate removed from the working array is only *committed* as an
/// outlier when its test statistic exceeds the critical value; a rejected
/// candidate still shrinks the working array for the next iteration's
/// statistics, but the valid range is left untouched so the sample
/// survives the final filter. This mirrors the reference behavior on
/// purpose; do not "fix" it to a plain percentile cut.
fn remove_outliers(
    collection: &MergeableCollection<Measurement>,
    num_max_outliers: usize,
) -> MergeableCollection<Measurement> {
    let mut xs: Vec<f64> = collection.iter().map(Measurement::total).collect();

    // Not enough data to test: pass through unchanged
    if xs.len() <= num_max_outliers {
        return collection.clone();
    }

    let mut valid_min = min(&xs);
    let mut valid_max = max(&xs);

    for _ in 0..num_max_outliers {
        let n = xs.len();
        // The t-distribution needs n - 2 >= 1 degrees of freedom
        if n < 3 {
            break;
        }

        let avg = mean(&xs);
        let stdev = sample_stdev(avg, &xs);
        let idx = most_outlying_index(avg, &xs);
        let most_outlying = xs[idx];

        let p = 1.0 - ESD_ALPHA / (2.0 * n as f64);
        let tpv = match t_inverse_cdf(p, (n - 2) as f64) {
            Some(tpv) => tpv,
            None => {
                warn!("t-distribution unavailable for {} samples; stopping test", n);
                break;
            }
        };
        let lambda =
            (n as f64 - 1.0) * tpv / (((n as f64 - 2.0 + tpv * tpv) * n as f64).sqrt());

        // The candidate leaves the working array either way
        xs.remove(idx);

        // stdev == 0 means all values are identical: no outlier this step,
        // range unchanged
        if stdev > 0.0 {
            let r = (most_outlying - avg).abs() / stdev;
            if r > lambda {
                valid_min = min(&xs);
                valid_max = max(&xs);
            }
        }
    }

    let cleaned: Vec<Measurement> = collection
        .iter()
        .filter(|m| m.total() >= valid_min && m.total() <= valid_max)
        .copied()
        .collect();

    debug!("removed {} of {} samples", collection.len() - cleaned.len(), collection.len());
    MergeableCollection::from(cleaned)
}

/// Inverse CDF of the Student t-distribution; `None` for degenerate
/// degrees of freedom rather than a crash.
fn t_inverse_cdf(p: f64, degrees_of_freedom: f64) -> Option<f64> {
    let dist = StudentsT::new(0.0, 1.0, degrees_of_freedom).ok()?;
    Some(dist.inverse_cdf(p))
}

fn mean(xs: &[f64]) -> f64 {
    xs.iter().sum::<f64>() / xs.len() as f64
}

/// Sample standard deviation (divisor n - 1)
fn sample_stdev(avg: f64, xs: &[f64]) -> f64 {
    let sum: f64 = xs.iter().map(|x| (x - avg) * (x - avg)).sum();
    (sum / (xs.len() as f64 - 1.0)).sqrt()
}

fn min(xs: &[f64]) -> f64 {
    xs.iter().copied().fold(f64::INFINITY, f64::min)
}

fn max(xs: &[f64]) -> f64 {
    xs.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

/// Index of the element farthest from the mean (first one wins on ties)
fn most_outlying_index(avg: f64, xs: &[f64]) -> usize {
    let mut most_outlying = f64::NEG_INFINITY;
    let mut index = 0;
    for (i, x) in xs.iter().enumerate() {
        let diff = (x - avg).abs();
        if diff > most_outlying {
            most_outlying = diff;
            index = i;
        }
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::MergeableNode;

    fn collection_of(totals: &[f64]) -> MergeableCollection<Measurement> {
        MergeableCollection::from(totals.iter().map(|t| Measurement::new(*t)).collect::<Vec<_>>())
    }

    fn sorted_totals(collection: &MergeableCollection<Measurement>) -> Vec<f64> {
        let mut totals: Vec<f64> = collection.iter().map(Measurement::total).collect();
        totals.sort_by(|a, b| a.partial_cmp(b).unwrap());
        totals
    }

    fn tree_with_leaf(totals: &[f64]) -> MeasurementTree {
        let mut root = MergeableNode::new("root");
        root.ensure_path(["outer", "leaf"])
            .merge_data(collection_of(totals));
        root
    }

    #[test]
    fn test_too_few_samples_pass_through_unchanged() {
        let input = collection_of(&[100.0, 200.0, 300.0]);
        let cleaned = remove_outliers(&input, 5);
        assert_eq!(sorted_totals(&cleaned), sorted_totals(&input));
    }

    #[test]
    fn test_single_extreme_value_is_removed() {
        // Reference vector: the 10000 is the only confirmed outlier
        let input = collection_of(&[100.0, 101.0, 99.0, 102.0, 98.0, 100.0, 10000.0]);
        let cleaned = remove_outliers(&input, 1);

        assert_eq!(cleaned.len(), 6);
        assert_eq!(
            sorted_totals(&cleaned),
            vec![98.0, 99.0, 100.0, 100.0, 101.0, 102.0]
        );
    }

    #[test]
    fn test_tight_data_loses_nothing() {
        // 20 evenly spaced samples in [100, 105): every deviation stays far
        // below the critical value, so both candidates are rejected and the
        // valid range keeps covering all original samples.
        let totals: Vec<f64> = (0..20).map(|i| 100.0 + 0.25 * i as f64).collect();
        let input = collection_of(&totals);

        let cleaned = remove_outliers(&input, 2);
        assert_eq!(cleaned.len(), input.len());
    }

    #[test]
    fn test_zero_variance_is_a_noop() {
        let input = collection_of(&[500.0; 10]);
        let cleaned = remove_outliers(&input, 3);
        assert_eq!(cleaned.len(), 10);
    }

    #[test]
    fn test_rejected_candidate_survives_the_final_filter() {
        // With k = 2 on the reference vector the second candidate (an
        // in-range sample) is removed from the working array but never
        // committed, so the final range still admits it.
        let input = collection_of(&[100.0, 101.0, 99.0, 102.0, 98.0, 100.0, 10000.0]);
        let cleaned = remove_outliers(&input, 2);

        assert_eq!(cleaned.len(), 6);
        assert_eq!(
            sorted_totals(&cleaned),
            vec![98.0, 99.0, 100.0, 100.0, 101.0, 102.0]
        );
    }

    #[test]
    fn test_clean_preserves_tree_structure_and_input() {
        let tree = tree_with_leaf(&[100.0, 101.0, 99.0, 102.0, 98.0, 100.0, 10000.0]);

        let cleaned = clean(&tree, 1);

        assert_eq!(cleaned.count_nodes(), tree.count_nodes());
        assert_eq!(cleaned.name(), "root");
        // Dataless interior nodes pass through with no data
        assert_eq!(cleaned.node_at(["outer"]).unwrap().data(), None);
        assert_eq!(cleaned.node_at(["outer", "leaf"]).unwrap().data().unwrap().len(), 6);
        // Input tree untouched: cleaning is reusable
        assert_eq!(tree.node_at(["outer", "leaf"]).unwrap().data().unwrap().len(), 7);
    }

    #[test]
    fn test_clean_is_idempotent_on_cleaned_data() {
        let tree = tree_with_leaf(&[100.0, 101.0, 99.0, 102.0, 98.0, 100.0, 10000.0]);

        let once = clean(&tree, 1);
        let twice = clean(&once, 1);

        assert_eq!(
            once.node_at(["outer", "leaf"]).unwrap().data().unwrap().len(),
            twice.node_at(["outer", "leaf"]).unwrap().data().unwrap().len()
        );
    }

    #[test]
    fn test_zero_max_outliers_changes_nothing() {
        let input = collection_of(&[1.0, 2.0, 100000.0]);
        let cleaned = remove_outliers(&input, 0);
        assert_eq!(cleaned.len(), 3);
    }
}
