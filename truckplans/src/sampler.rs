use std::collections::BTreeMap;

use rand::distributions::{Distribution, WeightedIndex};
use rand_xorshift::XorShiftRng;

use crate::{Error, Result};

/// Scale weights to sum to 1. Fails if there are no weights, any weight is negative or not finite,
/// or they sum to zero.
pub fn normalize<I: IntoIterator<Item = f64>>(weights: I) -> Result<Vec<f64>> {
    let weights: Vec<f64> = weights.into_iter().collect();
    if weights.is_empty() {
        return Err(Error::InvalidDistribution("no candidates".to_string()));
    }
    if let Some(bad) = weights.iter().find(|w| !w.is_finite() || **w < 0.0) {
        return Err(Error::InvalidDistribution(format!(
            "weight {} is negative or not finite",
            bad
        )));
    }
    let total: f64 = weights.iter().sum();
    if total <= 0.0 {
        return Err(Error::InvalidDistribution(
            "weights sum to zero".to_string(),
        ));
    }
    Ok(weights.into_iter().map(|w| w / total).collect())
}

/// Draw one key with probability proportional to its weight. The weights are always renormalized
/// first, so callers can pass in vectors that only approximately sum to 1.
pub fn sample_weighted<'a, K>(
    rng: &mut XorShiftRng,
    weights: &'a BTreeMap<K, f64>,
) -> Result<&'a K> {
    let (keys, raw): (Vec<&K>, Vec<f64>) = weights.iter().map(|(k, w)| (k, *w)).unzip();
    let probs = normalize(raw)?;
    let dist =
        WeightedIndex::new(&probs).map_err(|err| Error::InvalidDistribution(err.to_string()))?;
    Ok(keys[dist.sample(rng)])
}
