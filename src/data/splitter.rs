// ============================================================
// Layer 4 — Train/Validation Splitter
// ============================================================
// Splits loaded examples into two sets:
//   - Training set:   fed to the bucketed iterator
//   - Validation set: fed to the ordered iterator
//
// The split is a function of (data, ratio, seed) only:
// validation positions are drawn from a ChaCha permutation
// seeded with `seed`, and both halves keep the loaded order.
// Rerunning with the same seed gives the same partition.
//
// Example with 10 items, validation_split = 0.2:
//   permutation → [7, 2, 5, 0, …]   first 2 → validation {2, 7}
//   train = [0, 1, 3, 4, 5, 6, 8, 9]   valid = [2, 7]
//
// Reference: rand crate documentation (SliceRandom, SeedableRng)

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Split `samples` into (train, validation) with `validation_split` of
/// the items (rounded) going to validation.
///
/// `validation_split` is expected in [0, 1); callers validate it.
pub fn split_train_val<T>(samples: Vec<T>, validation_split: f64, seed: u64) -> (Vec<T>, Vec<T>) {
    let total   = samples.len();
    let n_valid = ((total as f64) * validation_split).round() as usize;
    let n_valid = n_valid.min(total);

    let mut order: Vec<usize> = (0..total).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    order.shuffle(&mut rng);

    let mut is_valid = vec![false; total];
    for &idx in &order[..n_valid] {
        is_valid[idx] = true;
    }

    let mut train = Vec::with_capacity(total - n_valid);
    let mut valid = Vec::with_capacity(n_valid);
    for (idx, sample) in samples.into_iter().enumerate() {
        if is_valid[idx] {
            valid.push(sample);
        } else {
            train.push(sample);
        }
    }

    tracing::debug!(
        "Dataset split: {} training, {} validation ({}% / {}%)",
        train.len(),
        valid.len(),
        (train.len() * 100) / total.max(1),
        (valid.len() * 100) / total.max(1),
    );

    (train, valid)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_correct_split_sizes() {
        let items: Vec<usize> = (0..100).collect();
        let (train, val)      = split_train_val(items, 0.2, 7);
        assert_eq!(train.len(), 80);
        assert_eq!(val.len(),   20);
    }

    #[test]
    fn test_all_items_preserved_in_order() {
        let items: Vec<usize> = (0..50).collect();
        let (train, val)      = split_train_val(items, 0.3, 1);
        assert_eq!(train.len() + val.len(), 50);
        assert!(train.windows(2).all(|w| w[0] < w[1]));
        assert!(val.windows(2).all(|w| w[0] < w[1]));

        let mut all: Vec<usize> = train.iter().chain(val.iter()).copied().collect();
        all.sort();
        assert_eq!(all, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn test_same_seed_same_split() {
        let a = split_train_val((0..40).collect::<Vec<usize>>(), 0.25, 123);
        let b = split_train_val((0..40).collect::<Vec<usize>>(), 0.25, 123);
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_dataset() {
        let items: Vec<usize> = Vec::new();
        let (train, val)      = split_train_val(items, 0.2, 0);
        assert!(train.is_empty());
        assert!(val.is_empty());
    }

    #[test]
    fn test_zero_split_keeps_everything_for_training() {
        let items: Vec<usize> = (0..10).collect();
        let (train, val)      = split_train_val(items, 0.0, 0);
        assert_eq!(train.len(), 10);
        assert!(val.is_empty());
    }
}
