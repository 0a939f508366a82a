// ============================================================
// Layer 4 — Bucket / Ordered Batch Iterators
// ============================================================
// Groups dataset indices into batches, once per epoch.
//
// Three orders:
//
//   Bucketed, shuffled (training default)
//     1. permute all indices with ChaCha8(seed + epoch)
//     2. cut into pools of batch_size * POOL_BATCHES
//     3. sort each pool by (talk_len, response_len)
//     4. cut pools into batches, then permute the batch order
//
//   Bucketed, unshuffled
//     sort everything by length, cut into batches
//
//   Sequential (validation / inference)
//     loaded order, cut into batches
//
// Inside a bucketed batch, examples are ordered by descending
// talk length. The last batch may be smaller than batch_size.
//
// Iteration is lazy: `epoch(e)` computes the index plan and
// fetches examples from the dataset as batches are pulled.
// The same (seed, epoch) always yields the same batches.
//
// Reference: rand crate documentation
//            Rust Book §13 (Iterators)

use burn::data::dataset::Dataset;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::data::dataset::ChatExample;

/// Batches per sorting pool in shuffled bucketing.
pub const POOL_BATCHES: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchOrder {
    Bucketed { shuffle: bool },
    Sequential,
}

pub struct BatchIterator<D> {
    dataset:    D,
    batch_size: usize,
    order:      BatchOrder,
    seed:       u64,
    keys:       Vec<(usize, usize)>,
}

impl<D: Dataset<ChatExample>> BatchIterator<D> {
    /// `batch_size` must be non-zero; the loader config guarantees it.
    pub fn new(dataset: D, batch_size: usize, order: BatchOrder, seed: u64) -> Self {
        let keys = (0..dataset.len())
            .map(|i| dataset.get(i).map(|e| e.sort_key()).unwrap_or_default())
            .collect();
        Self {
            dataset,
            batch_size: batch_size.max(1),
            order,
            seed,
            keys,
        }
    }

    pub fn dataset(&self) -> &D {
        &self.dataset
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn order(&self) -> BatchOrder {
        self.order
    }

    pub fn num_batches(&self) -> usize {
        self.keys.len().div_ceil(self.batch_size)
    }

    /// Index plan for one epoch.
    pub fn batch_indices(&self, epoch: usize) -> Vec<Vec<usize>> {
        let n = self.keys.len();
        let mut batches: Vec<Vec<usize>> = match self.order {
            BatchOrder::Sequential => {
                let indices: Vec<usize> = (0..n).collect();
                indices.chunks(self.batch_size).map(|c| c.to_vec()).collect()
            }
            BatchOrder::Bucketed { shuffle: false } => {
                let mut indices: Vec<usize> = (0..n).collect();
                indices.sort_by_key(|&i| self.keys[i]);
                indices.chunks(self.batch_size).map(|c| c.to_vec()).collect()
            }
            BatchOrder::Bucketed { shuffle: true } => {
                let mut rng = ChaCha8Rng::seed_from_u64(self.seed.wrapping_add(epoch as u64));
                let mut indices: Vec<usize> = (0..n).collect();
                indices.shuffle(&mut rng);

                let mut batches = Vec::with_capacity(self.num_batches());
                for pool in indices.chunks(self.batch_size * POOL_BATCHES) {
                    let mut pool = pool.to_vec();
                    pool.sort_by_key(|&i| self.keys[i]);
                    batches.extend(pool.chunks(self.batch_size).map(|c| c.to_vec()));
                }
                batches.shuffle(&mut rng);
                batches
            }
        };

        if let BatchOrder::Bucketed { .. } = self.order {
            for batch in &mut batches {
                batch.sort_by(|&a, &b| self.keys[b].0.cmp(&self.keys[a].0));
            }
        }
        batches
    }

    /// Lazily yield the batches of one epoch.
    pub fn epoch(&self, epoch: usize) -> EpochBatches<'_, D> {
        EpochBatches {
            dataset: &self.dataset,
            plan:    self.batch_indices(epoch).into_iter(),
        }
    }
}

pub struct EpochBatches<'a, D> {
    dataset: &'a D,
    plan:    std::vec::IntoIter<Vec<usize>>,
}

impl<'a, D: Dataset<ChatExample>> Iterator for EpochBatches<'a, D> {
    type Item = Vec<ChatExample>;

    fn next(&mut self) -> Option<Self::Item> {
        let indices = self.plan.next()?;
        Some(indices.iter().filter_map(|&i| self.dataset.get(i)).collect())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.plan.size_hint()
    }
}

impl<'a, D: Dataset<ChatExample>> ExactSizeIterator for EpochBatches<'a, D> {}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::dataset::ChatDataset;
    use crate::data::field::EncodedSequence;

    fn example(pair_id: usize, talk_len: usize, response_len: usize) -> ChatExample {
        let seq = |len: usize| EncodedSequence {
            ids:       vec![0; 10],
            length:    len,
            truncated: false,
        };
        ChatExample { pair_id, talk: seq(talk_len), response: seq(response_len) }
    }

    fn dataset(lengths: &[usize]) -> ChatDataset {
        let examples = lengths
            .iter()
            .enumerate()
            .map(|(i, &len)| example(i, len, 2))
            .collect();
        ChatDataset::new(examples, 0)
    }

    fn ids(batches: &[Vec<ChatExample>]) -> Vec<Vec<usize>> {
        batches.iter().map(|b| b.iter().map(|e| e.pair_id).collect()).collect()
    }

    #[test]
    fn test_sequential_keeps_loaded_order() {
        let it = BatchIterator::new(dataset(&[5, 1, 4, 2, 3]), 2, BatchOrder::Sequential, 0);
        let batches: Vec<_> = it.epoch(0).collect();
        assert_eq!(ids(&batches), vec![vec![0, 1], vec![2, 3], vec![4]]);
        assert_eq!(it.num_batches(), 3);
    }

    #[test]
    fn test_unshuffled_bucketing_groups_similar_lengths() {
        let it = BatchIterator::new(
            dataset(&[5, 1, 4, 2, 3, 6]),
            2,
            BatchOrder::Bucketed { shuffle: false },
            0,
        );
        let batches: Vec<_> = it.epoch(0).collect();
        // sorted by length 1,2,3,4,5,6 → (1,3) (4,2) (0,5), longest first inside
        assert_eq!(ids(&batches), vec![vec![3, 1], vec![2, 4], vec![5, 0]]);
    }

    #[test]
    fn test_shuffled_epochs_are_reproducible() {
        let lengths: Vec<usize> = (0..57).map(|i| (i * 7) % 13).collect();
        let a = BatchIterator::new(dataset(&lengths), 4, BatchOrder::Bucketed { shuffle: true }, 9);
        let b = BatchIterator::new(dataset(&lengths), 4, BatchOrder::Bucketed { shuffle: true }, 9);

        assert_eq!(a.batch_indices(3), b.batch_indices(3));
        assert_eq!(a.epoch(3).len(), 15);
    }

    #[test]
    fn test_shuffled_epoch_covers_every_example_once() {
        let lengths: Vec<usize> = (0..31).map(|i| i % 5).collect();
        let it = BatchIterator::new(dataset(&lengths), 4, BatchOrder::Bucketed { shuffle: true }, 1);

        for epoch in 0..3 {
            let plan = it.batch_indices(epoch);
            assert!(plan.iter().all(|b| !b.is_empty() && b.len() <= 4));
            let mut seen: Vec<usize> = plan.into_iter().flatten().collect();
            seen.sort();
            assert_eq!(seen, (0..31).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_bucketed_batches_sorted_by_descending_talk_length() {
        let lengths: Vec<usize> = (0..20).map(|i| (i * 3) % 7).collect();
        let it = BatchIterator::new(dataset(&lengths), 5, BatchOrder::Bucketed { shuffle: true }, 4);
        for batch in it.epoch(0) {
            assert!(batch.windows(2).all(|w| w[0].talk.length >= w[1].talk.length));
        }
    }

    #[test]
    fn test_empty_dataset_yields_no_batches() {
        let it = BatchIterator::new(dataset(&[]), 3, BatchOrder::Bucketed { shuffle: true }, 0);
        assert_eq!(it.epoch(0).count(), 0);
        assert_eq!(it.num_batches(), 0);
    }
}
