// ============================================================
// Layer 4 — Chat Batcher
// ============================================================
// Implements Burn's Batcher trait to convert a Vec<ChatExample>
// into tensors for an encoder/decoder training loop.
//
// How batching works here:
//   Input:  Vec of N ChatExamples, each side padded to S ids
//   Output: ChatBatch with
//             talk, response                 [N, S]  Int
//             talk_lengths, response_lengths [N]     Int
//
//   Ids are flattened row by row, then reshaped:
//   [e1_t1, e1_t2, ..., e1_tS, e2_t1, ..., eN_tS] → [N, S]
//
// The true lengths are what the training loop uses for packed
// sequences and masked loss.
//
// Reference: Burn Book §4 (Batcher)
//            Rust Book §8 (Vectors)

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
    tensor::TensorData,
};

use crate::data::dataset::ChatExample;
use crate::data::field::EncodedSequence;

// ─── ChatBatch ────────────────────────────────────────────────────────────────
/// A batch of dialogue pairs ready for the model forward pass.
#[derive(Debug, Clone)]
pub struct ChatBatch<B: Backend> {
    /// Prompt ids — shape: [batch_size, fix_length]
    pub talk: Tensor<B, 2, Int>,

    /// Prompt true lengths — shape: [batch_size]
    pub talk_lengths: Tensor<B, 1, Int>,

    /// Reply ids — shape: [batch_size, fix_length]
    pub response: Tensor<B, 2, Int>,

    /// Reply true lengths — shape: [batch_size]
    pub response_lengths: Tensor<B, 1, Int>,
}

// ─── ChatBatcher ──────────────────────────────────────────────────────────────
/// Holds the target device so tensors are created on it.
#[derive(Clone, Debug)]
pub struct ChatBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> ChatBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }

    fn ids_tensor<'a>(
        &self,
        seqs: impl Iterator<Item = &'a EncodedSequence> + Clone,
    ) -> Tensor<B, 2, Int> {
        let rows    = seqs.clone().count();
        let seq_len = seqs.clone().next().map(|s| s.ids.len()).unwrap_or(0);
        let flat: Vec<i32> = seqs
            .flat_map(|s| s.ids.iter().map(|&id| id as i32))
            .collect();

        Tensor::<B, 2, Int>::from_data(TensorData::new(flat, [rows, seq_len]), &self.device)
    }

    fn lengths_tensor<'a>(
        &self,
        seqs: impl Iterator<Item = &'a EncodedSequence>,
    ) -> Tensor<B, 1, Int> {
        let lengths: Vec<i32> = seqs.map(|s| s.length as i32).collect();
        let n = lengths.len();

        Tensor::<B, 1, Int>::from_data(TensorData::new(lengths, [n]), &self.device)
    }
}

// ─── Burn Batcher Trait Implementation ────────────────────────────────────────
impl<B: Backend> Batcher<ChatExample, ChatBatch<B>> for ChatBatcher<B> {
    fn batch(&self, items: Vec<ChatExample>) -> ChatBatch<B> {
        ChatBatch {
            talk:             self.ids_tensor(items.iter().map(|e| &e.talk)),
            talk_lengths:     self.lengths_tensor(items.iter().map(|e| &e.talk)),
            response:         self.ids_tensor(items.iter().map(|e| &e.response)),
            response_lengths: self.lengths_tensor(items.iter().map(|e| &e.response)),
        }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    fn seq(ids: &[u32], length: usize) -> EncodedSequence {
        EncodedSequence { ids: ids.to_vec(), length, truncated: false }
    }

    #[test]
    fn test_batch_shapes_and_values() {
        let batcher = ChatBatcher::<TestBackend>::new(Default::default());
        let items = vec![
            ChatExample { pair_id: 0, talk: seq(&[2, 4, 3, 0], 3), response: seq(&[2, 5, 6, 3], 4) },
            ChatExample { pair_id: 1, talk: seq(&[2, 7, 8, 3], 4), response: seq(&[2, 3, 0, 0], 2) },
        ];

        let batch = batcher.batch(items);

        assert_eq!(batch.talk.dims(), [2, 4]);
        assert_eq!(batch.response.dims(), [2, 4]);
        assert_eq!(batch.talk_lengths.dims(), [2]);

        let talk: Vec<i64> = batch.talk.into_data().iter::<i64>().collect();
        assert_eq!(talk, vec![2, 4, 3, 0, 2, 7, 8, 3]);

        let lengths: Vec<i64> = batch.response_lengths.into_data().iter::<i64>().collect();
        assert_eq!(lengths, vec![4, 2]);
    }
}
