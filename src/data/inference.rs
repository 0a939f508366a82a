// ============================================================
// Layer 4 — Inference Adapter
// ============================================================
// Encodes a single user sentence and decodes model output ids,
// using the Field and Vocabulary a training run persisted.
//
//   preprocess("Hi!")            fix_length = 5
//     → tokens [hi]
//     → ids    [id(hi), <pad>, <pad>, <pad>, <pad>]
//
//   convert_ids_to_text([id(hello), id(there), <eos>, <pad>, <pad>])
//     → "hello there"
//
// Whether the input is wrapped in <init> … <eos> is read from
// the persisted FieldConfig, never decided here.
//
// Reference: Burn Book §3 (Tensors)

use burn::{prelude::*, tensor::TensorData};

use crate::data::field::{EncodedSequence, TextField};
use crate::data::vocab::{Vocabulary, EOS_IDX};
use crate::domain::error::{PipelineError, Result};

pub struct InferenceAdapter {
    field: TextField,
    vocab: Vocabulary,
}

impl InferenceAdapter {
    /// Pair a Field with the Vocabulary it was saved alongside.
    pub fn new(field: TextField, vocab: Vocabulary) -> Result<Self> {
        if vocab.specials() != field.config().specials {
            return Err(PipelineError::config(format!(
                "vocabulary reserved tokens {:?} differ from field {:?}",
                vocab.specials(),
                field.config().specials
            )));
        }
        Ok(Self { field, vocab })
    }

    pub fn field(&self) -> &TextField {
        &self.field
    }

    pub fn vocab(&self) -> &Vocabulary {
        &self.vocab
    }

    pub fn encode(&self, raw_text: &str) -> EncodedSequence {
        let tokens = self.field.tokenize(raw_text);
        self.field.encode_inference(&tokens, &self.vocab)
    }

    /// Padded id sequence of exactly fix_length ids.
    pub fn preprocess(&self, raw_text: &str) -> Vec<u32> {
        self.encode(raw_text).ids
    }

    /// Same as `preprocess`, shaped [1, fix_length] for a model forward pass.
    pub fn preprocess_tensor<B: Backend>(&self, raw_text: &str, device: &B::Device) -> Tensor<B, 2, Int> {
        let ids: Vec<i32> = self.preprocess(raw_text).into_iter().map(|id| id as i32).collect();
        let len = ids.len();
        Tensor::<B, 2, Int>::from_data(TensorData::new(ids, [1, len]), device)
    }

    /// Map ids back to tokens up to (not including) the first <eos>.
    /// Fails on an id outside the vocabulary.
    pub fn convert_ids_to_text(&self, ids: &[u32]) -> Result<String> {
        let mut words = Vec::new();
        for &id in ids.iter().take_while(|&&id| id != EOS_IDX) {
            let token = self.vocab.denumericalize(id).ok_or(PipelineError::UnknownId(id))?;
            words.push(token);
        }
        Ok(words.join(" "))
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::field::FieldConfig;
    use crate::data::tokenizer::TokenizerConfig;
    use crate::data::vocab::{SpecialTokens, PAD_IDX};
    use burn::backend::NdArray;

    fn adapter(frame_inference: bool) -> InferenceAdapter {
        let field = TextField::new(FieldConfig {
            tokenizer:  TokenizerConfig::default(),
            specials:   SpecialTokens::default(),
            fix_length: 5,
            frame_inference,
        })
        .unwrap();
        let seqs: Vec<Vec<String>> = ["hi", "hello there", "how are you", "good"]
            .iter()
            .map(|s| field.tokenize(s))
            .collect();
        let vocab = Vocabulary::build(&seqs, &SpecialTokens::default(), 1).unwrap();
        InferenceAdapter::new(field, vocab).unwrap()
    }

    #[test]
    fn test_preprocess_pads_without_framing() {
        let a  = adapter(false);
        let hi = a.vocab().numericalize("hi");
        assert_eq!(a.preprocess("Hi!"), vec![hi, PAD_IDX, PAD_IDX, PAD_IDX, PAD_IDX]);
    }

    #[test]
    fn test_preprocess_frames_when_configured() {
        let a  = adapter(true);
        let hi = a.vocab().numericalize("hi");
        assert_eq!(a.preprocess("hi"), vec![2, hi, EOS_IDX, PAD_IDX, PAD_IDX]);
    }

    #[test]
    fn test_convert_ids_stops_at_eos() {
        let a     = adapter(false);
        let hello = a.vocab().numericalize("hello");
        let there = a.vocab().numericalize("there");
        let text  = a
            .convert_ids_to_text(&[hello, there, EOS_IDX, PAD_IDX, PAD_IDX])
            .unwrap();
        assert_eq!(text, "hello there");
    }

    #[test]
    fn test_convert_ids_rejects_out_of_range() {
        let a = adapter(false);
        let bad = a.vocab().len() as u32;
        assert!(matches!(a.convert_ids_to_text(&[bad]), Err(PipelineError::UnknownId(id)) if id == bad));
        // ids after <eos> are never looked at
        assert_eq!(a.convert_ids_to_text(&[EOS_IDX, bad]).unwrap(), "");
    }

    #[test]
    fn test_preprocess_tensor_shape() {
        let a = adapter(false);
        let t = a.preprocess_tensor::<NdArray>("how are you", &Default::default());
        assert_eq!(t.dims(), [1, 5]);
    }
}
