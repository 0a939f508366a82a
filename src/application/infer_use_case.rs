// ============================================================
// Layer 2 — Infer Use Case
// ============================================================
// Rebuilds the training run's numericalization from save_dir
// and encodes / decodes single sentences with it:
//
//   Step 1: Load TEXT.Field + TEXT.Vocab    (Layer 6 - infra)
//   Step 2: Wrap them in InferenceAdapter   (Layer 4 - data)
//   Step 3: encode(text) or decode(ids)
//
// Reference: Rust Book §9 (Error Handling with anyhow)

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::inference::InferenceAdapter;
use crate::infra::artifact_store::ArtifactStore;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferConfig {
    /// Directory a `train` run saved its artifacts to
    pub save_dir: PathBuf,
}

pub struct InferUseCase {
    adapter: InferenceAdapter,
}

impl InferUseCase {
    pub fn new(config: InferConfig) -> Result<Self> {
        let store = ArtifactStore::new(&config.save_dir);
        let (field, vocab) = store
            .load()
            .with_context(|| format!("Cannot load artifacts from '{}'", config.save_dir.display()))?;
        let adapter = InferenceAdapter::new(field, vocab)?;
        Ok(Self { adapter })
    }

    pub fn adapter(&self) -> &InferenceAdapter {
        &self.adapter
    }

    /// Padded ids for `text`, exactly fix_length long.
    pub fn encode(&self, text: &str) -> Vec<u32> {
        let encoded = self.adapter.encode(text);
        if encoded.truncated {
            tracing::warn!(
                "Input longer than fix_length={} was truncated",
                self.adapter.field().fix_length()
            );
        }
        encoded.ids
    }

    pub fn decode(&self, ids: &[u32]) -> Result<String> {
        Ok(self.adapter.convert_ids_to_text(ids)?)
    }
}

/// Parse a comma separated id list such as `5,6,3`.
pub fn parse_ids(raw: &str) -> Result<Vec<u32>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<u32>().with_context(|| format!("'{s}' is not a token id")))
        .collect()
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::field::FieldConfig;
    use crate::data::loader::DataLoaderConfig;
    use crate::data::vocab::{Vocabulary, EOS_IDX, PAD_IDX};
    use crate::domain::error::PipelineError;
    use tempfile::tempdir;

    fn saved_run(dir: &std::path::Path) -> Vocabulary {
        let field: FieldConfig = DataLoaderConfig { fix_length: 5, ..Default::default() }.field_config();
        let seqs: Vec<Vec<String>> = ["hi", "hello there", "how are you", "good"]
            .iter()
            .map(|s| s.split_whitespace().map(String::from).collect())
            .collect();
        let vocab = Vocabulary::build(&seqs, &field.specials, 1).unwrap();
        ArtifactStore::new(dir).save(&field, &vocab).unwrap();
        vocab
    }

    #[test]
    fn test_encode_and_decode_from_saved_artifacts() {
        let dir   = tempdir().unwrap();
        let vocab = saved_run(dir.path());
        let infer = InferUseCase::new(InferConfig { save_dir: dir.path().to_path_buf() }).unwrap();

        let hi = vocab.numericalize("hi");
        assert_eq!(infer.encode("hi"), vec![hi, PAD_IDX, PAD_IDX, PAD_IDX, PAD_IDX]);

        let ids = [vocab.numericalize("hello"), vocab.numericalize("there"), EOS_IDX, PAD_IDX, PAD_IDX];
        assert_eq!(infer.decode(&ids).unwrap(), "hello there");
    }

    #[test]
    fn test_missing_save_dir_is_not_found() {
        let dir = tempdir().unwrap();
        let err = InferUseCase::new(InferConfig { save_dir: dir.path().join("absent") })
            .err()
            .unwrap();
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::ArtifactNotFound(_))
        ));
    }

    #[test]
    fn test_parse_ids() {
        assert_eq!(parse_ids("5, 6,3").unwrap(), vec![5, 6, 3]);
        assert_eq!(parse_ids("").unwrap(), Vec::<u32>::new());
        assert!(parse_ids("5,x").is_err());
    }
}
