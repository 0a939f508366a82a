// ============================================================
// Layer 4 — Chatbot Data Loader
// ============================================================
// Builds everything the training loop consumes from one pair
// table:
//
//   pair table ──read──▶ DialoguePairs
//                            │ tokenize talk + response
//                            ▼
//                      TokenizedPairs ──▶ Vocabulary (min_freq)
//                            │ frame / pad / numericalize
//                            ▼
//                       ChatExamples
//                            │ split (validation_split, seed)
//                  ┌─────────┴─────────┐
//                  ▼                   ▼
//        train BatchIterator    valid BatchIterator
//          (bucketed)             (sequential)
//
// With `training = false` the train iterator keeps the loaded
// order too, for inference-time batching of a whole table.
//
// The vocabulary is built over the whole table, both columns,
// before the split. A previously persisted vocabulary can be
// supplied instead (`with_vocab`).
//
// Reference: Burn Book §4 (Datasets and Dataloaders)
//            Rust Book §13 (Iterators and Closures)

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::data::bucket::{BatchIterator, BatchOrder};
use crate::data::dataset::{ChatDataset, ChatExample, TokenizedPair};
use crate::data::field::{FieldConfig, TextField};
use crate::data::pair_table::{self, DEFAULT_TABLE_NAME};
use crate::data::splitter::split_train_val;
use crate::data::tokenizer::TokenizerConfig;
use crate::data::vocab::{SpecialTokens, Vocabulary, EOS_IDX, INIT_IDX, PAD_IDX, UNK_IDX};
use crate::domain::error::{PipelineError, Result};

/// Every option the data loader recognises.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataLoaderConfig {
    /// Pair table file name inside the data directory
    pub filename: String,

    /// Pair table delimiter, escape sequences allowed (`\t`)
    pub delimiter: String,

    pub batch_size: usize,

    /// Fixed sentence length after framing and padding
    pub fix_length: usize,

    /// Drop tokens with at least this many characters
    pub max_token_len: Option<usize>,

    pub init_token: String,
    pub eos_token:  String,

    /// Minimum corpus count for a token to get its own id
    pub min_freq: usize,

    /// Re-bucket training batches with a fresh permutation each epoch
    pub shuffle: bool,

    /// Fraction of pairs held out for validation, 0 disables it
    pub validation_split: f64,

    /// Seeds the split and per-epoch shuffling
    pub seed: u64,

    /// Apply <init>/<eos> framing at inference time too
    pub frame_inference: bool,

    /// Bucket the train iterator by length; false keeps loaded order
    pub training: bool,
}

impl Default for DataLoaderConfig {
    fn default() -> Self {
        Self {
            filename:         DEFAULT_TABLE_NAME.to_string(),
            delimiter:        "\\t".to_string(),
            batch_size:       64,
            fix_length:       20,
            max_token_len:    None,
            init_token:       "<init>".to_string(),
            eos_token:        "<eos>".to_string(),
            min_freq:         5,
            shuffle:          true,
            validation_split: 0.0,
            seed:             123,
            frame_inference:  false,
            training:         true,
        }
    }
}

impl DataLoaderConfig {
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(PipelineError::config("batch_size must be at least 1"));
        }
        if self.min_freq == 0 {
            return Err(PipelineError::config("min_freq must be at least 1"));
        }
        let r = self.validation_split;
        if !(r == 0.0 || (r > 0.0 && r < 1.0)) {
            return Err(PipelineError::config(format!(
                "validation_split must be 0 or strictly between 0 and 1, got {r}"
            )));
        }
        if self.max_token_len == Some(0) {
            return Err(PipelineError::config("max_token_len must be at least 1"));
        }
        pair_table::unescape_delimiter(&self.delimiter)?;
        self.field_config().validate()
    }

    /// Tokenizer and framing settings shared with inference.
    pub fn field_config(&self) -> FieldConfig {
        FieldConfig {
            tokenizer: TokenizerConfig {
                lowercase:     true,
                max_token_len: self.max_token_len,
            },
            specials:        SpecialTokens::new(&self.init_token, &self.eos_token),
            fix_length:      self.fix_length,
            frame_inference: self.frame_inference,
        }
    }
}

pub struct ChatbotDataLoader {
    config:     DataLoaderConfig,
    field:      TextField,
    vocab:      Vocabulary,
    train_iter: BatchIterator<ChatDataset>,
    valid_iter: Option<BatchIterator<ChatDataset>>,
}

impl ChatbotDataLoader {
    /// Load `data_dir/config.filename` and build a fresh vocabulary.
    pub fn new(data_dir: impl AsRef<Path>, config: DataLoaderConfig) -> Result<Self> {
        Self::build(data_dir.as_ref(), config, None)
    }

    /// Load the table but numericalize with an existing vocabulary.
    pub fn with_vocab(
        data_dir: impl AsRef<Path>,
        config:   DataLoaderConfig,
        vocab:    Vocabulary,
    ) -> Result<Self> {
        Self::build(data_dir.as_ref(), config, Some(vocab))
    }

    fn build(data_dir: &Path, config: DataLoaderConfig, vocab: Option<Vocabulary>) -> Result<Self> {
        config.validate()?;
        let field     = TextField::new(config.field_config())?;
        let delimiter = pair_table::unescape_delimiter(&config.delimiter)?;
        let path: PathBuf = data_dir.join(&config.filename);

        // ── Step 1: Read and tokenize every pair ──────────────────────────────
        let tokenized: Vec<TokenizedPair> = pair_table::read_pairs(&path, delimiter)?
            .into_iter()
            .map(|pair| TokenizedPair {
                pair_id:  pair.pair_id,
                talk:     field.tokenize(&pair.talk),
                response: field.tokenize(&pair.response),
            })
            .collect();
        tracing::info!("Tokenized {} pairs from '{}'", tokenized.len(), path.display());

        // ── Step 2: Vocabulary over both columns ──────────────────────────────
        let vocab = match vocab {
            Some(vocab) => {
                if vocab.specials() != field.config().specials {
                    return Err(PipelineError::config(format!(
                        "vocabulary reserved tokens {:?} differ from configured {:?}",
                        vocab.specials(),
                        field.config().specials
                    )));
                }
                vocab
            }
            None => Vocabulary::build(
                tokenized
                    .iter()
                    .flat_map(|p| [p.talk.as_slice(), p.response.as_slice()]),
                &field.config().specials,
                config.min_freq,
            )?,
        };

        // ── Step 3: Frame, pad, numericalize ──────────────────────────────────
        let dataset = ChatDataset::encode(&tokenized, &field, &vocab);
        let truncated = dataset.truncated_count();
        if truncated > 0 {
            tracing::info!(
                "{} sequences exceeded fix_length={} and were truncated",
                truncated,
                config.fix_length
            );
        }

        // ── Step 4: Train / validation split ──────────────────────────────────
        let (train_examples, valid_examples) =
            split_train_val(dataset.into_examples(), config.validation_split, config.seed);
        let count_truncated = |examples: &[ChatExample]| -> usize {
            examples
                .iter()
                .map(|e| e.talk.truncated as usize + e.response.truncated as usize)
                .sum()
        };

        let truncated     = count_truncated(&train_examples);
        let train_dataset = ChatDataset::new(train_examples, truncated);
        let train_order = if config.training {
            BatchOrder::Bucketed { shuffle: config.shuffle }
        } else {
            BatchOrder::Sequential
        };
        let train_iter = BatchIterator::new(train_dataset, config.batch_size, train_order, config.seed);

        let valid_iter = if config.validation_split > 0.0 {
            let truncated = count_truncated(&valid_examples);
            Some(BatchIterator::new(
                ChatDataset::new(valid_examples, truncated),
                config.batch_size,
                BatchOrder::Sequential,
                config.seed,
            ))
        } else {
            None
        };

        tracing::info!(
            "Data loader ready: vocab_size={}, {} train batches, {} valid batches",
            vocab.len(),
            train_iter.num_batches(),
            valid_iter.as_ref().map(|v| v.num_batches()).unwrap_or(0)
        );

        Ok(Self { config, field, vocab, train_iter, valid_iter })
    }

    pub fn config(&self) -> &DataLoaderConfig {
        &self.config
    }

    pub fn field(&self) -> &TextField {
        &self.field
    }

    pub fn vocab(&self) -> &Vocabulary {
        &self.vocab
    }

    pub fn vocab_size(&self) -> usize {
        self.vocab.len()
    }

    pub fn padding_idx(&self) -> u32 {
        PAD_IDX
    }

    pub fn unk_idx(&self) -> u32 {
        UNK_IDX
    }

    pub fn init_idx(&self) -> u32 {
        INIT_IDX
    }

    pub fn eos_idx(&self) -> u32 {
        EOS_IDX
    }

    pub fn train_iter(&self) -> &BatchIterator<ChatDataset> {
        &self.train_iter
    }

    pub fn valid_iter(&self) -> Option<&BatchIterator<ChatDataset>> {
        self.valid_iter.as_ref()
    }
}
