// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the four subcommands and all their configurable
// flags:
//
//   preprocess → train → encode / decode
//
// clap's derive macros automatically generate:
//   - help text (--help)
//   - error messages for missing args
//   - type conversion (string → usize, f64, etc.)
//
// Reference: Rust Book §12 (Building a CLI Program)

use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::application::{
    infer_use_case::InferConfig,
    preprocess_use_case::PreprocessConfig,
    train_use_case::TrainConfig,
};
use crate::data::loader::DataLoaderConfig;
use crate::data::pair_table::DEFAULT_TABLE_NAME;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Parse the Cornell corpus into a (talk, response) pair table
    Preprocess(PreprocessArgs),

    /// Build the vocabulary, save artifacts and run batched epochs
    Train(TrainArgs),

    /// Encode a sentence with a saved vocabulary
    Encode(EncodeArgs),

    /// Decode comma separated ids with a saved vocabulary
    Decode(DecodeArgs),
}

#[derive(Args, Debug)]
pub struct PreprocessArgs {
    /// Directory containing movie_lines.txt and movie_conversations.txt
    #[arg(long)]
    pub corpus_dir: PathBuf,

    /// Output table path [default: <corpus_dir>/formatted_movie_lines.csv]
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Column delimiter; escapes like \t are understood
    #[arg(long, default_value = "\\t")]
    pub delimiter: String,
}

impl From<PreprocessArgs> for PreprocessConfig {
    fn from(a: PreprocessArgs) -> Self {
        PreprocessConfig {
            corpus_dir: a.corpus_dir,
            output:     a.output,
            delimiter:  a.delimiter,
        }
    }
}

/// All arguments for the `train` command.
/// Each field becomes a --flag on the command line.
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Directory holding the pair table
    #[arg(long, default_value = "data")]
    pub data_dir: PathBuf,

    /// Pair table file name inside data_dir
    #[arg(long, default_value = DEFAULT_TABLE_NAME)]
    pub filename: String,

    /// Where TEXT.Field, TEXT.Vocab, tokenizer.json and metrics go
    #[arg(long, default_value = "saved")]
    pub save_dir: PathBuf,

    /// Column delimiter of the pair table
    #[arg(long, default_value = "\\t")]
    pub delimiter: String,

    /// Pairs per batch
    #[arg(long, default_value_t = 64)]
    pub batch_size: usize,

    /// Every sequence is framed, then padded or cut to this many ids
    #[arg(long, default_value_t = 20)]
    pub fix_length: usize,

    /// Drop tokens with at least this many characters
    #[arg(long)]
    pub max_token_len: Option<usize>,

    /// Start-of-sequence token
    #[arg(long, default_value = "<init>")]
    pub init_token: String,

    /// End-of-sequence token
    #[arg(long, default_value = "<eos>")]
    pub eos_token: String,

    /// Tokens seen fewer times map to <unk>
    #[arg(long, default_value_t = 5)]
    pub min_freq: usize,

    /// Keep one fixed bucketing for every epoch
    #[arg(long)]
    pub no_shuffle: bool,

    /// Fraction of pairs held out for validation (0 disables)
    #[arg(long, default_value_t = 0.0)]
    pub validation_split: f64,

    /// Seed for the split and per-epoch shuffling
    #[arg(long, default_value_t = 123)]
    pub seed: u64,

    /// Wrap inference input in <init> … <eos> as well
    #[arg(long)]
    pub frame_inference: bool,

    /// Keep the loaded pair order instead of bucketing (inference batching)
    #[arg(long)]
    pub no_bucketing: bool,

    /// Number of passes over the batches
    #[arg(long, default_value_t = 1)]
    pub epochs: usize,
}

/// Convert CLI TrainArgs into the application-layer TrainConfig.
/// The application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            data_dir: a.data_dir,
            save_dir: a.save_dir,
            epochs:   a.epochs,
            loader:   DataLoaderConfig {
                filename:         a.filename,
                delimiter:        a.delimiter,
                batch_size:       a.batch_size,
                fix_length:       a.fix_length,
                max_token_len:    a.max_token_len,
                init_token:       a.init_token,
                eos_token:        a.eos_token,
                min_freq:         a.min_freq,
                shuffle:          !a.no_shuffle,
                validation_split: a.validation_split,
                seed:             a.seed,
                frame_inference:  a.frame_inference,
                training:         !a.no_bucketing,
            },
        }
    }
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Directory a `train` run saved its artifacts to
    #[arg(long, default_value = "saved")]
    pub save_dir: PathBuf,

    /// The sentence to encode
    #[arg(long)]
    pub text: String,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Directory a `train` run saved its artifacts to
    #[arg(long, default_value = "saved")]
    pub save_dir: PathBuf,

    /// Token ids, e.g. 5,6,3
    #[arg(long)]
    pub ids: String,
}

impl From<&EncodeArgs> for InferConfig {
    fn from(a: &EncodeArgs) -> Self {
        InferConfig { save_dir: a.save_dir.clone() }
    }
}

impl From<&DecodeArgs> for InferConfig {
    fn from(a: &DecodeArgs) -> Self {
        InferConfig { save_dir: a.save_dir.clone() }
    }
}
