// ============================================================
// Layer 2 — PreprocessUseCase
// ============================================================
// Turns the raw Cornell corpus into the pair table:
//
//   Step 1: Parse movie_lines / movie_conversations (Layer 4 - data)
//   Step 2: Extract adjacent (talk, response) pairs (Layer 4 - data)
//   Step 3: Write the delimited pair table          (Layer 4 - data)
//   Step 4: Echo the head of the table at debug level
//
// Any parse failure aborts before the table is written, so a
// failed run never leaves a partial table behind.
//
// Reference: Rust Book §9 (Error Handling with anyhow)

use std::io::{BufRead, BufReader};
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::corpus::CornellCorpus;
use crate::data::pair_table::{self, DEFAULT_TABLE_NAME};
use crate::domain::traits::CorpusSource;

/// Lines of the written table echoed to the debug log.
const PREVIEW_LINES: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreprocessConfig {
    /// Directory holding movie_lines.txt and movie_conversations.txt
    pub corpus_dir: PathBuf,

    /// Pair table path, defaults to {corpus_dir}/formatted_movie_lines.csv
    pub output: Option<PathBuf>,

    /// Column delimiter, escape sequences allowed
    pub delimiter: String,
}

impl PreprocessConfig {
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| self.corpus_dir.join(DEFAULT_TABLE_NAME))
    }
}

/// What a preprocessing run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct PreprocessSummary {
    pub output: PathBuf,
    pub pairs:  usize,
}

pub struct PreprocessUseCase {
    config: PreprocessConfig,
}

impl PreprocessUseCase {
    pub fn new(config: PreprocessConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<PreprocessSummary> {
        let cfg       = &self.config;
        let delimiter = pair_table::unescape_delimiter(&cfg.delimiter)?;
        let output    = cfg.output_path();

        // ── Step 1: Parse the corpus ──────────────────────────────────────────
        tracing::info!("Parsing Cornell corpus in '{}'", cfg.corpus_dir.display());
        let corpus = CornellCorpus::new(&cfg.corpus_dir)
            .load()
            .with_context(|| format!("Cannot parse corpus in '{}'", cfg.corpus_dir.display()))?;

        // ── Step 2: Extract pairs ─────────────────────────────────────────────
        let pairs = pair_table::extract_pairs(&corpus)?;

        // ── Step 3: Write the table ───────────────────────────────────────────
        pair_table::write_pairs(&output, &pairs, delimiter)
            .with_context(|| format!("Cannot write pair table '{}'", output.display()))?;

        // ── Step 4: Preview ───────────────────────────────────────────────────
        if tracing::enabled!(tracing::Level::DEBUG) {
            let file = std::fs::File::open(&output)?;
            for line in BufReader::new(file).lines().take(PREVIEW_LINES) {
                tracing::debug!("{}", line?);
            }
        }

        Ok(PreprocessSummary { output, pairs: pairs.len() })
    }
}
