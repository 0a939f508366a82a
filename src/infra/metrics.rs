// ============================================================
// Layer 6 — Batch Metrics Logger
// ============================================================
// Records per-epoch batch statistics to a CSV file.
//
// Metrics recorded per split per epoch:
//   - epoch:         the epoch number (1, 2, 3, ...)
//   - split:         "train" or "valid"
//   - batches:       number of batches produced
//   - examples:      number of (talk, response) pairs seen
//   - padding_ratio: <pad> ids / all ids, both sides
//   - truncated:     sequences cut to fix_length
//
// Output file: {save_dir}/metrics.csv
//
// Example CSV output:
//   epoch,split,batches,examples,padding_ratio,truncated
//   1,train,1342,85888,0.431200,912
//   1,valid,150,9543,0.433900,97
//
// A falling padding_ratio after bucketing is the point of
// sorting batches by length.
//
// Reference: Rust Book §12 (I/O and File Handling)

use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::data::dataset::ChatExample;
use crate::domain::error::{PipelineError, Result};

pub const METRICS_FILE: &str = "metrics.csv";
pub const METRICS_HEADER: &str = "epoch,split,batches,examples,padding_ratio,truncated";

/// One row of the metrics CSV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochMetrics {
    pub epoch: usize,

    pub split: String,

    pub batches: usize,

    pub examples: usize,

    /// Range: [0.0, 1.0]. 0.0 for an empty split
    pub padding_ratio: f64,

    pub truncated: usize,
}

impl EpochMetrics {
    pub fn new(epoch: usize, split: impl Into<String>) -> Self {
        Self {
            epoch,
            split:         split.into(),
            batches:       0,
            examples:      0,
            padding_ratio: 0.0,
            truncated:     0,
        }
    }
}

/// Accumulates one epoch's batches before they become a row.
#[derive(Debug, Default)]
pub struct BatchStats {
    batches:   usize,
    examples:  usize,
    pad_ids:   usize,
    total_ids: usize,
    truncated: usize,
}

impl BatchStats {
    pub fn record(&mut self, batch: &[ChatExample]) {
        self.batches  += 1;
        self.examples += batch.len();
        for e in batch {
            self.pad_ids   += e.padding();
            self.total_ids += e.talk.ids.len() + e.response.ids.len();
            self.truncated += e.talk.truncated as usize + e.response.truncated as usize;
        }
    }

    pub fn finish(&self, epoch: usize, split: &str) -> EpochMetrics {
        let padding_ratio = if self.total_ids == 0 {
            0.0
        } else {
            self.pad_ids as f64 / self.total_ids as f64
        };
        EpochMetrics {
            epoch,
            split: split.to_string(),
            batches: self.batches,
            examples: self.examples,
            padding_ratio,
            truncated: self.truncated,
        }
    }
}

/// Logs epoch metrics to a CSV file for later analysis.
pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Writes the CSV header if the file doesn't exist yet,
    /// so repeated runs append to the same log.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).map_err(|e| PipelineError::io(dir, e))?;

        let csv_path = dir.join(METRICS_FILE);
        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path).map_err(|e| PipelineError::io(&csv_path, e))?;
            writeln!(f, "{METRICS_HEADER}").map_err(|e| PipelineError::io(&csv_path, e))?;
            tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    /// Append one row.
    pub fn log(&self, m: &EpochMetrics) -> Result<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)
            .map_err(|e| PipelineError::io(&self.csv_path, e))?;

        writeln!(
            f,
            "{},{},{},{},{:.6},{}",
            m.epoch, m.split, m.batches, m.examples, m.padding_ratio, m.truncated,
        )
        .map_err(|e| PipelineError::io(&self.csv_path, e))?;

        tracing::debug!(
            "Logged epoch {} {}: {} batches, padding_ratio={:.4}",
            m.epoch,
            m.split,
            m.batches,
            m.padding_ratio,
        );
        Ok(())
    }

    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }
}
