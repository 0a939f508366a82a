// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the data side of a training run in order:
//
//   Step 1: Load pair table, build vocab, split (Layer 4 - data)
//   Step 2: Persist TEXT.Field + TEXT.Vocab       (Layer 6 - infra)
//   Step 3: Export tokenizer.json                 (Layer 6 - infra)
//   Step 4: Save config                           (Layer 6 - infra)
//   Step 5: Drive epochs through the batcher      (Layer 4 - data)
//
// Step 5 is where an encoder/decoder training loop plugs in:
// every ChatBatch it builds is exactly what the model consumes.
// Here each batch is materialised as tensors and its statistics
// are appended to metrics.csv.
//
// Reference: Rust Book §13 (Iterators and Closures)
//            Burn Book §4 (Batcher)

use std::path::PathBuf;

use anyhow::{Context, Result};
use burn::backend::{ndarray::NdArrayDevice, NdArray};
use burn::data::dataloader::batcher::Batcher;
use burn::data::dataset::Dataset;
use serde::{Deserialize, Serialize};

use crate::data::batcher::{ChatBatch, ChatBatcher};
use crate::data::bucket::BatchIterator;
use crate::data::dataset::ChatDataset;
use crate::data::loader::{ChatbotDataLoader, DataLoaderConfig};
use crate::infra::{
    artifact_store::ArtifactStore,
    metrics::{BatchStats, EpochMetrics, MetricsLogger},
};

type DataBackend = NdArray;

pub const TRAIN_CONFIG_FILE: &str = "train_config.json";

// ─── Training Configuration ──────────────────────────────────────────────────
// Serialisable so it can be saved next to the artifacts it produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub data_dir: PathBuf,
    pub save_dir: PathBuf,
    pub epochs:   usize,
    pub loader:   DataLoaderConfig,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            save_dir: PathBuf::from("saved"),
            epochs:   1,
            loader:   DataLoaderConfig::default(),
        }
    }
}

/// What one run produced, for the CLI to report.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainSummary {
    pub vocab_size: usize,
    pub epochs:     Vec<EpochMetrics>,
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<TrainSummary> {
        let cfg = &self.config;

        // ── Step 1: Data loader ───────────────────────────────────────────────
        let loader = ChatbotDataLoader::new(&cfg.data_dir, cfg.loader.clone()).with_context(|| {
            format!(
                "Cannot build data loader from '{}'",
                cfg.data_dir.join(&cfg.loader.filename).display()
            )
        })?;
        tracing::info!(
            "vocab_size={} pad={} unk={} init={} eos={}",
            loader.vocab_size(),
            loader.padding_idx(),
            loader.unk_idx(),
            loader.init_idx(),
            loader.eos_idx()
        );

        // ── Step 2: Persist Field + Vocab ─────────────────────────────────────
        let store = ArtifactStore::new(&cfg.save_dir);
        store.save(loader.field().config(), loader.vocab())?;

        // ── Step 3: HuggingFace export ────────────────────────────────────────
        store.export_tokenizer(loader.field().config(), loader.vocab())?;

        // ── Step 4: Save config ───────────────────────────────────────────────
        let config_path = cfg.save_dir.join(TRAIN_CONFIG_FILE);
        std::fs::write(&config_path, serde_json::to_string_pretty(cfg)?)
            .with_context(|| format!("Cannot write '{}'", config_path.display()))?;

        // ── Step 5: Epochs ────────────────────────────────────────────────────
        let batcher = ChatBatcher::<DataBackend>::new(NdArrayDevice::default());
        let metrics = MetricsLogger::new(&cfg.save_dir)?;
        let mut rows = Vec::new();

        for epoch in 1..=cfg.epochs {
            let train = run_epoch(&batcher, loader.train_iter(), epoch, "train");
            metrics.log(&train)?;
            rows.push(train);

            if let Some(valid_iter) = loader.valid_iter() {
                let valid = run_epoch(&batcher, valid_iter, epoch, "valid");
                metrics.log(&valid)?;
                rows.push(valid);
            }
        }

        Ok(TrainSummary { vocab_size: loader.vocab_size(), epochs: rows })
    }
}

/// Push every batch of one epoch through the batcher.
fn run_epoch(
    batcher: &ChatBatcher<DataBackend>,
    iter:    &BatchIterator<ChatDataset>,
    epoch:   usize,
    split:   &str,
) -> EpochMetrics {
    let mut stats = BatchStats::default();

    // epochs are 1-based in logs, 0-based for the shuffle seed
    for batch in iter.epoch(epoch - 1) {
        stats.record(&batch);
        let tensors: ChatBatch<DataBackend> = batcher.batch(batch);
        tracing::trace!("{} batch talk dims {:?}", split, tensors.talk.dims());
    }

    let m = stats.finish(epoch, split);
    tracing::info!(
        "Epoch {} [{}] {} batches, {} / {} examples, padding_ratio={:.4}",
        epoch,
        split,
        m.batches,
        m.examples,
        iter.dataset().len(),
        m.padding_ratio
    );
    m
}
