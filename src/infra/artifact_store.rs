// ============================================================
// Layer 6 — Artifact Store (Field + Vocabulary persistence)
// ============================================================
// Saves what a separate inference process needs to reproduce
// numericalization exactly, and nothing else:
//
//   save_dir/
//     TEXT.Field       ← tokenizer options, reserved tokens,
//                        fix_length, inference framing
//     TEXT.Vocab       ← id order (itos), min_freq, token counts
//     tokenizer.json   ← HuggingFace WordLevel export (optional)
//
// Both TEXT.* files are pretty JSON with a `format_version`.
// Loading checks, in order:
//   path exists                  else ArtifactNotFound
//   valid JSON with a version    else ArtifactCorrupt
//   version == FORMAT_VERSION    else IncompatibleArtifact
//   expected shape + invariants  else ArtifactCorrupt
//
// Saving overwrites unconditionally.
//
// Reference: serde_json crate documentation
//            HuggingFace tokenizers JSON format

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tokenizers::Tokenizer;

use crate::data::field::{FieldConfig, TextField};
use crate::data::vocab::Vocabulary;
use crate::domain::error::{PipelineError, Result};
use crate::domain::traits::Persistable;

pub const FIELD_FILE: &str = "TEXT.Field";
pub const VOCAB_FILE: &str = "TEXT.Vocab";
pub const TOKENIZER_FILE: &str = "tokenizer.json";

/// Bumped whenever the on-disk layout changes.
pub const FORMAT_VERSION: u32 = 1;

/// Onig pattern for the export normalizer: non-word characters that
/// are not whitespace, so the pre-tokenizer still sees word breaks.
const EXPORT_STRIP_PATTERN: &str = r"[^\w\s]";

// ─── On-disk documents ────────────────────────────────────────────────────────
#[derive(Debug, Serialize, Deserialize)]
struct FieldDocument {
    format_version: u32,
    field:          FieldConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct VocabDocument {
    format_version: u32,
    min_freq:       usize,
    itos:           Vec<String>,
    freqs:          BTreeMap<String, usize>,
}

fn corrupt(path: &Path, message: impl Into<String>) -> PipelineError {
    PipelineError::ArtifactCorrupt { path: path.to_path_buf(), message: message.into() }
}

fn write_json<T: Serialize>(path: &Path, document: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| PipelineError::io(parent, e))?;
    }
    let json = serde_json::to_string_pretty(document).map_err(|e| corrupt(path, e.to_string()))?;
    std::fs::write(path, json).map_err(|e| PipelineError::io(path, e))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => PipelineError::ArtifactNotFound(path.to_path_buf()),
        _ => PipelineError::io(path, e),
    })?;

    let value: serde_json::Value =
        serde_json::from_str(&text).map_err(|e| corrupt(path, e.to_string()))?;
    let found = value
        .get("format_version")
        .and_then(|v| v.as_u64())
        .ok_or_else(|| corrupt(path, "missing format_version"))?;
    if found != FORMAT_VERSION as u64 {
        return Err(PipelineError::IncompatibleArtifact {
            path:     path.to_path_buf(),
            found:    u32::try_from(found).unwrap_or(u32::MAX),
            expected: FORMAT_VERSION,
        });
    }

    serde_json::from_value(value).map_err(|e| corrupt(path, e.to_string()))
}

// ─── Persistable impls ────────────────────────────────────────────────────────
impl Persistable for FieldConfig {
    fn save(&self, path: &Path) -> Result<()> {
        write_json(path, &FieldDocument { format_version: FORMAT_VERSION, field: self.clone() })
    }

    fn load(path: &Path) -> Result<Self> {
        let document: FieldDocument = read_json(path)?;
        document.field.validate().map_err(|e| corrupt(path, e.to_string()))?;
        Ok(document.field)
    }
}

impl Persistable for Vocabulary {
    fn save(&self, path: &Path) -> Result<()> {
        write_json(
            path,
            &VocabDocument {
                format_version: FORMAT_VERSION,
                min_freq:       self.min_freq(),
                itos:           self.itos().to_vec(),
                freqs:          self.freqs().iter().map(|(k, v)| (k.clone(), *v)).collect(),
            },
        )
    }

    fn load(path: &Path) -> Result<Self> {
        let document: VocabDocument = read_json(path)?;
        let freqs: HashMap<String, usize> = document.freqs.into_iter().collect();
        Vocabulary::from_parts(document.itos, freqs, document.min_freq)
            .map_err(|e| corrupt(path, e.to_string()))
    }
}

// ─── ArtifactStore ────────────────────────────────────────────────────────────
/// The set of artifacts under one save directory.
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn field_path(&self) -> PathBuf {
        self.dir.join(FIELD_FILE)
    }

    pub fn vocab_path(&self) -> PathBuf {
        self.dir.join(VOCAB_FILE)
    }

    pub fn tokenizer_path(&self) -> PathBuf {
        self.dir.join(TOKENIZER_FILE)
    }

    /// Write TEXT.Field and TEXT.Vocab.
    pub fn save(&self, field: &FieldConfig, vocab: &Vocabulary) -> Result<()> {
        field.save(&self.field_path())?;
        vocab.save(&self.vocab_path())?;
        tracing::info!(
            "Saved field and vocabulary ({} entries) to '{}'",
            vocab.len(),
            self.dir.display()
        );
        Ok(())
    }

    /// Read both artifacts back and check they belong together.
    pub fn load(&self) -> Result<(TextField, Vocabulary)> {
        let config = FieldConfig::load(&self.field_path())?;
        let vocab  = Vocabulary::load(&self.vocab_path())?;

        if vocab.specials() != config.specials {
            return Err(corrupt(
                &self.vocab_path(),
                format!(
                    "reserved tokens {:?} do not match field {:?}",
                    vocab.specials(),
                    config.specials
                ),
            ));
        }

        let field = TextField::new(config).map_err(|e| corrupt(&self.field_path(), e.to_string()))?;
        tracing::info!(
            "Loaded field (fix_length={}) and vocabulary ({} entries) from '{}'",
            field.fix_length(),
            vocab.len(),
            self.dir.display()
        );
        Ok((field, vocab))
    }

    /// Write a HuggingFace WordLevel tokenizer with the same ids and
    /// reload it through the `tokenizers` crate to prove it parses.
    ///
    /// The export normalises like the native tokenizer but does not
    /// apply the long-token filter. Reserved tokens live only in the
    /// model vocabulary, never as added tokens, so text spelling
    /// `<eos>` is stripped to `eos` exactly as the native path does.
    pub fn export_tokenizer(&self, field: &FieldConfig, vocab: &Vocabulary) -> Result<Tokenizer> {
        let path = self.tokenizer_path();

        let word_ids: serde_json::Map<String, serde_json::Value> = vocab
            .itos()
            .iter()
            .enumerate()
            .map(|(id, token)| (token.clone(), serde_json::json!(id)))
            .collect();

        let mut normalizers = vec![
            serde_json::json!({ "type": "NFC" }),
            serde_json::json!({
                "type":    "Replace",
                "pattern": { "Regex": EXPORT_STRIP_PATTERN },
                "content": ""
            }),
        ];
        if field.tokenizer.lowercase {
            normalizers.push(serde_json::json!({ "type": "Lowercase" }));
        }

        let tokenizer_json = serde_json::json!({
            "version":        "1.0",
            "truncation":     null,
            "padding":        null,
            "added_tokens":   [],
            "normalizer":     { "type": "Sequence", "normalizers": normalizers },
            "pre_tokenizer":  { "type": "WhitespaceSplit" },
            "post_processor": null,
            "decoder":        null,
            "model": {
                "type":      "WordLevel",
                "vocab":     word_ids,
                "unk_token": field.specials.unk
            }
        });

        write_json(&path, &tokenizer_json)?;
        let tokenizer = Tokenizer::from_file(&path).map_err(|e| corrupt(&path, e.to_string()))?;

        tracing::info!("Exported HuggingFace tokenizer to '{}'", path.display());
        Ok(tokenizer)
    }
}
