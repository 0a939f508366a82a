// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The seams between layers:
//
//   CorpusSource — anything that yields the conversation graph
//                  (CornellCorpus reads the two .txt files)
//   Persistable  — anything written once as an artifact and
//                  read back by a separate process
//                  (FieldArtifact, Vocabulary)
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use std::collections::HashMap;
use std::path::Path;

use crate::domain::error::Result;
use crate::domain::utterance::{Conversation, Utterance};

/// A parsed corpus: utterances keyed by line id, plus conversations
/// in file order.
#[derive(Debug, Clone, Default)]
pub struct ParsedCorpus {
    pub utterances:    HashMap<String, Utterance>,
    pub conversations: Vec<Conversation>,
}

// ─── CorpusSource ─────────────────────────────────────────────────────────────
/// Any component that can produce the conversation graph.
pub trait CorpusSource {
    /// Load every utterance and conversation. Fails on the first
    /// malformed record; there is no partial-corpus recovery.
    fn load(&self) -> Result<ParsedCorpus>;
}

// ─── Persistable ──────────────────────────────────────────────────────────────
/// Any component whose state is saved to disk as a single artifact.
pub trait Persistable: Sized {
    /// Write the artifact, overwriting whatever is at `path`.
    fn save(&self, path: &Path) -> Result<()>;

    /// Read the artifact back.
    /// Missing path → ArtifactNotFound, bad shape → ArtifactCorrupt.
    fn load(path: &Path) -> Result<Self>;
}
