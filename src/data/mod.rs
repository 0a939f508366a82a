// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// This layer handles everything from the raw Cornell corpus
// files all the way to tensor batches.
//
// The pipeline flows in this order:
//
//   movie_lines.txt + movie_conversations.txt
//       │
//       ▼
//   CornellCorpus     → parses utterances and conversations
//       │
//       ▼
//   pair_table        → (talk, response) pairs, delimited table
//       │
//       ▼
//   Tokenizer         → normalised word tokens
//       │
//       ▼
//   Vocabulary        → token ↔ id, frequency pruned
//       │
//       ▼
//   TextField         → frame, pad/truncate, numericalize
//       │
//       ▼
//   ChatDataset       → implements Burn's Dataset trait
//       │
//       ▼
//   BatchIterator     → bucketed (train) / ordered (valid)
//       │
//       ▼
//   ChatBatcher       → stacks examples into tensor batches
//
// ChatbotDataLoader wires the table → batches half together;
// InferenceAdapter reuses Field + Vocabulary on single inputs.
//
// Reference: Burn Book §4 (Datasets and Dataloaders)
//            Rust Book §13 (Iterators and Closures)

/// Parses the Cornell Movie-Dialogs corpus files
pub mod corpus;

/// Extracts dialogue pairs and reads/writes the pair table
pub mod pair_table;

/// Deterministic text normaliser and word tokenizer
pub mod tokenizer;

/// Frequency-pruned token ↔ id mapping
pub mod vocab;

/// Tokenize, frame, pad and numericalize one sentence
pub mod field;

/// Implements Burn's Dataset trait for encoded pairs
pub mod dataset;

/// Seeded train/validation split
pub mod splitter;

/// Length-bucketed and ordered batch iterators
pub mod bucket;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;

/// Pair table → vocabulary → train/valid batch iterators
pub mod loader;

/// Single-sentence encode / decode for inference
pub mod inference;
