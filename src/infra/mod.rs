// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Handles the cross-cutting concerns that don't belong in
// any specific business layer:
//
//   artifact_store.rs — Field / Vocabulary persistence
//                       Writes TEXT.Field and TEXT.Vocab as
//                       versioned JSON so a separate inference
//                       process numericalizes exactly like
//                       training did. Also exports a
//                       HuggingFace tokenizer.json.
//
//   metrics.rs        — Batch statistics logging
//                       Appends per-epoch batch counts and
//                       padding ratios to a CSV file.
//
// Reference: Rust Book §7 (Modules)
//            Rust Book §12 (I/O and File Handling)

/// TEXT.Field / TEXT.Vocab persistence and tokenizer export
pub mod artifact_store;

/// Per-epoch batch statistics CSV logger
pub mod metrics;
