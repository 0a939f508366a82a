// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// This layer orchestrates all the other layers to accomplish
// one goal per CLI command.
//
// Rules for this layer:
//   - No tokenizing, counting or padding here (that's Layer 4)
//   - No UI or printing here (that's Layer 1)
//   - No direct artifact file access (that's Layer 6)
//   - Only workflow coordination
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

// Corpus → pair table
pub mod preprocess_use_case;

// Pair table → artifacts + batched epochs
pub mod train_use_case;

// Artifacts → encode / decode single inputs
pub mod infer_use_case;
