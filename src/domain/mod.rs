// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust structs, traits and the error taxonomy that
// describe the chatbot corpus.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O
//   - Only plain Rust structs, enums, and traits
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

// Utterance and Conversation records from the Cornell corpus
pub mod utterance;

// A (talk, response) pair extracted from a conversation
pub mod dialogue_pair;

// Core abstractions (traits) that other layers implement
pub mod traits;

// PipelineError and the Result alias
pub mod error;
