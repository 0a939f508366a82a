// ============================================================
// Layer 3 — DialoguePair Domain Type
// ============================================================
// One (talk, response) training example: two consecutive
// utterances from the same conversation.
//
// Example:
//   Conversation 0: ["hi", "hello there", "how are you"]
//   Pair 0: (0, 0, "hi",          "hello there")
//   Pair 1: (1, 0, "hello there", "how are you")
//
// pair_id is a dense, zero-based counter over the whole run.
// It is stable only for one preprocessing run.
//
// Reference: Rust Book §5 (Structs)

use serde::{Deserialize, Serialize};

/// A prompt → response example as stored in the pair table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialoguePair {
    pub pair_id: usize,

    /// Index of the source conversation in corpus order
    pub conversation_id: usize,

    /// The prompt side, already whitespace-stripped and non-empty
    pub talk: String,

    /// The reply side, already whitespace-stripped and non-empty
    pub response: String,
}

impl DialoguePair {
    pub fn new(
        pair_id:         usize,
        conversation_id: usize,
        talk:            impl Into<String>,
        response:        impl Into<String>,
    ) -> Self {
        Self {
            pair_id,
            conversation_id,
            talk:     talk.into(),
            response: response.into(),
        }
    }
}
