// ============================================================
// Layer 3 — Utterance and Conversation Domain Types
// ============================================================
// The two record kinds of the Cornell Movie-Dialogs corpus.
//
//   movie_lines.txt          → one Utterance per line
//   movie_conversations.txt  → one Conversation per line
//
// A Conversation does not own its utterances; it lists their
// line ids in spoken order. The id list order is what defines
// adjacency when (talk, response) pairs are extracted.
//
// Reference: Rust Book §5 (Structs and Methods)

use serde::{Deserialize, Serialize};

/// One line of dialogue spoken by one character in one movie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utterance {
    /// Unique key, e.g. "L1045"
    pub line_id: String,

    pub character_id: String,

    pub movie_id: String,

    /// Character name as printed in the script
    pub character_name: String,

    /// Raw utterance text, exactly as read (not yet stripped)
    pub text: String,
}

/// An ordered exchange between two characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub character1_id: String,
    pub character2_id: String,
    pub movie_id:      String,

    /// Line ids in the order they were spoken
    pub utterance_ids: Vec<String>,
}

impl Conversation {
    /// Number of adjacent (i, i+1) positions in this conversation.
    /// The final utterance never acts as a talk.
    pub fn adjacent_positions(&self) -> usize {
        self.utterance_ids.len().saturating_sub(1)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn conversation(ids: &[&str]) -> Conversation {
        Conversation {
            character1_id: "u0".into(),
            character2_id: "u2".into(),
            movie_id:      "m0".into(),
            utterance_ids: ids.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_adjacent_positions() {
        assert_eq!(conversation(&["L1", "L2", "L3"]).adjacent_positions(), 2);
        assert_eq!(conversation(&["L1"]).adjacent_positions(), 0);
        assert_eq!(conversation(&[]).adjacent_positions(), 0);
    }
}
