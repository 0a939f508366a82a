// ============================================================
// Layer 4 — Cornell Corpus Parser
// ============================================================
// Reads the two record files of the Cornell Movie-Dialogs corpus
// and rebuilds the conversation graph.
//
// File format (one record per line, ISO-8859-1 encoded):
//
//   movie_lines.txt
//     L1045 +++$+++ u0 +++$+++ m0 +++$+++ BIANCA +++$+++ They do not!
//     └ line_id     └ char_id  └ movie    └ name         └ text
//
//   movie_conversations.txt
//     u0 +++$+++ u2 +++$+++ m0 +++$+++ ['L194', 'L195', 'L196']
//     └ char1     └ char2    └ movie    └ utterance ids
//
// The utterance id field only looks like a list. The ids are
// recovered by matching `L` followed by digits, in order.
//
// ISO-8859-1 maps every byte to the code point of the same
// value, so decoding is a plain byte → char conversion.
//
// Reference: regex crate documentation
//            Rust Book §8 (Strings), §9 (Error Handling)

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;

use crate::domain::error::{PipelineError, Result};
use crate::domain::traits::{CorpusSource, ParsedCorpus};
use crate::domain::utterance::{Conversation, Utterance};

/// Field separator shared by both corpus files.
pub const FIELD_SEPARATOR: &str = " +++$+++ ";

pub const LINES_FILE: &str = "movie_lines.txt";
pub const CONVERSATIONS_FILE: &str = "movie_conversations.txt";

const LINE_FIELDS: usize = 5;
const CONVERSATION_FIELDS: usize = 4;
const UTTERANCE_ID_PATTERN: &str = r"L[0-9]+";

/// Loads the Cornell corpus from a directory holding both record files.
/// Implements the CorpusSource trait from Layer 3.
pub struct CornellCorpus {
    dir: PathBuf,
}

impl CornellCorpus {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Parse movie_lines.txt into a table keyed by line id.
    pub fn load_utterances(&self) -> Result<HashMap<String, Utterance>> {
        let path = self.dir.join(LINES_FILE);
        let mut utterances = HashMap::new();

        for (line_no, line) in read_latin1_lines(&path)? {
            let fields = split_record(&path, line_no, &line, LINE_FIELDS)?;
            let utterance = Utterance {
                line_id:        fields[0].to_string(),
                character_id:   fields[1].to_string(),
                movie_id:       fields[2].to_string(),
                character_name: fields[3].to_string(),
                text:           fields[4].to_string(),
            };

            if let Some(previous) = utterances.insert(utterance.line_id.clone(), utterance) {
                tracing::warn!(
                    "Duplicate line id '{}' at {}:{}, keeping the later record",
                    previous.line_id,
                    path.display(),
                    line_no
                );
            }
        }

        tracing::debug!("Parsed {} utterances from '{}'", utterances.len(), path.display());
        Ok(utterances)
    }

    /// Parse movie_conversations.txt into conversations in file order.
    pub fn load_conversations(&self) -> Result<Vec<Conversation>> {
        let path = self.dir.join(CONVERSATIONS_FILE);
        let id_pattern = Regex::new(UTTERANCE_ID_PATTERN)
            .map_err(|e| PipelineError::config(format!("utterance id pattern: {e}")))?;

        let mut conversations = Vec::new();
        for (line_no, line) in read_latin1_lines(&path)? {
            let fields = split_record(&path, line_no, &line, CONVERSATION_FIELDS)?;
            let utterance_ids = id_pattern
                .find_iter(fields[3])
                .map(|m| m.as_str().to_string())
                .collect();

            conversations.push(Conversation {
                character1_id: fields[0].to_string(),
                character2_id: fields[1].to_string(),
                movie_id:      fields[2].to_string(),
                utterance_ids,
            });
        }

        tracing::debug!(
            "Parsed {} conversations from '{}'",
            conversations.len(),
            path.display()
        );
        Ok(conversations)
    }
}

impl CorpusSource for CornellCorpus {
    fn load(&self) -> Result<ParsedCorpus> {
        let utterances    = self.load_utterances()?;
        let conversations = self.load_conversations()?;

        // Every referenced id must resolve before anything is emitted
        for (idx, conversation) in conversations.iter().enumerate() {
            if let Some(missing) = conversation
                .utterance_ids
                .iter()
                .find(|id| !utterances.contains_key(id.as_str()))
            {
                return Err(PipelineError::MissingUtterance {
                    conversation: idx,
                    line_id:      missing.clone(),
                });
            }
        }

        tracing::info!(
            "Loaded corpus: {} utterances, {} conversations",
            utterances.len(),
            conversations.len()
        );
        Ok(ParsedCorpus { utterances, conversations })
    }
}

/// Read a file as ISO-8859-1 and return its non-blank lines with
/// 1-based line numbers. Line terminators are removed.
fn read_latin1_lines(path: &Path) -> Result<Vec<(usize, String)>> {
    let bytes = fs::read(path).map_err(|e| PipelineError::io(path, e))?;

    let lines = bytes
        .split(|&b| b == b'\n')
        .enumerate()
        .map(|(idx, raw)| {
            let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
            (idx + 1, decode_latin1(raw))
        })
        .filter(|(_, line)| !line.trim().is_empty())
        .collect();

    Ok(lines)
}

pub fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

/// Split one record into exactly `arity` fields.
/// The last field keeps any separator embedded in it.
fn split_record<'a>(
    path:    &Path,
    line_no: usize,
    line:    &'a str,
    arity:   usize,
) -> Result<Vec<&'a str>> {
    let fields: Vec<&str> = line.splitn(arity, FIELD_SEPARATOR).collect();
    if fields.len() != arity {
        return Err(PipelineError::Parse {
            path:    path.to_path_buf(),
            line:    line_no,
            message: format!("expected {} fields, found {}", arity, fields.len()),
        });
    }
    Ok(fields)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write_corpus(dir: &Path, lines: &[u8], conversations: &[u8]) {
        fs::write(dir.join(LINES_FILE), lines).unwrap();
        fs::write(dir.join(CONVERSATIONS_FILE), conversations).unwrap();
    }

    #[test]
    fn test_parses_lines_and_conversations() {
        let dir = tempdir().unwrap();
        write_corpus(
            dir.path(),
            b"L1 +++$+++ u0 +++$+++ m0 +++$+++ BIANCA +++$+++ They do not!\n\
              L2 +++$+++ u2 +++$+++ m0 +++$+++ CAMERON +++$+++ They do to!\n",
            b"u0 +++$+++ u2 +++$+++ m0 +++$+++ ['L1', 'L2']\n",
        );

        let corpus = CornellCorpus::new(dir.path()).load().unwrap();
        assert_eq!(corpus.utterances.len(), 2);
        assert_eq!(corpus.utterances["L1"].character_name, "BIANCA");
        assert_eq!(corpus.utterances["L2"].text, "They do to!");
        assert_eq!(corpus.conversations.len(), 1);
        assert_eq!(corpus.conversations[0].utterance_ids, vec!["L1", "L2"]);
        assert_eq!(corpus.conversations[0].movie_id, "m0");
    }

    #[test]
    fn test_decodes_latin1_bytes() {
        let dir = tempdir().unwrap();
        // 0xE9 is 'é' in ISO-8859-1 and invalid as standalone UTF-8
        write_corpus(
            dir.path(),
            b"L1 +++$+++ u0 +++$+++ m0 +++$+++ A +++$+++ caf\xE9\r\n",
            b"u0 +++$+++ u2 +++$+++ m0 +++$+++ ['L1']\n",
        );

        let corpus = CornellCorpus::new(dir.path()).load().unwrap();
        assert_eq!(corpus.utterances["L1"].text, "café");
    }

    #[test]
    fn test_missing_utterance_is_fatal() {
        let dir = tempdir().unwrap();
        write_corpus(
            dir.path(),
            b"L1 +++$+++ u0 +++$+++ m0 +++$+++ A +++$+++ hi\n",
            b"u0 +++$+++ u2 +++$+++ m0 +++$+++ ['L1', 'L9']\n",
        );

        let err = CornellCorpus::new(dir.path()).load().unwrap_err();
        match err {
            PipelineError::MissingUtterance { conversation, line_id } => {
                assert_eq!(conversation, 0);
                assert_eq!(line_id, "L9");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_short_record_is_parse_error() {
        let dir = tempdir().unwrap();
        write_corpus(
            dir.path(),
            b"L1 +++$+++ u0 +++$+++ m0 +++$+++ A +++$+++ hi\nL2 +++$+++ u0\n",
            b"",
        );

        let err = CornellCorpus::new(dir.path()).load_utterances().unwrap_err();
        assert!(matches!(err, PipelineError::Parse { line: 2, .. }));
    }

    #[test]
    fn test_duplicate_line_id_keeps_later_record() {
        let dir = tempdir().unwrap();
        write_corpus(
            dir.path(),
            b"L1 +++$+++ u0 +++$+++ m0 +++$+++ A +++$+++ first\n\
              L1 +++$+++ u1 +++$+++ m0 +++$+++ B +++$+++ second\n",
            b"u0 +++$+++ u1 +++$+++ m0 +++$+++ ['L1']\n",
        );

        let utterances = CornellCorpus::new(dir.path()).load_utterances().unwrap();
        assert_eq!(utterances.len(), 1);
        assert_eq!(utterances["L1"].text, "second");
        assert_eq!(utterances["L1"].character_name, "B");
    }

    #[test]
    fn test_last_field_keeps_embedded_separator() {
        let dir = tempdir().unwrap();
        write_corpus(
            dir.path(),
            b"L1 +++$+++ u0 +++$+++ m0 +++$+++ A +++$+++ a +++$+++ b\n",
            b"u0 +++$+++ u1 +++$+++ m0 +++$+++ ['L1'] +++$+++ trailing\n",
        );

        let corpus = CornellCorpus::new(dir.path()).load().unwrap();
        assert_eq!(corpus.utterances["L1"].text, "a +++$+++ b");
        assert_eq!(corpus.utterances["L1"].character_name, "A");
        // ids are still found inside the widened last field
        assert_eq!(corpus.conversations[0].utterance_ids, vec!["L1"]);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        let err = CornellCorpus::new(dir.path()).load().unwrap_err();
        assert!(matches!(err, PipelineError::Io { .. }));
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        let dir = tempdir().unwrap();
        write_corpus(
            dir.path(),
            b"\nL1 +++$+++ u0 +++$+++ m0 +++$+++ A +++$+++ hi\n\n",
            b"u0 +++$+++ u2 +++$+++ m0 +++$+++ ['L1']\n\n",
        );

        let corpus = CornellCorpus::new(dir.path()).load().unwrap();
        assert_eq!(corpus.utterances.len(), 1);
        assert_eq!(corpus.conversations.len(), 1);
    }
}
