// ============================================================
// Layer 4 — Pair Extractor and Pair Table
// ============================================================
// Turns the conversation graph into (talk, response) rows and
// stores them in a single delimited table file. That file is
// the handoff between `preprocess` and `train`.
//
// Extraction walks each conversation's id list:
//
//   ids:   [L1, L2, L3, L4]
//   pairs: (L1,L2) (L2,L3) (L3,L4)     ← L4 never acts as talk
//
// A pair is emitted only if both texts are non-empty after
// stripping. pair_id counts emitted rows across the whole run.
//
// Table layout (UTF-8, '\n' terminated, default delimiter TAB):
//
//   id  conversation_id  talk         response
//   0   0                hi           hello there
//
// Quoting is minimal, RFC 4180 style: a field holding
// the delimiter, a double quote or a line break is wrapped in
// quotes and inner quotes are doubled.
//
// Reference: Rust Book §8 (Strings), §12 (I/O and File Handling)

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::domain::dialogue_pair::DialoguePair;
use crate::domain::error::{PipelineError, Result};
use crate::domain::traits::ParsedCorpus;

pub const HEADERS: [&str; 4] = ["id", "conversation_id", "talk", "response"];

/// File name the preprocessing step writes next to the corpus.
pub const DEFAULT_TABLE_NAME: &str = "formatted_movie_lines.csv";

const QUOTE: char = '"';

// ─── Extraction ───────────────────────────────────────────────────────────────

/// Emit every adjacent (talk, response) pair of every conversation.
///
/// Fails with MissingUtterance if a conversation names an id the
/// utterance table does not hold.
pub fn extract_pairs(corpus: &ParsedCorpus) -> Result<Vec<DialoguePair>> {
    let positions: usize = corpus
        .conversations
        .iter()
        .map(|c| c.adjacent_positions())
        .sum();
    let mut pairs = Vec::with_capacity(positions);

    for (conversation_id, conversation) in corpus.conversations.iter().enumerate() {
        let texts = conversation
            .utterance_ids
            .iter()
            .map(|id| {
                corpus
                    .utterances
                    .get(id)
                    .map(|u| u.text.trim())
                    .ok_or_else(|| PipelineError::MissingUtterance {
                        conversation: conversation_id,
                        line_id:      id.clone(),
                    })
            })
            .collect::<Result<Vec<&str>>>()?;

        for window in texts.windows(2) {
            let (talk, response) = (window[0], window[1]);
            if !talk.is_empty() && !response.is_empty() {
                pairs.push(DialoguePair::new(pairs.len(), conversation_id, talk, response));
            }
        }
    }

    tracing::info!(
        "Extracted {} pairs from {} conversations",
        pairs.len(),
        corpus.conversations.len()
    );
    if pairs.len() < positions {
        tracing::debug!("Skipped {} pairs with an empty side", positions - pairs.len());
    }
    Ok(pairs)
}

// ─── Delimiter ────────────────────────────────────────────────────────────────

/// Resolve escape sequences in a delimiter given on the command line
/// (`\t`, `\\`, `\xNN`, `\uNNNN`) and require a single character.
pub fn unescape_delimiter(raw: &str) -> Result<char> {
    let mut out   = String::new();
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let escaped = match chars.next() {
            Some('t')  => '\t',
            Some('n')  => '\n',
            Some('r')  => '\r',
            Some('\\') => '\\',
            Some('\'') => '\'',
            Some('"')  => '"',
            Some('0')  => '\0',
            Some('x')  => hex_escape(&mut chars, 2, raw)?,
            Some('u')  => hex_escape(&mut chars, 4, raw)?,
            Some(other) => {
                return Err(PipelineError::config(format!(
                    "unknown escape '\\{other}' in delimiter '{raw}'"
                )))
            }
            None => {
                return Err(PipelineError::config(format!(
                    "dangling backslash in delimiter '{raw}'"
                )))
            }
        };
        out.push(escaped);
    }

    let mut resolved = out.chars();
    match (resolved.next(), resolved.next()) {
        (Some(c), None) if c != QUOTE && c != '\n' && c != '\r' => Ok(c),
        _ => Err(PipelineError::config(format!(
            "delimiter '{raw}' must resolve to one character other than a quote or line break"
        ))),
    }
}

fn hex_escape(chars: &mut std::str::Chars<'_>, digits: usize, raw: &str) -> Result<char> {
    let hex: String = chars.by_ref().take(digits).collect();
    u32::from_str_radix(&hex, 16)
        .ok()
        .filter(|_| hex.len() == digits)
        .and_then(char::from_u32)
        .ok_or_else(|| PipelineError::config(format!("bad hex escape in delimiter '{raw}'")))
}

// ─── Writing ──────────────────────────────────────────────────────────────────

/// Write the header and all pairs to `path`.
///
/// The rows go to a sibling temp file first and are renamed into place,
/// so an interrupted run never leaves a truncated table behind. On any
/// failure the temp file is removed again.
pub fn write_pairs(path: &Path, pairs: &[DialoguePair], delimiter: char) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| PipelineError::io(parent, e))?;
    }

    let tmp_path = temp_sibling(path);
    let written = write_rows(&tmp_path, pairs, delimiter)
        .and_then(|()| fs::rename(&tmp_path, path).map_err(|e| PipelineError::io(path, e)));

    if let Err(e) = written {
        if let Err(cleanup) = fs::remove_file(&tmp_path) {
            tracing::debug!("Could not remove '{}': {}", tmp_path.display(), cleanup);
        }
        return Err(e);
    }

    tracing::info!("Wrote {} pairs to '{}'", pairs.len(), path.display());
    Ok(())
}

fn write_rows(tmp_path: &Path, pairs: &[DialoguePair], delimiter: char) -> Result<()> {
    let file = File::create(tmp_path).map_err(|e| PipelineError::io(tmp_path, e))?;
    let mut out = BufWriter::new(file);

    let io = |e: std::io::Error| PipelineError::io(tmp_path, e);
    write_row(&mut out, &HEADERS, delimiter).map_err(io)?;
    for pair in pairs {
        let id              = pair.pair_id.to_string();
        let conversation_id = pair.conversation_id.to_string();
        let row = [id.as_str(), conversation_id.as_str(), pair.talk.as_str(), pair.response.as_str()];
        write_row(&mut out, &row, delimiter).map_err(io)?;
    }
    out.flush().map_err(io)
}

fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn write_row<W: Write>(out: &mut W, fields: &[&str], delimiter: char) -> std::io::Result<()> {
    let line = fields
        .iter()
        .map(|f| quote_field(f, delimiter))
        .collect::<Vec<_>>()
        .join(&delimiter.to_string());
    writeln!(out, "{line}")
}

fn quote_field(field: &str, delimiter: char) -> String {
    let needs_quotes = field
        .chars()
        .any(|c| c == delimiter || c == QUOTE || c == '\n' || c == '\r');
    if needs_quotes {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

// ─── Reading ──────────────────────────────────────────────────────────────────

/// Load every pair from a table written by `write_pairs` (or any file
/// with a header naming `talk` and `response` columns).
pub fn read_pairs(path: &Path, delimiter: char) -> Result<Vec<DialoguePair>> {
    let text = fs::read_to_string(path).map_err(|e| PipelineError::io(path, e))?;
    let rows = parse_rows(path, &text, delimiter)?;

    let mut rows = rows.into_iter();
    let (_, header) = rows.next().ok_or_else(|| PipelineError::Parse {
        path:    path.to_path_buf(),
        line:    1,
        message: "missing header row".to_string(),
    })?;

    let column = |name: &str| header.iter().position(|h| h == name);
    let (talk_col, response_col) = match (column("talk"), column("response")) {
        (Some(t), Some(r)) => (t, r),
        _ => {
            return Err(PipelineError::Parse {
                path:    path.to_path_buf(),
                line:    1,
                message: format!("header {header:?} lacks 'talk' and 'response' columns"),
            })
        }
    };
    let id_col           = column("id");
    let conversation_col = column("conversation_id");

    let mut pairs = Vec::new();
    for (line, fields) in rows {
        if fields.len() != header.len() {
            return Err(PipelineError::Parse {
                path:    path.to_path_buf(),
                line,
                message: format!("expected {} fields, found {}", header.len(), fields.len()),
            });
        }

        let number = |col: Option<usize>, default: usize| -> Result<usize> {
            match col {
                Some(c) => fields[c].trim().parse().map_err(|_| PipelineError::Parse {
                    path:    path.to_path_buf(),
                    line,
                    message: format!("'{}' is not an integer", fields[c]),
                }),
                None => Ok(default),
            }
        };

        let pair_id         = number(id_col, pairs.len())?;
        let conversation_id = number(conversation_col, 0)?;
        pairs.push(DialoguePair::new(
            pair_id,
            conversation_id,
            fields[talk_col].clone(),
            fields[response_col].clone(),
        ));
    }

    tracing::debug!("Read {} pairs from '{}'", pairs.len(), path.display());
    Ok(pairs)
}

/// Split delimited text into rows of fields, honouring quoted fields.
/// Each row is returned with the 1-based line number it starts on.
fn parse_rows(path: &Path, text: &str, delimiter: char) -> Result<Vec<(usize, Vec<String>)>> {
    let mut rows      = Vec::new();
    let mut fields    = Vec::new();
    let mut field     = String::new();
    let mut in_quotes = false;
    let mut line      = 1usize;
    let mut row_start = 1usize;
    let mut chars     = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                '\n' => {
                    line += 1;
                    field.push(c);
                }
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' if field.is_empty() => in_quotes = true,
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => {
                fields.push(std::mem::take(&mut field));
                rows.push((row_start, std::mem::take(&mut fields)));
                line += 1;
                row_start = line;
            }
            c if c == delimiter => fields.push(std::mem::take(&mut field)),
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err(PipelineError::Parse {
            path:    path.to_path_buf(),
            line:    row_start,
            message: "unterminated quoted field".to_string(),
        });
    }
    if !field.is_empty() || !fields.is_empty() {
        fields.push(field);
        rows.push((row_start, fields));
    }

    Ok(rows)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::utterance::{Conversation, Utterance};
    use tempfile::tempdir;

    fn corpus(conversations: &[&[(&str, &str)]]) -> ParsedCorpus {
        let mut parsed = ParsedCorpus::default();
        for lines in conversations {
            let mut ids = Vec::new();
            for (id, text) in lines.iter() {
                parsed.utterances.insert(
                    id.to_string(),
                    Utterance {
                        line_id:        id.to_string(),
                        character_id:   "u0".into(),
                        movie_id:       "m0".into(),
                        character_name: "A".into(),
                        text:           text.to_string(),
                    },
                );
                ids.push(id.to_string());
            }
            parsed.conversations.push(Conversation {
                character1_id: "u0".into(),
                character2_id: "u1".into(),
                movie_id:      "m0".into(),
                utterance_ids: ids,
            });
        }
        parsed
    }

    #[test]
    fn test_path_of_n_gives_n_minus_one_pairs() {
        let c = corpus(&[&[
            ("L1", "hi"),
            ("L2", "hello there"),
            ("L3", "how are you"),
            ("L4", "good"),
        ]]);
        let pairs = extract_pairs(&c).unwrap();

        assert_eq!(pairs.len(), c.conversations[0].adjacent_positions());
        assert_eq!(
            pairs,
            vec![
                DialoguePair::new(0, 0, "hi", "hello there"),
                DialoguePair::new(1, 0, "hello there", "how are you"),
                DialoguePair::new(2, 0, "how are you", "good"),
            ]
        );
    }

    #[test]
    fn test_empty_sides_are_skipped_and_ids_stay_dense() {
        let c = corpus(&[
            &[("L1", "a"), ("L2", "   "), ("L3", "c")],
            &[("L4", " d \n"), ("L5", "e")],
        ]);
        let pairs = extract_pairs(&c).unwrap();

        assert_eq!(pairs, vec![DialoguePair::new(0, 1, "d", "e")]);
    }

    #[test]
    fn test_pairs_never_cross_conversations() {
        let c = corpus(&[&[("L1", "a"), ("L2", "b")], &[("L3", "c")]]);
        let pairs = extract_pairs(&c).unwrap();
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].response, "b");
    }

    #[test]
    fn test_unescape_delimiter() {
        assert_eq!(unescape_delimiter("\\t").unwrap(), '\t');
        assert_eq!(unescape_delimiter("\t").unwrap(), '\t');
        assert_eq!(unescape_delimiter(",").unwrap(), ',');
        assert_eq!(unescape_delimiter("\\x7c").unwrap(), '|');
        assert!(unescape_delimiter("ab").is_err());
        assert!(unescape_delimiter("").is_err());
        assert!(unescape_delimiter("\\q").is_err());
        assert!(unescape_delimiter("\"").is_err());
    }

    #[test]
    fn test_written_table_layout() {
        let dir  = tempdir().unwrap();
        let path = dir.path().join(DEFAULT_TABLE_NAME);
        let pairs = vec![DialoguePair::new(0, 0, "hi", "hello there")];

        write_pairs(&path, &pairs, '\t').unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text, "id\tconversation_id\ttalk\tresponse\n0\t0\thi\thello there\n");
        assert!(!temp_sibling(&path).exists());
    }

    #[test]
    fn test_failed_write_leaves_no_temp_file() {
        let dir  = tempdir().unwrap();
        // a non-empty directory where the table should go makes the rename fail
        let path = dir.path().join(DEFAULT_TABLE_NAME);
        fs::create_dir(&path).unwrap();
        fs::write(path.join("keep"), "x").unwrap();

        let pairs = vec![DialoguePair::new(0, 0, "hi", "hello there")];
        let err = write_pairs(&path, &pairs, '\t').unwrap_err();

        assert!(matches!(err, PipelineError::Io { .. }));
        assert!(!temp_sibling(&path).exists());
        assert!(path.join("keep").exists());
    }

    #[test]
    fn test_quoted_fields_survive_reading() {
        let dir  = tempdir().unwrap();
        let path = dir.path().join("pairs.tsv");
        let pairs = vec![
            DialoguePair::new(0, 3, "she said \"no\"", "a\tb"),
            DialoguePair::new(1, 3, "plain", "text"),
        ];

        write_pairs(&path, &pairs, '\t').unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"she said \"\"no\"\"\""));

        assert_eq!(read_pairs(&path, '\t').unwrap(), pairs);
    }

    #[test]
    fn test_read_rejects_short_rows() {
        let dir  = tempdir().unwrap();
        let path = dir.path().join("pairs.tsv");
        fs::write(&path, "id\tconversation_id\ttalk\tresponse\n0\t0\thi\n").unwrap();

        let err = read_pairs(&path, '\t').unwrap_err();
        assert!(matches!(err, PipelineError::Parse { line: 2, .. }));
    }

    #[test]
    fn test_read_requires_talk_and_response_headers() {
        let dir  = tempdir().unwrap();
        let path = dir.path().join("pairs.tsv");
        fs::write(&path, "a\tb\n1\t2\n").unwrap();

        assert!(matches!(
            read_pairs(&path, '\t').unwrap_err(),
            PipelineError::Parse { line: 1, .. }
        ));
    }
}
