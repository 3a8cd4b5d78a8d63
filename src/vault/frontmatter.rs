//! Lossless YAML frontmatter codec.
//!
//! A note may open with a metadata block delimited by `---` lines:
//!
//! ```text
//! ---
//! date: 2026-08-29
//! tags: [work, focus]
//! ---
//! body text...
//! ```
//!
//! The codec splits metadata from body and reassembles them without
//! touching a byte of the body. The delimiter scan is positional: only
//! the *first* closing `---` line terminates the block, so a literal
//! `---` used as a divider later in the body can never truncate it.

use crate::vault::{Result, VaultError};
use std::collections::BTreeMap;

/// The frontmatter delimiter line (without trailing newline).
pub const DELIMITER: &str = "---";

/// Heterogeneous note metadata: unique string keys mapping to YAML
/// values (string, number, boolean, sequence, or nested mapping).
///
/// `serde_yaml::Value` is a closed enum, so consumers can match every
/// shape exhaustively. Key order in serialized output follows map
/// order, which is not an invariant of the format.
pub type Metadata = BTreeMap<String, serde_yaml::Value>;

/// Split `content` into metadata and body.
///
/// If the very first line is not a `---` delimiter, the whole content
/// is body and the metadata is empty — a valid outcome, not an error.
/// An opening delimiter with no closing delimiter line anywhere after
/// it is `InvalidFrontmatter`. An empty block (`---` immediately
/// followed by `---`) yields empty metadata.
///
/// The body is everything strictly after the closing delimiter line,
/// preserved byte-for-byte including leading blank lines.
pub fn parse(content: &str) -> Result<(Metadata, String)> {
    let after_open = if let Some(rest) = content.strip_prefix("---\n") {
        rest
    } else if content == DELIMITER {
        // A lone opening line: opened, never closed.
        return Err(VaultError::InvalidFrontmatter);
    } else {
        return Ok((Metadata::new(), content.to_string()));
    };

    let (raw, body) = find_closing(after_open).ok_or(VaultError::InvalidFrontmatter)?;

    let metadata = if raw.trim().is_empty() {
        Metadata::new()
    } else {
        // A decode that is not dictionary-shaped fails here too.
        serde_yaml::from_str(raw).map_err(|e| VaultError::MalformedMetadata(e.to_string()))?
    };

    Ok((metadata, body.to_string()))
}

/// Locate the first closing `---` line in the text following the
/// opening delimiter. Returns `(block_inner, body)`.
fn find_closing(after_open: &str) -> Option<(&str, &str)> {
    // Empty block: the closer is the very next line.
    if let Some(body) = after_open.strip_prefix("---\n") {
        return Some(("", body));
    }
    if after_open == DELIMITER {
        return Some(("", ""));
    }
    // First interior closing line.
    if let Some(pos) = after_open.find("\n---\n") {
        return Some((&after_open[..pos + 1], &after_open[pos + 5..]));
    }
    // Closing line at end-of-content with no trailing newline.
    if let Some(inner) = after_open.strip_suffix("\n---") {
        return Some((&after_open[..inner.len() + 1], ""));
    }
    None
}

/// Reassemble metadata and body into file content.
///
/// Empty metadata serializes to just the body — no empty block is
/// emitted. The body is appended unchanged.
pub fn serialize(metadata: &Metadata, body: &str) -> Result<String> {
    if metadata.is_empty() {
        return Ok(body.to_string());
    }
    // serde_yaml terminates its output with a newline.
    let yaml = serde_yaml::to_string(metadata)
        .map_err(|e| VaultError::MalformedMetadata(e.to_string()))?;
    Ok(format!("---\n{yaml}---\n{body}"))
}

/// Merge `updates` into the metadata of `content` and re-serialize.
///
/// Each key in `updates` overwrites or adds; every untouched key is
/// retained. The body passes through byte-for-byte.
pub fn update_metadata(content: &str, updates: Metadata) -> Result<String> {
    let (mut metadata, body) = parse(content)?;
    metadata.extend(updates);
    serialize(&metadata, &body)
}

// ── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_yaml::Value;

    fn meta(pairs: &[(&str, Value)]) -> Metadata {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn parse_splits_metadata_and_body() {
        let (m, body) = parse("---\ndate: 2026-08-29\nmood: good\n---\n# Title\n\ntext\n")
            .unwrap();
        assert_eq!(m["date"], Value::from("2026-08-29"));
        assert_eq!(m["mood"], Value::from("good"));
        assert_eq!(body, "# Title\n\ntext\n");
    }

    #[test]
    fn no_opening_delimiter_is_all_body() {
        let (m, body) = parse("# Just a note\n\n---\n").unwrap();
        assert!(m.is_empty());
        assert_eq!(body, "# Just a note\n\n---\n");
    }

    #[test]
    fn later_delimiter_lines_do_not_truncate_body() {
        let (m, body) = parse("---\ndate: x\n---\n# T\n\n---\n\nrest").unwrap();
        assert_eq!(m, meta(&[("date", Value::from("x"))]));
        assert_eq!(body, "# T\n\n---\n\nrest");
    }

    #[test]
    fn missing_closing_delimiter_fails() {
        let err = parse("---\ndate: x\nno closer here\n").unwrap_err();
        assert!(matches!(err, VaultError::InvalidFrontmatter));

        let err = parse("---").unwrap_err();
        assert!(matches!(err, VaultError::InvalidFrontmatter));
    }

    #[test]
    fn empty_block_is_valid_and_empty() {
        let (m, body) = parse("---\n---\nbody\n").unwrap();
        assert!(m.is_empty());
        assert_eq!(body, "body\n");

        // Closer at end-of-content, no body at all.
        let (m, body) = parse("---\n---").unwrap();
        assert!(m.is_empty());
        assert_eq!(body, "");
    }

    #[test]
    fn non_mapping_block_is_malformed() {
        let err = parse("---\n- just\n- a list\n---\nbody\n").unwrap_err();
        assert!(matches!(err, VaultError::MalformedMetadata(_)));
    }

    #[test]
    fn body_leading_blank_lines_survive() {
        let (_, body) = parse("---\na: 1\n---\n\n\nindented start\n").unwrap();
        assert_eq!(body, "\n\nindented start\n");
    }

    #[test]
    fn empty_metadata_serializes_to_body_exactly() {
        let body = "# Note\n\ncontent\n";
        assert_eq!(serialize(&Metadata::new(), body).unwrap(), body);
    }

    #[test]
    fn round_trip_preserves_keys_values_and_body() {
        let m = meta(&[
            ("title", Value::from("daily")),
            ("count", Value::from(3)),
            ("done", Value::from(false)),
            (
                "tags",
                Value::Sequence(vec![Value::from("work"), Value::from("focus")]),
            ),
            (
                "nested",
                serde_yaml::from_str("inner: deep\nn: 2\n").unwrap(),
            ),
        ]);
        let body = "# T\n\nline one\n\n---\n\nline two\n";

        let content = serialize(&m, body).unwrap();
        let (m2, body2) = parse(&content).unwrap();
        assert_eq!(m2, m);
        assert_eq!(body2, body);
    }

    #[test]
    fn update_metadata_merges_and_keeps_untouched_keys() {
        let content = "---\na: 1\nb: 2\n---\nbody\n";
        let updated = update_metadata(
            content,
            meta(&[("b", Value::from(3)), ("c", Value::from(4))]),
        )
        .unwrap();

        let (m, body) = parse(&updated).unwrap();
        assert_eq!(m["a"], Value::from(1));
        assert_eq!(m["b"], Value::from(3));
        assert_eq!(m["c"], Value::from(4));
        assert_eq!(body, "body\n");
    }

    #[test]
    fn update_metadata_on_bodyless_content_adds_block() {
        let updated = update_metadata("plain body\n", meta(&[("a", Value::from(1))])).unwrap();
        let (m, body) = parse(&updated).unwrap();
        assert_eq!(m["a"], Value::from(1));
        assert_eq!(body, "plain body\n");
    }
}
