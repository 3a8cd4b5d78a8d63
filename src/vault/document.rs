//! The document model: one dated note with a section-addressable body.
//!
//! A note body is divided into sections, each introduced by a line
//! exactly matching a recognized `## ` heading. The set of recognized
//! sections is a closed enumeration — the engine addresses the daily
//! workflow sections and nothing else; display layers may group text
//! however they like, but only these headings participate in append
//! and lookup.
//!
//! All body mutation is append-only: `append_to_section` never deletes,
//! rewrites, or reorders a single existing byte.

use crate::vault::frontmatter::Metadata;
use crate::vault::{Result, VaultError};
use chrono::NaiveDate;
use std::path::PathBuf;

// ── SectionId ────────────────────────────────────────────────────

/// The closed set of sections the engine can address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionId {
    /// AI-produced daily briefing (also written by the external
    /// briefing process — see the module docs in `vault`).
    Briefing,
    /// Morning intentions.
    Intentions,
    /// Planned focus blocks for the day.
    FocusBlocks,
    /// Quick-capture inbox.
    Capture,
    /// End-of-day shutdown notes.
    EndOfDay,
}

impl SectionId {
    /// Every recognized section, in canonical note order.
    pub const ALL: [SectionId; 5] = [
        SectionId::Briefing,
        SectionId::Intentions,
        SectionId::FocusBlocks,
        SectionId::Capture,
        SectionId::EndOfDay,
    ];

    /// The section title as it appears after the heading token.
    pub fn title(self) -> &'static str {
        match self {
            SectionId::Briefing => "Briefing",
            SectionId::Intentions => "Intentions",
            SectionId::FocusBlocks => "Focus Blocks",
            SectionId::Capture => "Capture",
            SectionId::EndOfDay => "End of Day",
        }
    }

    /// The exact heading line that introduces this section.
    pub fn heading(self) -> &'static str {
        match self {
            SectionId::Briefing => "## Briefing",
            SectionId::Intentions => "## Intentions",
            SectionId::FocusBlocks => "## Focus Blocks",
            SectionId::Capture => "## Capture",
            SectionId::EndOfDay => "## End of Day",
        }
    }
}

impl std::fmt::Display for SectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.title())
    }
}

impl std::str::FromStr for SectionId {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "briefing" => Ok(SectionId::Briefing),
            "intentions" => Ok(SectionId::Intentions),
            "focus blocks" | "focus-blocks" | "focus_blocks" => Ok(SectionId::FocusBlocks),
            "capture" => Ok(SectionId::Capture),
            "end of day" | "end-of-day" | "end_of_day" => Ok(SectionId::EndOfDay),
            _ => Err(format!("unknown section: {s}")),
        }
    }
}

/// A line that terminates a section: a heading at the same or a
/// higher level. Deeper headings (`###` and below) stay inside the
/// section; markers embedded mid-line never count.
fn is_boundary(line: &str) -> bool {
    line.starts_with("## ") || line.starts_with("# ")
}

// ── Document ─────────────────────────────────────────────────────

/// One daily note, fully owned by the holder.
///
/// The store constructs a `Document` fresh from on-disk bytes on every
/// read and keeps no reference afterward — freshness is read time,
/// not live.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Logical identity: one note per calendar date.
    pub date: NaiveDate,
    /// Absolute file location derived from the date.
    pub path: PathBuf,
    /// Frontmatter metadata mapping.
    pub metadata: Metadata,
    /// Free-form body, byte-for-byte as read (or as templated).
    pub body: String,
}

impl Document {
    /// Whether the body contains this section's heading line.
    pub fn has_section(&self, id: SectionId) -> bool {
        self.body.split('\n').any(|line| line == id.heading())
    }

    /// The text strictly between this section's heading line and the
    /// next same-or-higher-level heading (or end of body), with
    /// leading/trailing blank lines trimmed.
    pub fn section_content(&self, id: SectionId) -> Result<String> {
        let lines: Vec<&str> = self.body.split('\n').collect();
        let start = lines
            .iter()
            .position(|line| *line == id.heading())
            .ok_or(VaultError::SectionNotFound(id))?;
        let end = lines[start + 1..]
            .iter()
            .position(|line| is_boundary(line))
            .map(|p| start + 1 + p)
            .unwrap_or(lines.len());

        // Trim blank lines at the edges, but leave interior content
        // (including indentation) untouched.
        let mut section = &lines[start + 1..end];
        while section.first().is_some_and(|l| l.trim().is_empty()) {
            section = &section[1..];
        }
        while section.last().is_some_and(|l| l.trim().is_empty()) {
            section = &section[..section.len() - 1];
        }
        Ok(section.join("\n"))
    }

    /// Return a new `Document` whose body differs only in the target
    /// section.
    ///
    /// If the section exists, `text` is inserted immediately before
    /// the next heading that follows it (or at the very end of the
    /// body when the section is last). If the section is absent, the
    /// heading plus `text` is appended at the end of the body,
    /// separated from prior content by a blank line — "ensure and
    /// append", not an error.
    ///
    /// Purely additive: every pre-existing line survives unchanged
    /// and in its original relative order, even when `text` itself
    /// contains heading-like lines.
    pub fn append_to_section(&self, text: &str, id: SectionId) -> Document {
        Document {
            date: self.date,
            path: self.path.clone(),
            metadata: self.metadata.clone(),
            body: append_to_body(&self.body, text.trim_end_matches('\n'), id),
        }
    }
}

/// Body-level append. `text` has no trailing newline.
fn append_to_body(body: &str, text: &str, id: SectionId) -> String {
    let lines: Vec<&str> = body.split('\n').collect();

    let Some(start) = lines.iter().position(|line| *line == id.heading()) else {
        // Section absent: create it at the end of the body.
        let mut out = body.to_string();
        if !out.is_empty() {
            if !out.ends_with('\n') {
                out.push('\n');
            }
            out.push('\n');
        }
        out.push_str(id.heading());
        out.push('\n');
        out.push_str(text);
        out.push('\n');
        return out;
    };

    // The boundary is located before any splicing, so heading-like
    // lines inside `text` cannot re-split the scan.
    match lines[start + 1..]
        .iter()
        .position(|line| is_boundary(line))
        .map(|p| start + 1 + p)
    {
        Some(boundary) => {
            let mut out: Vec<&str> = Vec::with_capacity(lines.len() + 2);
            out.extend_from_slice(&lines[..boundary]);
            out.extend(text.split('\n'));
            out.extend_from_slice(&lines[boundary..]);
            out.join("\n")
        }
        None => {
            // Section is the last one: append at the very end.
            let mut out = body.to_string();
            if !out.is_empty() && !out.ends_with('\n') {
                out.push('\n');
            }
            out.push_str(text);
            out.push('\n');
            out
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(body: &str) -> Document {
        Document {
            date: NaiveDate::from_ymd_opt(2026, 8, 29).unwrap(),
            path: PathBuf::from("/vault/Daily Notes/2026-08-29.md"),
            metadata: Metadata::new(),
            body: body.to_string(),
        }
    }

    const THREE_SECTIONS: &str = "\
# Daily Note — 2026-08-29

## Intentions

- ship the release

## Capture

- idea one
- idea two

## End of Day

wrap-up notes
";

    #[test]
    fn has_section_requires_exact_line_match() {
        let d = doc(THREE_SECTIONS);
        assert!(d.has_section(SectionId::Capture));
        assert!(!d.has_section(SectionId::Briefing));

        // Partial matches, deeper levels, and mid-line markers don't count.
        let d = doc("## Captured\n### Capture\ntext with ## Capture inside\n");
        assert!(!d.has_section(SectionId::Capture));
    }

    #[test]
    fn section_content_stops_at_next_heading() {
        let d = doc(THREE_SECTIONS);
        assert_eq!(
            d.section_content(SectionId::Capture).unwrap(),
            "- idea one\n- idea two"
        );
        assert_eq!(
            d.section_content(SectionId::EndOfDay).unwrap(),
            "wrap-up notes"
        );
    }

    #[test]
    fn section_content_keeps_deeper_headings_inside() {
        let d = doc("## Capture\n\n### morning\n- a\n\n### evening\n- b\n\n## End of Day\n");
        assert_eq!(
            d.section_content(SectionId::Capture).unwrap(),
            "### morning\n- a\n\n### evening\n- b"
        );
    }

    #[test]
    fn section_content_preserves_interior_indentation() {
        let d = doc("## Capture\n\n    indented code\n- item\n\n## End of Day\n");
        assert_eq!(
            d.section_content(SectionId::Capture).unwrap(),
            "    indented code\n- item"
        );
    }

    #[test]
    fn section_content_missing_section_fails() {
        let err = doc("no headings here\n")
            .section_content(SectionId::Briefing)
            .unwrap_err();
        assert!(matches!(
            err,
            VaultError::SectionNotFound(SectionId::Briefing)
        ));
    }

    #[test]
    fn append_inserts_before_next_heading() {
        let d = doc(THREE_SECTIONS).append_to_section("- idea three", SectionId::Capture);
        let capture = d.section_content(SectionId::Capture).unwrap();
        assert!(capture.ends_with("- idea three"));
        // The new line lands between Capture's heading and End of Day's.
        let capture_pos = d.body.find("## Capture").unwrap();
        let new_pos = d.body.find("- idea three").unwrap();
        let eod_pos = d.body.find("## End of Day").unwrap();
        assert!(capture_pos < new_pos && new_pos < eod_pos);
    }

    #[test]
    fn append_leaves_other_sections_verbatim() {
        let before = doc(THREE_SECTIONS);
        let after = before.append_to_section("- inserted", SectionId::Capture);

        assert_eq!(
            before.section_content(SectionId::Intentions).unwrap(),
            after.section_content(SectionId::Intentions).unwrap()
        );
        assert_eq!(
            before.section_content(SectionId::EndOfDay).unwrap(),
            after.section_content(SectionId::EndOfDay).unwrap()
        );
        // Every original line survives in order.
        let mut remaining = after.body.split('\n');
        for line in before.body.split('\n') {
            assert!(
                remaining.any(|l| l == line),
                "original line lost or reordered: {line:?}"
            );
        }
    }

    #[test]
    fn append_to_last_section_lands_at_end() {
        let d = doc("## Capture\n\n- first\n").append_to_section("- second", SectionId::Capture);
        assert_eq!(d.body, "## Capture\n\n- first\n- second\n");
    }

    #[test]
    fn append_creates_missing_section_at_end() {
        let before = doc(THREE_SECTIONS);
        let after = before.append_to_section("Generated briefing text.", SectionId::Briefing);

        assert!(after.has_section(SectionId::Briefing));
        assert_eq!(
            after.section_content(SectionId::Briefing).unwrap(),
            "Generated briefing text."
        );
        assert!(after.body.starts_with(THREE_SECTIONS));
        assert!(after.body.ends_with("\n## Briefing\nGenerated briefing text.\n"));
    }

    #[test]
    fn append_to_empty_body_creates_section_without_leading_blank() {
        let d = doc("").append_to_section("- note", SectionId::Capture);
        assert_eq!(d.body, "## Capture\n- note\n");
    }

    #[test]
    fn append_text_with_heading_like_lines_does_not_resplit() {
        let before = doc(THREE_SECTIONS);
        let tricky = "- quote below\n## Not A Real Boundary\nstill the same insert";
        let after = before.append_to_section(tricky, SectionId::Capture);

        // The whole insert lands before End of Day, in one piece.
        let insert_start = after.body.find("- quote below").unwrap();
        let insert_end = after.body.find("still the same insert").unwrap();
        let eod_pos = after.body.find("## End of Day").unwrap();
        assert!(insert_start < insert_end && insert_end < eod_pos);
        assert_eq!(
            before.section_content(SectionId::EndOfDay).unwrap(),
            after.section_content(SectionId::EndOfDay).unwrap()
        );
    }

    #[test]
    fn section_id_round_trips_through_strings() {
        for id in SectionId::ALL {
            assert_eq!(id.to_string().parse::<SectionId>().unwrap(), id);
        }
        assert_eq!(
            "focus-blocks".parse::<SectionId>().unwrap(),
            SectionId::FocusBlocks
        );
        assert!("unknown".parse::<SectionId>().is_err());
    }
}
