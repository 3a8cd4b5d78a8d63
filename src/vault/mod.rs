//! Daily-note vault: frontmatter codec, document model, and store.
//!
//! This module family is the mutation engine for a markdown knowledge
//! vault. Notes are plain files a human can open in any editor; the
//! engine's job is to read, create, and append to them without ever
//! losing a byte of existing content.
//!
//! - `frontmatter` — lossless `---`-delimited YAML metadata codec
//! - `document`    — one dated note with section-addressable body
//! - `store`       — serialized filesystem access, atomic writes
//! - `oplog`       — structured JSONL log of vault operations
//!
//! ## File Layout
//!
//! ```text
//! vault/
//! ├── config.toml             — Optional [logging] configuration
//! └── Daily Notes/
//!     ├── 2026-08-28.md       — Yesterday's note
//!     └── 2026-08-29.md       — Today's note
//! ```
//!
//! ## On-disk note format
//!
//! ```text
//! ---
//! date: 2026-08-29
//! ---
//! # Daily Note — 2026-08-29
//!
//! ## Intentions
//! ...
//! ```
//!
//! If the file does not open with a `---` line, the whole file is body
//! and the metadata is empty — that is a valid note, not an error.
//!
//! ## Concurrency
//!
//! All store operations run end-to-end under a single async mutex:
//! one logical vault operation completes before the next begins. This
//! matters because `create` and `append_to_section` are read-then-write
//! sequences; without the gate, two concurrent appends to the same date
//! could each read the same pre-append body and silently drop one
//! another's text. An external briefing-writer process may still touch
//! files between our read and write — that cross-process window is an
//! accepted risk, not handled here.

pub mod document;
pub mod frontmatter;
pub mod oplog;
pub mod store;

pub use document::{Document, SectionId};
pub use frontmatter::Metadata;
pub use store::VaultStore;

use chrono::NaiveDate;
use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the vault engine.
///
/// The codec and document model never suppress errors; the store is
/// the first point that wraps lower-level faults (`ReadFailure`,
/// `WriteFailure`) but never swallows one outright.
#[derive(Debug, Error)]
pub enum VaultError {
    /// The vault root does not exist or is not a directory. Fatal at
    /// initialization — no store instance is usable.
    #[error("vault root not found or not a directory: {0}")]
    VaultNotFound(PathBuf),

    /// No note file exists for this date. Expected and recoverable —
    /// callers typically fall back to `create`.
    #[error("no note exists for {0}")]
    FileNotFound(NaiveDate),

    /// The content opens with a frontmatter delimiter but no closing
    /// delimiter line ever appears.
    #[error("frontmatter block opened but never closed")]
    InvalidFrontmatter,

    /// The frontmatter block exists but does not decode to a mapping.
    #[error("frontmatter is not a valid metadata mapping: {0}")]
    MalformedMetadata(String),

    /// The requested section heading is not present in the body.
    /// Recoverable — `append_to_section` will create the section.
    #[error("section not found: {0}")]
    SectionNotFound(SectionId),

    /// An underlying read (I/O or codec) failed for an existing file.
    #[error("failed to read note at {path}")]
    ReadFailure {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// An underlying write (serialization or I/O) failed. The on-disk
    /// file is unchanged from before the call.
    #[error("failed to write note at {path}")]
    WriteFailure {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Convenience alias used throughout the vault modules.
pub type Result<T> = std::result::Result<T, VaultError>;
