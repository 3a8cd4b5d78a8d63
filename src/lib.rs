//! Daybook — a markdown daily-note vault engine.
//!
//! Provides the document model and safe-mutation core for a personal
//! knowledge vault: YAML frontmatter that round-trips byte-for-byte,
//! section-addressable note bodies, and a concurrency-safe store that
//! never destroys existing user content.

pub mod vault;
