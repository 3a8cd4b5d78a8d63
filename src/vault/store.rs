//! The vault store: serialized filesystem access to daily notes.
//!
//! `VaultStore` is the sole authority translating a calendar date to a
//! file location and sequencing all reads and writes against it. Every
//! public operation runs end-to-end under a single async mutex, so a
//! read-modify-write like `append_to_section` can never interleave
//! with another operation and silently drop text.
//!
//! Writes are atomic: content goes to a sibling temp file which is
//! then renamed over the target, so a concurrent reader sees either
//! the fully-old or fully-new file, never a torn mix. If any step
//! fails, the file on disk is unchanged from before the call.
//!
//! An external briefing-writer process may modify a note between our
//! read and write; that cross-process window is an accepted risk (no
//! advisory locks, no version check) — see the `vault` module docs.

use crate::vault::document::{Document, SectionId};
use crate::vault::frontmatter::{self, Metadata};
use crate::vault::oplog::{LogLevel, OpEvent, OpKind, OpLogger};
use crate::vault::{Result, VaultError};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;

/// Subdirectory of the vault root holding one file per date.
pub const NOTES_DIR: &str = "Daily Notes";

/// Filename date encoding: `YYYY-MM-DD`.
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Sections seeded into a freshly created note, in order.
const STARTER_SECTIONS: [SectionId; 3] = [
    SectionId::Intentions,
    SectionId::FocusBlocks,
    SectionId::Capture,
];

/// Concurrency-safe store for one vault root.
#[derive(Debug)]
pub struct VaultStore {
    root: PathBuf,
    /// Serializes all vault operations: one completes before the next
    /// begins. Vault files are small and I/O-bound, so a single gate
    /// is the simplest correct design.
    gate: Mutex<()>,
    logger: OpLogger,
    run_id: String,
}

impl VaultStore {
    /// Open a store over an existing vault root.
    ///
    /// Fails with `VaultNotFound` if the path does not exist or is not
    /// a directory. No other side effects — subdirectories are created
    /// lazily on first write.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(VaultError::VaultNotFound(root));
        }
        Ok(Self {
            root,
            gate: Mutex::new(()),
            logger: OpLogger::disabled(),
            run_id: String::new(),
        })
    }

    /// Attach an operation logger stamped with `run_id`.
    pub fn with_logger(mut self, logger: OpLogger, run_id: &str) -> Self {
        self.logger = logger;
        self.run_id = run_id.to_string();
        self
    }

    /// The vault root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The deterministic file location for a date's note.
    pub fn note_path(&self, date: NaiveDate) -> PathBuf {
        self.root
            .join(NOTES_DIR)
            .join(format!("{}.md", date.format(DATE_FORMAT)))
    }

    // ── Operations (each holds the gate end-to-end) ──────────────

    /// Read the note for `date`, constructed fresh from current
    /// on-disk bytes — no caching.
    pub async fn read(&self, date: NaiveDate) -> Result<Document> {
        let _gate = self.gate.lock().await;
        let doc = self.read_unlocked(date).await?;
        self.log(OpEvent::new(&self.run_id, OpKind::NoteRead, LogLevel::Info).with_date(date));
        Ok(doc)
    }

    /// Serialize and atomically replace the note at `doc.path`,
    /// creating the parent directory if absent.
    pub async fn write(&self, doc: &Document) -> Result<()> {
        let _gate = self.gate.lock().await;
        self.write_unlocked(doc).await?;
        self.log(
            OpEvent::new(&self.run_id, OpKind::NoteWrite, LogLevel::Info)
                .with_date(doc.date)
                .with_detail(&format!("{} body bytes", doc.body.len())),
        );
        Ok(())
    }

    /// Ensure a note exists for `date`.
    ///
    /// If the file already exists this is idempotent: the existing
    /// document is returned unchanged, with no overwrite and no error.
    /// Otherwise a starter note is built and written.
    pub async fn create(&self, date: NaiveDate) -> Result<Document> {
        let _gate = self.gate.lock().await;
        match self.read_unlocked(date).await {
            Ok(existing) => {
                self.log(
                    OpEvent::new(&self.run_id, OpKind::NoteCreate, LogLevel::Info)
                        .with_date(date)
                        .with_detail("already exists"),
                );
                Ok(existing)
            }
            Err(VaultError::FileNotFound(_)) => {
                let doc = self.starter_note(date);
                self.write_unlocked(&doc).await?;
                self.log(
                    OpEvent::new(&self.run_id, OpKind::NoteCreate, LogLevel::Info)
                        .with_date(date)
                        .with_detail("created from template"),
                );
                Ok(doc)
            }
            Err(e) => Err(e),
        }
    }

    /// Append `text` into a section of the note for `date`.
    ///
    /// Read-modify-write under the gate: the read and the write cannot
    /// interleave with any other store operation. (A concurrent
    /// external process is outside this guarantee — accepted risk.)
    /// The section is created at the end of the body if absent.
    pub async fn append_to_section(
        &self,
        text: &str,
        section: SectionId,
        date: NaiveDate,
    ) -> Result<Document> {
        let _gate = self.gate.lock().await;
        let doc = self.read_unlocked(date).await?;
        let updated = doc.append_to_section(text, section);
        self.write_unlocked(&updated).await?;
        self.log(
            OpEvent::new(&self.run_id, OpKind::SectionAppend, LogLevel::Info)
                .with_date(date)
                .with_section(section.title())
                .with_detail(&format!("{} bytes", text.len())),
        );
        Ok(updated)
    }

    /// Whether a note file exists for `date`. Never errors.
    pub async fn exists(&self, date: NaiveDate) -> bool {
        let _gate = self.gate.lock().await;
        fs::try_exists(self.note_path(date)).await.unwrap_or(false)
    }

    /// All dates with a note file, sorted ascending.
    ///
    /// Filenames that are not exactly `YYYY-MM-DD.md` are silently
    /// skipped. A missing notes directory yields an empty list.
    pub async fn list(&self) -> Result<Vec<NaiveDate>> {
        let _gate = self.gate.lock().await;
        let dir = self.root.join(NOTES_DIR);

        let mut entries = match fs::read_dir(&dir).await {
            Ok(e) => e,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(VaultError::ReadFailure {
                    path: dir,
                    source: Box::new(e),
                })
            }
        };

        let mut dates = Vec::new();
        loop {
            let entry = entries.next_entry().await.map_err(|e| VaultError::ReadFailure {
                path: dir.clone(),
                source: Box::new(e),
            })?;
            let Some(entry) = entry else { break };
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("md") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if let Ok(date) = NaiveDate::parse_from_str(stem, DATE_FORMAT) {
                // Require the exact encoding: "2026-1-1.md" doesn't count.
                if date.format(DATE_FORMAT).to_string() == stem {
                    dates.push(date);
                }
            }
        }
        dates.sort_unstable();

        self.log(
            OpEvent::new(&self.run_id, OpKind::VaultList, LogLevel::Info)
                .with_detail(&format!("{} notes", dates.len())),
        );
        Ok(dates)
    }

    // ── Internal (caller holds the gate) ─────────────────────────

    async fn read_unlocked(&self, date: NaiveDate) -> Result<Document> {
        let path = self.note_path(date);
        let content = match fs::read_to_string(&path).await {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(VaultError::FileNotFound(date))
            }
            Err(e) => {
                return Err(VaultError::ReadFailure {
                    path,
                    source: Box::new(e),
                })
            }
        };

        let (metadata, body) = frontmatter::parse(&content).map_err(|e| VaultError::ReadFailure {
            path: path.clone(),
            source: Box::new(e),
        })?;

        Ok(Document {
            date,
            path,
            metadata,
            body,
        })
    }

    async fn write_unlocked(&self, doc: &Document) -> Result<()> {
        let write_failure = |e: Box<dyn std::error::Error + Send + Sync>| VaultError::WriteFailure {
            path: doc.path.clone(),
            source: e,
        };

        let content =
            frontmatter::serialize(&doc.metadata, &doc.body).map_err(|e| write_failure(Box::new(e)))?;

        if let Some(parent) = doc.path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| write_failure(Box::new(e)))?;
        }

        // Write a sibling temp file, then rename over the target. The
        // rename is the only step that touches the real file, so a
        // failure anywhere leaves it exactly as it was.
        let tmp = doc.path.with_extension("md.tmp");
        fs::write(&tmp, &content)
            .await
            .map_err(|e| write_failure(Box::new(e)))?;
        if let Err(e) = fs::rename(&tmp, &doc.path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(write_failure(Box::new(e)));
        }
        Ok(())
    }

    /// Build the starter note for a date: a `date:` frontmatter key,
    /// a title line, and the default morning sections, each empty.
    fn starter_note(&self, date: NaiveDate) -> Document {
        let stamp = date.format(DATE_FORMAT).to_string();

        let mut metadata = Metadata::new();
        metadata.insert("date".to_string(), serde_yaml::Value::from(stamp.clone()));

        let mut body = format!("# Daily Note — {stamp}\n");
        for section in STARTER_SECTIONS {
            body.push('\n');
            body.push_str(section.heading());
            body.push('\n');
        }

        Document {
            date,
            path: self.note_path(date),
            metadata,
            body,
        }
    }

    fn log(&self, event: OpEvent) {
        self.logger.log(&event);
    }
}

// ── Tests ────────────────────────────────────────────────────────
