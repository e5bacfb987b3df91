use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::block::Snapshot;
use crate::chapter::ChapterResolver;
use crate::doc_url::DocumentUrl;
use crate::error::{Error, Result};
use crate::render::{RenderContext, Rendered, render_chapter, render_document};

/// Where documents referenced by URL come from.
pub trait DocumentSource {
    fn fetch(&self, url: &DocumentUrl) -> Result<Snapshot>;
}

/// Read a snapshot JSON file.
pub fn load_snapshot(path: &Path) -> Result<Snapshot> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Directory of `<token>.json` snapshots
pub struct SnapshotDir {
    root: PathBuf,
}

impl SnapshotDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl DocumentSource for SnapshotDir {
    fn fetch(&self, url: &DocumentUrl) -> Result<Snapshot> {
        let path = self.root.join(format!("{}.json", url.token()));
        if !path.is_file() {
            return Err(Error::SnapshotNotFound(url.to_string()));
        }
        debug!(
            path = %path.display(),
            domain = ?url.domain(),
            kind = ?url.kind(),
            "loading snapshot"
        );
        load_snapshot(&path)
    }
}

/// Resolves chapter links through a [`DocumentSource`], rendering each linked
/// document with the same context.
///
/// Documents currently being rendered are tracked by URL token and document
/// id; a link back to one of them fails with [`Error::ChapterCycle`].
pub struct SnapshotResolver<S> {
    source: S,
    active: RefCell<Vec<String>>,
}

impl<S: DocumentSource> SnapshotResolver<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            active: RefCell::new(Vec::new()),
        }
    }

    /// Render a top-level document with chapter links resolved through this source.
    pub fn render_root(&self, snapshot: &Snapshot, ctx: RenderContext) -> Result<Rendered> {
        self.enter(&[snapshot.document.document_id.as_str()], || {
            render_document(&snapshot.document, &snapshot.blocks, ctx, self)
        })
    }

    fn is_active(&self, key: &str) -> bool {
        self.active.borrow().iter().any(|k| k == key)
    }

    fn enter<T>(&self, keys: &[&str], f: impl FnOnce() -> Result<T>) -> Result<T> {
        let depth = self.active.borrow().len();
        self.active
            .borrow_mut()
            .extend(keys.iter().map(|k| k.to_string()));
        let result = f();
        self.active.borrow_mut().truncate(depth);
        result
    }
}

impl<S: DocumentSource> ChapterResolver for SnapshotResolver<S> {
    fn resolve(&self, url: &DocumentUrl, ctx: RenderContext) -> Result<Rendered> {
        if self.is_active(url.token()) {
            return Err(Error::ChapterCycle(url.to_string()));
        }
        let snapshot = self.source.fetch(url)?;
        let document_id = snapshot.document.document_id.as_str();
        if self.is_active(document_id) {
            return Err(Error::ChapterCycle(url.to_string()));
        }
        self.enter(&[url.token(), document_id], || {
            render_chapter(&snapshot.document, &snapshot.blocks, ctx, self)
        })
    }
}
